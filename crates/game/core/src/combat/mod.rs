//! Combat math.
//!
//! Pure functions for attack damage and dodge rolls. Nothing here mutates a
//! roster; [`crate::engine::Combat`] applies the results.
//!
//! - `calculate_attack`: damage dealt by one creature to another
//! - `damage_for`: the formula behind it, on raw stats
//! - `roll_dodge`: percentage dodge check

pub mod damage;
pub mod dodge;
pub mod event;

pub use damage::{ADVANTAGE_MULTIPLIER, calculate_attack, damage_for};
pub use dodge::{GYM_DODGE_PERCENT, roll_dodge};
pub use event::CombatEvent;

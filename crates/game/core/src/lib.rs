//! Pure combat rules for gym battles.
//!
//! `loomie-core` owns the deterministic half of a combat: creature stats,
//! rosters, the type-advantage cache, damage math, item effects and the
//! [`engine::Combat`] state machine. It never sleeps, spawns or performs
//! I/O; the runtime crate drives it and decides when each transition runs.
pub mod combat;
pub mod engine;
pub mod env;
pub mod error;
pub mod items;
pub mod state;

#[cfg(test)]
mod test_support;

pub use combat::{
    ADVANTAGE_MULTIPLIER, CombatEvent, GYM_DODGE_PERCENT, calculate_attack, damage_for, roll_dodge,
};
pub use engine::{
    AttackOutcome, Combat, CombatSnapshot, ExperienceAward, ItemOutcome, PendingGymAttack,
};
pub use env::{Dice, PcgDice, ScriptedDice, StaticTypeChart, TypeAdvantageCache, TypeChart};
pub use error::{CoreError, Result};
pub use items::{CombatItem, ItemEffect, ItemError};
pub use state::{
    CaughtCreature, CombatCreature, CombatResult, CreatureId, FoughtByLedger, Roster, Side,
    experience_factor, scale_stat,
};

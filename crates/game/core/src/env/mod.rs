//! Read-only capabilities the combat core consumes.
//!
//! The core never reaches for global state: type relationships come from a
//! [`TypeChart`] wrapped in a [`TypeAdvantageCache`], and every random roll
//! goes through a [`Dice`] implementation. Both are injected by the runtime
//! when a combat is assembled.
mod dice;
mod types;

pub use dice::{Dice, PcgDice, ScriptedDice};
pub use types::{StaticTypeChart, TypeAdvantageCache, TypeChart};

//! Combat-time state: creatures, rosters and the fought-by ledger.
mod creature;
mod ledger;
mod roster;

use std::fmt;

pub use creature::{CaughtCreature, CombatCreature, CreatureId, experience_factor, scale_stat};
pub use ledger::FoughtByLedger;
pub use roster::Roster;

/// The two parties of a combat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Side {
    /// The challenging player's active team.
    Player,
    /// The gym's stationed protectors.
    Gym,
}

/// Final result of a combat, from the player's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatResult {
    PlayerWon,
    PlayerLost,
}

impl fmt::Display for CombatResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CombatResult::PlayerWon => "player won",
            CombatResult::PlayerLost => "player lost",
        };
        write!(f, "{}", label)
    }
}

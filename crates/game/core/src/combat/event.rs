//! Events produced by combat transitions.
//!
//! The engine returns these in emission order; the runtime maps each one
//! onto an outbound wire message.

use crate::state::{CombatCreature, CreatureId};

#[derive(Clone, Debug, PartialEq)]
pub enum CombatEvent {
    /// A gym attack is incoming. Non-binding: the dodge window is open.
    GymAttackCandidate,
    /// The player dodged the gym attack.
    GymAttackDodged,
    /// The gym creature dodged the player attack.
    UserAttackDodged,
    /// The player's active creature took damage and is still standing.
    UserLoomieHpUpdated { hp: u32 },
    /// The player's active creature was weakened and left the roster.
    UserLoomieWeakened { loomie_id: CreatureId },
    /// A new player creature became active.
    PlayerLoomieUpdated {
        loomie: CombatCreature,
        alive: usize,
    },
    /// The player's roster is exhausted.
    UserHasLost,
    /// The gym's active creature took damage and is still standing.
    GymLoomieHpUpdated { hp: u32 },
    /// The gym's active creature was weakened and left the roster.
    GymLoomieWeakened { loomie_id: CreatureId },
    /// A new gym creature became active.
    GymLoomieUpdated {
        loomie: CombatCreature,
        alive: usize,
    },
    /// The gym's roster is exhausted.
    UserHasWon,
}

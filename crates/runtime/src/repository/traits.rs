//! Collaborator contracts consumed by combat sessions.

use async_trait::async_trait;

use loomie_core::{CombatCreature, CreatureId, ItemEffect};

use super::Result;

/// Persistent side effects of a combat.
///
/// Calls are made from session tasks; implementations must not assume any
/// particular ordering between sessions.
#[async_trait]
pub trait CombatRecords: Send + Sync {
    /// Adds `amount` experience to a creature's permanent record.
    async fn award_experience(&self, creature_id: &CreatureId, amount: f64) -> Result<()>;

    /// Removes one unit of item `serial` from the user's inventory.
    ///
    /// Returns `false` if the user does not own the item.
    async fn consume_item(&self, user_id: &str, serial: u32) -> Result<bool>;

    /// Persists the lasting part of an item effect on a creature.
    async fn record_item_effect(&self, _creature_id: &CreatureId, _effect: ItemEffect) -> Result<()> {
        Ok(())
    }

    /// Clears the in-combat markers for the gym and user once a session ends.
    async fn clear_combat(&self, gym_id: &str, user_id: &str) -> Result<()>;
}

/// Decides how much experience a weakened gym creature is worth to each of
/// the player creatures that fought it.
pub trait ExperiencePolicy: Send + Sync {
    fn experience_for(&self, defeated: &CombatCreature, attackers: usize) -> f64;
}

/// Awards nothing. The award calls are still made, with `0.0`.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoExperience;

impl ExperiencePolicy for NoExperience {
    fn experience_for(&self, _defeated: &CombatCreature, _attackers: usize) -> f64 {
        0.0
    }
}

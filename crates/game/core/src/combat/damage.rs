//! Damage calculation and application.

use crate::env::TypeAdvantageCache;
use crate::state::CombatCreature;

/// Raw attack multiplier when the attacker has a type advantage.
pub const ADVANTAGE_MULTIPLIER: u32 = 2;

/// Defense is a percentage reduction, capped here.
const MAX_DEFENSE_PERCENT: u32 = 100;

/// Every hit keeps at least this share (in percent) of the attacker's
/// boosted attack.
const MINIMUM_DAMAGE_PERCENT: u32 = 10;

/// Calculate the damage `attacker` deals to `defender`.
///
/// The type advantage applies identically in both directions (player on
/// gym, gym on player).
pub fn calculate_attack(
    attacker: &CombatCreature,
    defender: &CombatCreature,
    types: &TypeAdvantageCache,
) -> u32 {
    let advantage = types.has_advantage(&attacker.types, &defender.types);
    damage_for(attacker.boosted_attack, defender.boosted_defense, advantage)
}

/// Damage formula on raw stats.
///
/// ```text
/// raw     = attack * (advantage ? 2 : 1)
/// reduced = raw - raw * min(defense, 100) / 100
/// damage  = max(reduced, attack * 10 / 100)
/// ```
///
/// Zero damage is legal (an attacker with no attack) and is still reported.
pub fn damage_for(attack: u32, defense: u32, advantage: bool) -> u32 {
    let attack = u64::from(attack);
    let raw = if advantage {
        attack * u64::from(ADVANTAGE_MULTIPLIER)
    } else {
        attack
    };

    let defense = u64::from(defense.min(MAX_DEFENSE_PERCENT));
    let reduced = raw - (raw * defense) / 100;
    let minimum = (attack * u64::from(MINIMUM_DAMAGE_PERCENT)) / 100;

    reduced.max(minimum).min(u64::from(u32::MAX)) as u32
}

//! Consumable items usable on the player's active creature mid-combat.
//!
//! Items are identified on the wire by their catalogue serial. Owning and
//! consuming the item is the caller's concern; this module only validates
//! and applies the effect.

use thiserror::Error;

use crate::state::{CombatCreature, scale_stat};

/// Flat hp restored by painkillers.
const PAINKILLERS_HP: u32 = 50;

/// Flat hp restored by a small aid kit.
const SMALL_AID_KIT_HP: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ItemError {
    #[error("the creature does not need healing")]
    HealingNotNeeded,

    #[error("item serial {0} cannot be used in combat")]
    UnsupportedItem(u32),

    #[error("there is no active creature to use the item on")]
    NoActiveCreature,
}

impl ItemError {
    /// Stable reason code sent to clients.
    pub const fn code(&self) -> &'static str {
        match self {
            ItemError::HealingNotNeeded => "HEALING_NOT_NEEDED",
            ItemError::UnsupportedItem(_) => "NON_SUPPORTED_ITEM",
            ItemError::NoActiveCreature => "NO_ACTIVE_LOOMIE",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CombatItem {
    Painkillers,
    SmallAidKit,
    BigAidKit,
    Defibrillator,
    SteroidsInjection,
    Vitamins,
    UnknownBeverage,
}

/// What an item did, so callers can persist lasting changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemEffect {
    Healed { amount: u32 },
    AttackBoosted { amount: u32 },
    MaxHpBoosted { amount: u32 },
    LeveledUp { level: u32 },
}

impl CombatItem {
    pub fn from_serial(serial: u32) -> Result<Self, ItemError> {
        let item = match serial {
            1 => CombatItem::Painkillers,
            2 => CombatItem::SmallAidKit,
            3 => CombatItem::BigAidKit,
            4 => CombatItem::Defibrillator,
            5 => CombatItem::SteroidsInjection,
            6 => CombatItem::Vitamins,
            7 => CombatItem::UnknownBeverage,
            other => return Err(ItemError::UnsupportedItem(other)),
        };
        Ok(item)
    }

    pub const fn serial(self) -> u32 {
        match self {
            CombatItem::Painkillers => 1,
            CombatItem::SmallAidKit => 2,
            CombatItem::BigAidKit => 3,
            CombatItem::Defibrillator => 4,
            CombatItem::SteroidsInjection => 5,
            CombatItem::Vitamins => 6,
            CombatItem::UnknownBeverage => 7,
        }
    }

    /// Checks the item would have an effect, without applying it.
    pub fn check(self, creature: &CombatCreature) -> Result<(), ItemError> {
        let needs_healing = match self {
            CombatItem::Painkillers | CombatItem::SmallAidKit | CombatItem::BigAidKit => {
                !creature.is_at_full_hp()
            }
            CombatItem::Defibrillator => creature.boosted_hp < creature.max_hp / 2,
            CombatItem::SteroidsInjection | CombatItem::Vitamins | CombatItem::UnknownBeverage => {
                true
            }
        };

        if needs_healing {
            Ok(())
        } else {
            Err(ItemError::HealingNotNeeded)
        }
    }

    /// Applies the item to `creature`. Hp never exceeds `max_hp`.
    pub fn apply(self, creature: &mut CombatCreature) -> Result<ItemEffect, ItemError> {
        self.check(creature)?;

        let effect = match self {
            CombatItem::Painkillers => ItemEffect::Healed {
                amount: creature.heal(PAINKILLERS_HP),
            },
            CombatItem::SmallAidKit => ItemEffect::Healed {
                amount: creature.heal(SMALL_AID_KIT_HP),
            },
            CombatItem::BigAidKit => ItemEffect::Healed {
                amount: creature.heal(creature.max_hp),
            },
            CombatItem::Defibrillator => {
                let target = creature.max_hp / 2;
                ItemEffect::Healed {
                    amount: creature.heal(target - creature.boosted_hp),
                }
            }
            CombatItem::SteroidsInjection => {
                let amount = scale_stat(creature.base_attack, creature.level) / 5;
                creature.boosted_attack = creature.boosted_attack.saturating_add(amount);
                ItemEffect::AttackBoosted { amount }
            }
            CombatItem::Vitamins => {
                let amount = scale_stat(creature.base_hp, creature.level) / 5;
                creature.max_hp = creature.max_hp.saturating_add(amount);
                creature.heal(amount);
                ItemEffect::MaxHpBoosted { amount }
            }
            CombatItem::UnknownBeverage => ItemEffect::LeveledUp {
                level: level_up(creature),
            },
        };

        Ok(effect)
    }
}

/// Raises the creature one level, re-scaling its stats while keeping any
/// boosts earned on top of the level curve and the damage already taken.
fn level_up(creature: &mut CombatCreature) -> u32 {
    let old = creature.level;
    let new = old.saturating_add(1);

    let max_hp_boost = creature
        .max_hp
        .saturating_sub(scale_stat(creature.base_hp, old));
    let attack_boost = creature
        .boosted_attack
        .saturating_sub(scale_stat(creature.base_attack, old));
    let defense_boost = creature
        .boosted_defense
        .saturating_sub(scale_stat(creature.base_defense, old));

    let new_max_hp = scale_stat(creature.base_hp, new).saturating_add(max_hp_boost);
    let gained = new_max_hp.saturating_sub(creature.max_hp);

    creature.level = new;
    creature.max_hp = new_max_hp;
    creature.boosted_hp = creature.boosted_hp.saturating_add(gained).min(new_max_hp);
    creature.boosted_attack = scale_stat(creature.base_attack, new).saturating_add(attack_boost);
    creature.boosted_defense = scale_stat(creature.base_defense, new).saturating_add(defense_boost);

    new
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::creature;

    #[test]
    fn serials_round_trip_and_unknown_serials_fail() {
        for serial in 1..=7 {
            assert_eq!(CombatItem::from_serial(serial).unwrap().serial(), serial);
        }
        assert_eq!(
            CombatItem::from_serial(42),
            Err(ItemError::UnsupportedItem(42))
        );
        assert_eq!(ItemError::UnsupportedItem(42).code(), "NON_SUPPORTED_ITEM");
    }

    #[test]
    fn healing_at_full_hp_is_rejected() {
        let mut target = creature("a", 100, 10, 10);
        let err = CombatItem::Painkillers.apply(&mut target).unwrap_err();
        assert_eq!(err, ItemError::HealingNotNeeded);
        assert_eq!(err.code(), "HEALING_NOT_NEEDED");
    }

    #[test]
    fn healing_is_capped_at_max_hp() {
        let mut target = creature("a", 100, 10, 10);
        target.take_damage(30);

        let effect = CombatItem::SmallAidKit.apply(&mut target).unwrap();
        assert_eq!(effect, ItemEffect::Healed { amount: 30 });
        assert_eq!(target.boosted_hp, 100);
    }

    #[test]
    fn defibrillator_restores_half_of_max() {
        let mut target = creature("a", 100, 10, 10);
        target.take_damage(90);

        CombatItem::Defibrillator.apply(&mut target).unwrap();
        assert_eq!(target.boosted_hp, 50);
        assert_eq!(
            CombatItem::Defibrillator.apply(&mut target),
            Err(ItemError::HealingNotNeeded)
        );
    }

    #[test]
    fn vitamins_raise_max_hp_and_hp_together() {
        let mut target = creature("a", 100, 10, 10);
        CombatItem::Vitamins.apply(&mut target).unwrap();
        assert_eq!(target.max_hp, 120);
        assert_eq!(target.boosted_hp, 120);
    }

    #[test]
    fn unknown_beverage_levels_up_keeping_boosts_and_damage() {
        let mut target = creature("a", 80, 40, 16);
        CombatItem::SteroidsInjection.apply(&mut target).unwrap(); // +8 attack
        target.take_damage(30); // 50 / 80

        let effect = CombatItem::UnknownBeverage.apply(&mut target).unwrap();
        assert_eq!(effect, ItemEffect::LeveledUp { level: 2 });

        // level 2 factor = 9/8
        assert_eq!(target.max_hp, 90);
        assert_eq!(target.boosted_hp, 60);
        assert_eq!(target.boosted_attack, 45 + 8);
        assert_eq!(target.boosted_defense, 18);
        assert!(target.boosted_hp <= target.max_hp);
    }
}

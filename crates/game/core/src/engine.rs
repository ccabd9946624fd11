//! Combat state machine transitions.
//!
//! [`Combat`] owns both rosters and the fought-by ledger and exposes one
//! method per protocol step. Each method mutates the state and returns the
//! events to announce, in order, so the caller can apply and enqueue them
//! inside a single critical section.
//!
//! Timing (dodge windows, cooldowns, attack intervals) is not modelled here.

use std::sync::Arc;

use crate::combat::{CombatEvent, GYM_DODGE_PERCENT, calculate_attack, roll_dodge};
use crate::env::{Dice, TypeAdvantageCache};
use crate::items::{CombatItem, ItemEffect, ItemError};
use crate::state::{CombatCreature, CombatResult, CreatureId, FoughtByLedger, Roster, Side};

/// A gym attack whose damage was fixed before the dodge window opened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingGymAttack {
    pub attacker: CreatureId,
    pub target: CreatureId,
    pub damage: u32,
}

/// Experience owed after a gym creature is weakened.
#[derive(Clone, Debug, PartialEq)]
pub struct ExperienceAward {
    pub defeated: CombatCreature,
    /// Distinct player creatures that fought the defeated creature.
    pub attackers: Vec<CreatureId>,
}

/// Result of one attack resolution.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttackOutcome {
    pub events: Vec<CombatEvent>,
    pub award: Option<ExperienceAward>,
    pub result: Option<CombatResult>,
}

impl AttackOutcome {
    fn single(event: CombatEvent) -> Self {
        Self {
            events: vec![event],
            ..Self::default()
        }
    }
}

/// Result of using an item on the player's active creature.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemOutcome {
    pub effect: ItemEffect,
    pub loomie: CombatCreature,
}

/// Active creatures and alive counts, as announced at combat start.
#[derive(Clone, Debug, PartialEq)]
pub struct CombatSnapshot {
    pub player_loomie: Option<CombatCreature>,
    pub alive_player_loomies: usize,
    pub gym_loomie: Option<CombatCreature>,
    pub alive_gym_loomies: usize,
}

/// One combat between a player roster and a gym roster.
#[derive(Debug)]
pub struct Combat {
    player: Roster,
    gym: Roster,
    ledger: FoughtByLedger,
    types: Arc<TypeAdvantageCache>,
    gym_dodge_percent: u32,
    result: Option<CombatResult>,
}

impl Combat {
    pub fn new(player: Roster, gym: Roster, types: Arc<TypeAdvantageCache>) -> Self {
        debug_assert_eq!(player.side(), Side::Player);
        debug_assert_eq!(gym.side(), Side::Gym);

        Self {
            player,
            gym,
            ledger: FoughtByLedger::new(),
            types,
            gym_dodge_percent: GYM_DODGE_PERCENT,
            result: None,
        }
    }

    /// Overrides the gym-side dodge probability (percent).
    pub fn with_gym_dodge_percent(mut self, percent: u32) -> Self {
        self.gym_dodge_percent = percent.min(100);
        self
    }

    pub fn player(&self) -> &Roster {
        &self.player
    }

    pub fn gym(&self) -> &Roster {
        &self.gym
    }

    pub fn ledger(&self) -> &FoughtByLedger {
        &self.ledger
    }

    /// Set once either roster is exhausted.
    pub fn result(&self) -> Option<CombatResult> {
        self.result
    }

    pub fn is_over(&self) -> bool {
        self.result.is_some()
    }

    pub fn snapshot(&self) -> CombatSnapshot {
        CombatSnapshot {
            player_loomie: self.player.active().cloned(),
            alive_player_loomies: self.player.alive(),
            gym_loomie: self.gym.active().cloned(),
            alive_gym_loomies: self.gym.alive(),
        }
    }

    /// Computes the next gym attack before its dodge window opens.
    ///
    /// Returns `None` once the combat is over.
    pub fn prepare_gym_attack(&self) -> Option<PendingGymAttack> {
        if self.is_over() {
            return None;
        }
        let attacker = self.gym.active()?;
        let target = self.player.active()?;

        Some(PendingGymAttack {
            attacker: attacker.id.clone(),
            target: target.id.clone(),
            damage: calculate_attack(attacker, target, &self.types),
        })
    }

    /// Resolves a gym attack once the dodge window closed.
    pub fn resolve_gym_attack(&mut self, pending: &PendingGymAttack, dodged: bool) -> AttackOutcome {
        if self.is_over() {
            return AttackOutcome::default();
        }
        if dodged {
            return AttackOutcome::single(CombatEvent::GymAttackDodged);
        }

        let Some(target) = self.player.active_mut() else {
            return AttackOutcome::default();
        };
        let hp = target.take_damage(pending.damage);
        if hp > 0 {
            return AttackOutcome::single(CombatEvent::UserLoomieHpUpdated { hp });
        }

        let mut outcome = AttackOutcome::default();
        if let Some(weakened) = self.player.remove_active() {
            outcome.events.push(CombatEvent::UserLoomieWeakened {
                loomie_id: weakened.id,
            });
        }

        match self.player.active() {
            Some(next) => outcome.events.push(CombatEvent::PlayerLoomieUpdated {
                loomie: next.clone(),
                alive: self.player.alive(),
            }),
            None => {
                outcome.events.push(CombatEvent::UserHasLost);
                outcome.result = Some(CombatResult::PlayerLost);
                self.result = outcome.result;
            }
        }

        outcome
    }

    /// Resolves a player attack on the gym's active creature.
    ///
    /// Records the fought-by pair first, then computes damage, then rolls
    /// the gym's dodge.
    pub fn resolve_user_attack(&mut self, dice: &(impl Dice + ?Sized)) -> AttackOutcome {
        if self.is_over() {
            return AttackOutcome::default();
        }
        let (Some(attacker), Some(defender)) = (self.player.active(), self.gym.active()) else {
            return AttackOutcome::default();
        };

        self.ledger.record(&defender.id, &attacker.id);
        let damage = calculate_attack(attacker, defender, &self.types);

        if roll_dodge(dice, self.gym_dodge_percent) {
            return AttackOutcome::single(CombatEvent::UserAttackDodged);
        }

        let Some(defender) = self.gym.active_mut() else {
            return AttackOutcome::default();
        };
        let hp = defender.take_damage(damage);
        if hp > 0 {
            return AttackOutcome::single(CombatEvent::GymLoomieHpUpdated { hp });
        }

        let mut outcome = AttackOutcome::default();
        if let Some(weakened) = self.gym.remove_active() {
            outcome.events.push(CombatEvent::GymLoomieWeakened {
                loomie_id: weakened.id.clone(),
            });
            outcome.award = Some(ExperienceAward {
                attackers: self.ledger.take(&weakened.id),
                defeated: weakened,
            });
        }

        match self.gym.active() {
            Some(next) => outcome.events.push(CombatEvent::GymLoomieUpdated {
                loomie: next.clone(),
                alive: self.gym.alive(),
            }),
            None => {
                outcome.events.push(CombatEvent::UserHasWon);
                outcome.result = Some(CombatResult::PlayerWon);
                self.result = outcome.result;
            }
        }

        outcome
    }

    /// Applies an item to the player's active creature.
    pub fn use_item(&mut self, item: CombatItem) -> Result<ItemOutcome, ItemError> {
        if self.is_over() {
            return Err(ItemError::NoActiveCreature);
        }
        let target = self
            .player
            .active_mut()
            .ok_or(ItemError::NoActiveCreature)?;
        let effect = item.apply(target)?;

        Ok(ItemOutcome {
            effect,
            loomie: target.clone(),
        })
    }

    /// Validates an item against the active creature without applying it.
    pub fn check_item(&self, item: CombatItem) -> Result<(), ItemError> {
        if self.is_over() {
            return Err(ItemError::NoActiveCreature);
        }
        let target = self.player.active().ok_or(ItemError::NoActiveCreature)?;
        item.check(target)
    }
}

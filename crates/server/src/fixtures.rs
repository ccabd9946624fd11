//! In-memory game world loaded from a JSON fixture.
//!
//! Stands in for the user, gym and item stores: it answers JOIN requests
//! with a [`CombatSetup`] and implements [`CombatRecords`] so sessions can
//! consume items and award experience against it.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use combat_runtime::repository::Result as RecordsResult;
use combat_runtime::{CombatRecords, CombatSetup, RecordsError};
use loomie_core::{CaughtCreature, CreatureId, ItemEffect, StaticTypeChart, TypeAdvantageCache};

const DEMO_WORLD: &str = include_str!("../fixtures/world.json");

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read fixture file")]
    Io(#[from] std::io::Error),

    #[error("failed to parse fixture")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate {kind} id {id}")]
    Duplicate { kind: &'static str, id: String },
}

/// Why a JOIN request cannot start a combat.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinRejection {
    #[error("user {0} does not exist")]
    UnknownUser(String),

    #[error("gym {0} does not exist")]
    UnknownGym(String),

    #[error("users cannot challenge their own gym")]
    OwnGym,

    #[error("user has no loomies in the team")]
    EmptyTeam,

    #[error("gym has no protectors")]
    NoProtectors,
}

impl JoinRejection {
    pub const fn code(&self) -> &'static str {
        match self {
            JoinRejection::UnknownUser(_) => "USER_NOT_FOUND",
            JoinRejection::UnknownGym(_) => "GYM_NOT_FOUND",
            JoinRejection::OwnGym => "CANNOT_CHALLENGE_OWN_GYM",
            JoinRejection::EmptyTeam => "EMPTY_TEAM",
            JoinRejection::NoProtectors => "GYM_HAS_NO_PROTECTORS",
        }
    }
}

#[derive(Debug, Deserialize)]
struct WorldFixture {
    #[serde(default)]
    types: StaticTypeChart,
    #[serde(default)]
    users: Vec<UserFixture>,
    #[serde(default)]
    gyms: Vec<GymFixture>,
}

#[derive(Debug, Deserialize)]
struct UserFixture {
    id: String,
    #[serde(default)]
    team: Vec<CaughtCreature>,
    #[serde(default)]
    items: HashMap<u32, u32>,
}

#[derive(Debug, Clone, Deserialize)]
struct GymFixture {
    id: String,
    #[serde(default)]
    owner: Option<String>,
    #[serde(default)]
    protectors: Vec<CaughtCreature>,
}

#[derive(Debug)]
struct UserRecord {
    team: Vec<CaughtCreature>,
    items: HashMap<u32, u32>,
}

#[derive(Debug, Default)]
struct WorldState {
    users: HashMap<String, UserRecord>,
    gyms: HashMap<String, GymFixture>,
}

pub struct World {
    types: Arc<TypeAdvantageCache>,
    state: Mutex<WorldState>,
}

impl World {
    pub fn from_json(json: &str) -> Result<Self, FixtureError> {
        let fixture: WorldFixture = serde_json::from_str(json)?;
        let mut state = WorldState::default();

        for user in fixture.users {
            let record = UserRecord {
                team: user.team,
                items: user.items,
            };
            if state.users.insert(user.id.clone(), record).is_some() {
                return Err(FixtureError::Duplicate {
                    kind: "user",
                    id: user.id,
                });
            }
        }
        for gym in fixture.gyms {
            if state.gyms.insert(gym.id.clone(), gym.clone()).is_some() {
                return Err(FixtureError::Duplicate {
                    kind: "gym",
                    id: gym.id,
                });
            }
        }

        Ok(Self {
            types: Arc::new(TypeAdvantageCache::new(Arc::new(fixture.types))),
            state: Mutex::new(state),
        })
    }

    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// The world bundled with the binary.
    pub fn demo() -> Result<Self, FixtureError> {
        Self::from_json(DEMO_WORLD)
    }

    pub fn types(&self) -> Arc<TypeAdvantageCache> {
        Arc::clone(&self.types)
    }

    fn lock(&self) -> RecordsResult<MutexGuard<'_, WorldState>> {
        self.state.lock().map_err(|_| RecordsError::LockPoisoned)
    }

    /// Builds the combat for `user_id` challenging `gym_id`.
    pub fn challenge(&self, user_id: &str, gym_id: &str) -> Result<CombatSetup, JoinRejection> {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let user = state
            .users
            .get(user_id)
            .ok_or_else(|| JoinRejection::UnknownUser(user_id.to_owned()))?;
        let gym = state
            .gyms
            .get(gym_id)
            .ok_or_else(|| JoinRejection::UnknownGym(gym_id.to_owned()))?;

        if gym.owner.as_deref() == Some(user_id) {
            return Err(JoinRejection::OwnGym);
        }
        if user.team.is_empty() {
            return Err(JoinRejection::EmptyTeam);
        }
        if gym.protectors.is_empty() {
            return Err(JoinRejection::NoProtectors);
        }

        Ok(CombatSetup {
            gym_id: gym_id.to_owned(),
            user_id: user_id.to_owned(),
            team: user.team.clone(),
            protectors: gym.protectors.clone(),
        })
    }

    /// A user's creature as currently recorded.
    pub fn creature(&self, creature_id: &CreatureId) -> Option<CaughtCreature> {
        let state = self.lock().ok()?;
        state
            .users
            .values()
            .flat_map(|user| user.team.iter())
            .find(|creature| &creature.id == creature_id)
            .cloned()
    }

    pub fn item_count(&self, user_id: &str, serial: u32) -> u32 {
        self.lock()
            .ok()
            .and_then(|state| {
                state
                    .users
                    .get(user_id)
                    .and_then(|user| user.items.get(&serial).copied())
            })
            .unwrap_or_default()
    }

    fn with_creature<T>(
        &self,
        creature_id: &CreatureId,
        update: impl FnOnce(&mut CaughtCreature) -> T,
    ) -> RecordsResult<T> {
        let mut state = self.lock()?;
        let creature = state
            .users
            .values_mut()
            .flat_map(|user| user.team.iter_mut())
            .find(|creature| &creature.id == creature_id)
            .ok_or_else(|| RecordsError::UnknownCreature(creature_id.clone()))?;
        Ok(update(creature))
    }
}

#[async_trait]
impl CombatRecords for World {
    async fn award_experience(&self, creature_id: &CreatureId, amount: f64) -> RecordsResult<()> {
        let total = self.with_creature(creature_id, |creature| {
            creature.experience += amount;
            creature.experience
        })?;
        info!(
            target: "combat::transport",
            creature = %creature_id,
            amount,
            total,
            "experience awarded"
        );
        Ok(())
    }

    async fn consume_item(&self, user_id: &str, serial: u32) -> RecordsResult<bool> {
        let mut state = self.lock()?;
        let user = state
            .users
            .get_mut(user_id)
            .ok_or_else(|| RecordsError::UnknownUser(user_id.to_owned()))?;

        match user.items.get_mut(&serial) {
            Some(count) if *count > 0 => {
                *count -= 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn record_item_effect(
        &self,
        creature_id: &CreatureId,
        effect: ItemEffect,
    ) -> RecordsResult<()> {
        if let ItemEffect::LeveledUp { level } = effect {
            self.with_creature(creature_id, |creature| creature.level = level)?;
        }
        Ok(())
    }

    async fn clear_combat(&self, gym_id: &str, user_id: &str) -> RecordsResult<()> {
        info!(target: "combat::transport", gym_id, user_id, "combat record cleared");
        Ok(())
    }
}

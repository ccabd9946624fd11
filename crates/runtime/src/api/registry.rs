//! Process-wide map from gym id to the combat running on it.
//!
//! The [`SessionRegistry`] enforces at most one session per gym and at most
//! one session per user. Every operation takes the same lock, so
//! `includes`, `register` and `unregister` are atomic with respect to each
//! other.
//!
//! # Design
//!
//! - **Fail closed**: `register` never overwrites an existing entry
//! - **Cloneable**: clones share the same map and metrics
//! - **Poison tolerant**: a panicked holder does not wedge the registry

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use super::SessionHandle;
use crate::workers::CombatMetrics;

/// Why a registration was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistryConflict {
    GymInCombat,
    UserInCombat,
}

#[derive(Debug, Default)]
struct Sessions {
    by_gym: HashMap<String, SessionHandle>,
    users: HashSet<String>,
}

#[derive(Clone, Debug, Default)]
pub struct SessionRegistry {
    sessions: Arc<Mutex<Sessions>>,
    metrics: Arc<CombatMetrics>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Sessions> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// True if a combat is running on `gym_id`.
    pub fn includes(&self, gym_id: &str) -> bool {
        self.lock().by_gym.contains_key(gym_id)
    }

    /// True if `user_id` is fighting any gym.
    pub fn includes_user(&self, user_id: &str) -> bool {
        self.lock().users.contains(user_id)
    }

    /// Registers `session` under `gym_id`.
    ///
    /// Returns `false` if the gym or the session's user is already in
    /// combat; existing entries are left untouched.
    pub fn register(&self, gym_id: &str, session: SessionHandle) -> bool {
        self.try_register(gym_id, session).is_ok()
    }

    /// Like [`register`](Self::register), reporting which side conflicted.
    pub fn try_register(
        &self,
        gym_id: &str,
        session: SessionHandle,
    ) -> Result<(), RegistryConflict> {
        let mut sessions = self.lock();
        if sessions.by_gym.contains_key(gym_id) {
            debug!(target: "combat::registry", gym_id, "gym already in combat");
            return Err(RegistryConflict::GymInCombat);
        }
        if sessions.users.contains(session.user_id()) {
            debug!(
                target: "combat::registry",
                gym_id,
                user_id = session.user_id(),
                "user already in combat"
            );
            return Err(RegistryConflict::UserInCombat);
        }

        sessions.users.insert(session.user_id().to_owned());
        sessions.by_gym.insert(gym_id.to_owned(), session);
        info!(
            target: "combat::registry",
            gym_id,
            active = sessions.by_gym.len(),
            "session registered"
        );
        Ok(())
    }

    /// Removes the entry for `gym_id` and frees its user. Returns `false` if
    /// there was none.
    pub fn unregister(&self, gym_id: &str) -> bool {
        let mut sessions = self.lock();
        let Some(session) = sessions.by_gym.remove(gym_id) else {
            return false;
        };
        sessions.users.remove(session.user_id());
        info!(
            target: "combat::registry",
            gym_id,
            active = sessions.by_gym.len(),
            "session unregistered"
        );
        true
    }

    pub fn get(&self, gym_id: &str) -> Option<SessionHandle> {
        self.lock().by_gym.get(gym_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().by_gym.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().by_gym.is_empty()
    }

    /// Signals every registered session to close.
    pub fn close_all(&self) -> usize {
        let sessions: Vec<SessionHandle> = self.lock().by_gym.values().cloned().collect();
        sessions.iter().filter(|session| session.close()).count()
    }

    pub fn metrics(&self) -> &Arc<CombatMetrics> {
        &self.metrics
    }
}

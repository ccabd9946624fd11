//! In-memory CombatRecords implementation for tests and local runs.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use loomie_core::{CreatureId, ItemEffect};

use super::{CombatRecords, RecordsError, Result};

#[derive(Debug, Default)]
struct Inner {
    experience: HashMap<CreatureId, f64>,
    awards: Vec<(CreatureId, f64)>,
    items: HashMap<(String, u32), u32>,
    effects: Vec<(CreatureId, ItemEffect)>,
    cleared: Vec<(String, String)>,
}

/// Records every collaborator call so tests can assert on them.
#[derive(Debug, Default)]
pub struct InMemoryCombatRecords {
    inner: Mutex<Inner>,
}

impl InMemoryCombatRecords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gives `user_id` `count` units of item `serial`.
    pub fn with_items(self, user_id: &str, serial: u32, count: u32) -> Self {
        if let Ok(mut inner) = self.inner.lock() {
            *inner.items.entry((user_id.to_owned(), serial)).or_default() += count;
        }
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| RecordsError::LockPoisoned)
    }

    /// Every award call, in call order.
    pub fn awards(&self) -> Vec<(CreatureId, f64)> {
        self.lock().map(|inner| inner.awards.clone()).unwrap_or_default()
    }

    pub fn experience_of(&self, creature_id: &CreatureId) -> f64 {
        self.lock()
            .ok()
            .and_then(|inner| inner.experience.get(creature_id).copied())
            .unwrap_or_default()
    }

    pub fn item_count(&self, user_id: &str, serial: u32) -> u32 {
        self.lock()
            .ok()
            .and_then(|inner| inner.items.get(&(user_id.to_owned(), serial)).copied())
            .unwrap_or_default()
    }

    pub fn item_effects(&self) -> Vec<(CreatureId, ItemEffect)> {
        self.lock()
            .map(|inner| inner.effects.clone())
            .unwrap_or_default()
    }

    /// `(gym_id, user_id)` pairs passed to `clear_combat`.
    pub fn cleared(&self) -> Vec<(String, String)> {
        self.lock().map(|inner| inner.cleared.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CombatRecords for InMemoryCombatRecords {
    async fn award_experience(&self, creature_id: &CreatureId, amount: f64) -> Result<()> {
        let mut inner = self.lock()?;
        *inner.experience.entry(creature_id.clone()).or_default() += amount;
        inner.awards.push((creature_id.clone(), amount));
        Ok(())
    }

    async fn consume_item(&self, user_id: &str, serial: u32) -> Result<bool> {
        let mut inner = self.lock()?;
        match inner.items.get_mut(&(user_id.to_owned(), serial)) {
            Some(count) if *count > 0 => {
                *count -= 1;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn record_item_effect(&self, creature_id: &CreatureId, effect: ItemEffect) -> Result<()> {
        self.lock()?.effects.push((creature_id.clone(), effect));
        Ok(())
    }

    async fn clear_combat(&self, gym_id: &str, user_id: &str) -> Result<()> {
        self.lock()?
            .cleared
            .push((gym_id.to_owned(), user_id.to_owned()));
        Ok(())
    }
}

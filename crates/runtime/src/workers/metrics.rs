//! Combat session metrics and statistics.
//!
//! Tracks session lifecycles, attack traffic and weakened creatures across
//! every session spawned against one registry.

use std::sync::atomic::{AtomicU64, Ordering};

use loomie_core::CombatEvent;

use crate::api::CloseReason;

/// Counters shared by all sessions of a registry.
///
/// Uses atomics for lock-free access across session tasks.
#[derive(Debug, Default)]
pub struct CombatMetrics {
    sessions_started: AtomicU64,
    sessions_ended: AtomicU64,
    sessions_won: AtomicU64,
    sessions_lost: AtomicU64,
    sessions_inactive: AtomicU64,

    /// Player attacks that were resolved.
    player_attacks: AtomicU64,
    /// Player attacks dropped by the cooldown.
    rate_limited: AtomicU64,
    /// Gym attack cycles that reached resolution.
    gym_attacks: AtomicU64,

    /// Gym attacks the player dodged.
    player_dodges: AtomicU64,
    /// Player attacks the gym dodged.
    gym_dodges: AtomicU64,

    player_weakened: AtomicU64,
    gym_weakened: AtomicU64,
    items_used: AtomicU64,
}

impl CombatMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_session_started(&self) {
        self.sessions_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_session_ended(&self, reason: CloseReason) {
        self.sessions_ended.fetch_add(1, Ordering::Relaxed);
        let counter = match reason {
            CloseReason::Won => &self.sessions_won,
            CloseReason::Lost => &self.sessions_lost,
            CloseReason::Inactive => &self.sessions_inactive,
            CloseReason::TransportClosed | CloseReason::Closed => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_player_attack(&self) {
        self.player_attacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_gym_attack(&self) {
        self.gym_attacks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_item_used(&self) {
        self.items_used.fetch_add(1, Ordering::Relaxed);
    }

    /// Updates dodge and weakened counters from resolved combat events.
    pub fn record_events(&self, events: &[CombatEvent]) {
        for event in events {
            let counter = match event {
                CombatEvent::GymAttackDodged => &self.player_dodges,
                CombatEvent::UserAttackDodged => &self.gym_dodges,
                CombatEvent::UserLoomieWeakened { .. } => &self.player_weakened,
                CombatEvent::GymLoomieWeakened { .. } => &self.gym_weakened,
                _ => continue,
            };
            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Sessions started but not yet ended.
    pub fn active_sessions(&self) -> u64 {
        let started = self.sessions_started.load(Ordering::Relaxed);
        started.saturating_sub(self.sessions_ended.load(Ordering::Relaxed))
    }

    /// Creates a snapshot of all metrics for display/logging.
    ///
    /// Note: This is not atomic across all fields.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            sessions_started: self.sessions_started.load(Ordering::Relaxed),
            sessions_ended: self.sessions_ended.load(Ordering::Relaxed),
            sessions_won: self.sessions_won.load(Ordering::Relaxed),
            sessions_lost: self.sessions_lost.load(Ordering::Relaxed),
            sessions_inactive: self.sessions_inactive.load(Ordering::Relaxed),
            player_attacks: self.player_attacks.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            gym_attacks: self.gym_attacks.load(Ordering::Relaxed),
            player_dodges: self.player_dodges.load(Ordering::Relaxed),
            gym_dodges: self.gym_dodges.load(Ordering::Relaxed),
            player_weakened: self.player_weakened.load(Ordering::Relaxed),
            gym_weakened: self.gym_weakened.load(Ordering::Relaxed),
            items_used: self.items_used.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub sessions_started: u64,
    pub sessions_ended: u64,
    pub sessions_won: u64,
    pub sessions_lost: u64,
    pub sessions_inactive: u64,
    pub player_attacks: u64,
    pub rate_limited: u64,
    pub gym_attacks: u64,
    pub player_dodges: u64,
    pub gym_dodges: u64,
    pub player_weakened: u64,
    pub gym_weakened: u64,
    pub items_used: u64,
}

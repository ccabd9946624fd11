//! Gym attacker task.
//!
//! Sleeps a random interval, then runs one attack cycle:
//! prepare (damage fixed) → announce → dodge window → resolve.
//! Stops when the session closes or the combat is decided.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;
use tokio::time;
use tracing::{debug, trace};

use loomie_core::CombatEvent;

use super::dodge::DodgeWindow;
use super::state::{SessionState, wait_closed};
use crate::api::CloseReason;
use crate::events::OutboundEvent;

pub(crate) struct GymAttacker {
    state: Arc<SessionState>,
    window: DodgeWindow,
    shutdown: watch::Receiver<Option<CloseReason>>,
}

impl GymAttacker {
    pub(crate) fn new(state: Arc<SessionState>, window: DodgeWindow) -> Self {
        let shutdown = state.handle.subscribe();
        Self {
            state,
            window,
            shutdown,
        }
    }

    pub(crate) async fn run(mut self) {
        debug!(target: "combat::gym", gym_id = self.state.gym_id(), "gym attacker started");

        loop {
            let delay = self.next_delay();
            tokio::select! {
                _ = wait_closed(&mut self.shutdown) => break,
                _ = time::sleep(delay) => {}
            }

            if !self.attack_cycle().await {
                break;
            }
        }

        debug!(target: "combat::gym", gym_id = self.state.gym_id(), "gym attacker stopped");
    }

    fn next_delay(&self) -> Duration {
        let config = &self.state.config;
        if config.gym_attack_min >= config.gym_attack_max {
            return config.gym_attack_min;
        }
        rand::thread_rng().gen_range(config.gym_attack_min..=config.gym_attack_max)
    }

    /// Runs one cycle. Returns `false` once there is nothing left to attack
    /// or the session closed mid-cycle.
    async fn attack_cycle(&mut self) -> bool {
        let pending = {
            let combat = self.state.combat.lock().await;
            let Some(pending) = combat.prepare_gym_attack() else {
                return false;
            };

            let stale = self.window.drain();
            if stale > 0 {
                trace!(target: "combat::gym", stale, "discarded stale dodge signals");
            }
            self.state
                .emit(OutboundEvent::from(CombatEvent::GymAttackCandidate));
            pending
        };

        let dodged = tokio::select! {
            _ = wait_closed(&mut self.shutdown) => return false,
            dodged = self.window.wait(self.state.config.dodge_window) => dodged,
        };

        let outcome = {
            let mut combat = self.state.combat.lock().await;
            let outcome = combat.resolve_gym_attack(&pending, dodged);
            self.state.emit_all(&outcome.events);
            outcome
        };

        if outcome.events.is_empty() {
            return false;
        }

        self.state.metrics.record_gym_attack();
        self.state.metrics.record_events(&outcome.events);
        debug!(
            target: "combat::gym",
            gym_id = self.state.gym_id(),
            attacker = %pending.attacker,
            defender = %pending.target,
            damage = pending.damage,
            dodged,
            "gym attack resolved"
        );

        match outcome.result {
            Some(result) => {
                self.state.finish(result);
                false
            }
            None => true,
        }
    }
}

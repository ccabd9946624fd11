//! State shared by the tasks of one session.

use std::sync::{Arc, PoisonError};
use std::time::Duration;

use tokio::sync::{Mutex, mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use loomie_core::{Combat, CombatEvent, CombatResult, Dice, ExperienceAward};

use super::CombatMetrics;
use crate::api::{CloseReason, SessionHandle};
use crate::config::CombatConfig;
use crate::events::OutboundEvent;
use crate::repository::{CombatRecords, ExperiencePolicy};

pub(crate) struct SessionState {
    pub(crate) handle: SessionHandle,
    /// Rosters, ledger and result. Every mutation and the enqueue of its
    /// announcement happen under this lock.
    pub(crate) combat: Mutex<Combat>,
    pub(crate) config: CombatConfig,
    pub(crate) dice: Arc<dyn Dice>,
    pub(crate) records: Arc<dyn CombatRecords>,
    pub(crate) experience: Arc<dyn ExperiencePolicy>,
    pub(crate) metrics: Arc<CombatMetrics>,
    outbound: mpsc::UnboundedSender<OutboundEvent>,
    last_inbound: std::sync::Mutex<Instant>,
}

impl SessionState {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        handle: SessionHandle,
        combat: Combat,
        config: CombatConfig,
        dice: Arc<dyn Dice>,
        records: Arc<dyn CombatRecords>,
        experience: Arc<dyn ExperiencePolicy>,
        metrics: Arc<CombatMetrics>,
        outbound: mpsc::UnboundedSender<OutboundEvent>,
    ) -> Self {
        Self {
            handle,
            combat: Mutex::new(combat),
            config,
            dice,
            records,
            experience,
            metrics,
            outbound,
            last_inbound: std::sync::Mutex::new(Instant::now()),
        }
    }

    pub(crate) fn gym_id(&self) -> &str {
        self.handle.gym_id()
    }

    pub(crate) fn user_id(&self) -> &str {
        self.handle.user_id()
    }

    /// Queues one frame for the transport.
    pub(crate) fn emit(&self, event: OutboundEvent) {
        if self.outbound.send(event).is_err() && self.handle.close_with(CloseReason::TransportClosed)
        {
            debug!(
                target: "combat::session",
                gym_id = self.gym_id(),
                "outbound receiver dropped"
            );
        }
    }

    pub(crate) fn emit_all(&self, events: &[CombatEvent]) {
        for event in events {
            self.emit(OutboundEvent::from(event.clone()));
        }
    }

    /// Refreshes the last-inbound timestamp.
    pub(crate) fn touch(&self) {
        *self
            .last_inbound
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    pub(crate) fn idle_for(&self) -> Duration {
        self.last_inbound
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elapsed()
    }

    /// Marks the combat as decided and signals teardown.
    pub(crate) fn finish(&self, result: CombatResult) {
        let reason = match result {
            CombatResult::PlayerWon => CloseReason::Won,
            CombatResult::PlayerLost => CloseReason::Lost,
        };
        if self.handle.close_with(reason) {
            info!(
                target: "combat::session",
                gym_id = self.gym_id(),
                user_id = self.user_id(),
                %result,
                "combat decided"
            );
        }
    }

    /// Awards experience to each distinct player creature that fought the
    /// weakened gym creature.
    pub(crate) async fn award_experience(&self, award: ExperienceAward) {
        let amount = self
            .experience
            .experience_for(&award.defeated, award.attackers.len());

        for attacker in &award.attackers {
            if let Err(error) = self.records.award_experience(attacker, amount).await {
                warn!(
                    target: "combat::session",
                    gym_id = self.gym_id(),
                    creature = %attacker,
                    %error,
                    "failed to award experience"
                );
            }
        }

        debug!(
            target: "combat::session",
            gym_id = self.gym_id(),
            defeated = %award.defeated.id,
            attackers = award.attackers.len(),
            amount,
            "experience awarded"
        );
    }
}

/// Resolves once the session has been asked to close.
pub(crate) async fn wait_closed(shutdown: &mut watch::Receiver<Option<CloseReason>>) {
    let _ = shutdown.wait_for(Option::is_some).await;
}

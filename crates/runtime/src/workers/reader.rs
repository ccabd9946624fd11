//! Inbound read loop.
//!
//! Consumes raw frames from the transport, refreshes the activity
//! timestamp and dispatches player commands. Malformed frames and unknown
//! types are dropped without a reply.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, trace, warn};

use loomie_core::{CombatItem, ItemEffect};

use super::dodge::DodgeSignal;
use super::state::{SessionState, wait_closed};
use crate::api::CloseReason;
use crate::events::{InboundCommand, OutboundEvent};

/// Reason code sent when the user lacks the item.
pub(crate) const USER_DOES_NOT_OWN_ITEM: &str = "USER_DOES_NOT_OWN_ITEM";
/// Reason code sent when a collaborator call failed.
pub(crate) const SERVER_ERROR: &str = "SERVER_ERROR";

pub(crate) struct InboundReader {
    state: Arc<SessionState>,
    inbound: mpsc::Receiver<String>,
    dodge: DodgeSignal,
    shutdown: watch::Receiver<Option<CloseReason>>,
    last_attack: Option<Instant>,
}

impl InboundReader {
    pub(crate) fn new(
        state: Arc<SessionState>,
        inbound: mpsc::Receiver<String>,
        dodge: DodgeSignal,
    ) -> Self {
        let shutdown = state.handle.subscribe();
        Self {
            state,
            inbound,
            dodge,
            shutdown,
            last_attack: None,
        }
    }

    pub(crate) async fn run(mut self) {
        loop {
            let frame = tokio::select! {
                _ = wait_closed(&mut self.shutdown) => break,
                frame = self.inbound.recv() => frame,
            };

            let Some(frame) = frame else {
                if self.state.handle.close_with(CloseReason::TransportClosed) {
                    debug!(
                        target: "combat::session",
                        gym_id = self.state.gym_id(),
                        "inbound stream ended"
                    );
                }
                break;
            };

            self.handle_frame(&frame).await;
        }
    }

    async fn handle_frame(&mut self, frame: &str) {
        let command = match InboundCommand::from_frame(frame) {
            Ok(command) => command,
            Err(error) => {
                debug!(
                    target: "combat::session",
                    gym_id = self.state.gym_id(),
                    %error,
                    "dropping malformed frame"
                );
                return;
            }
        };

        self.state.touch();

        match command {
            InboundCommand::UserAttack => self.user_attack().await,
            InboundCommand::UserDodge => {
                let accepted = self.dodge.signal();
                trace!(target: "combat::session", accepted, "dodge signal");
            }
            InboundCommand::UseItem { serial } => self.use_item(serial).await,
            InboundCommand::Greeting => {
                trace!(target: "combat::session", gym_id = self.state.gym_id(), "greeting");
            }
            InboundCommand::GymAttack => {
                debug!(
                    target: "combat::session",
                    gym_id = self.state.gym_id(),
                    "ignoring client-sent gym attack"
                );
            }
            InboundCommand::Unknown(kind) => {
                trace!(target: "combat::session", %kind, "ignoring unknown message type");
            }
        }
    }

    async fn user_attack(&mut self) {
        let now = Instant::now();
        if let Some(last) = self.last_attack
            && now.duration_since(last) < self.state.config.attack_cooldown
        {
            self.state.metrics.record_rate_limited();
            trace!(target: "combat::session", "player attack rate limited");
            return;
        }
        self.last_attack = Some(now);

        let outcome = {
            let mut combat = self.state.combat.lock().await;
            let outcome = combat.resolve_user_attack(self.state.dice.as_ref());
            self.state.emit_all(&outcome.events);
            outcome
        };

        if outcome.events.is_empty() {
            return;
        }
        self.state.metrics.record_player_attack();
        self.state.metrics.record_events(&outcome.events);

        if let Some(award) = outcome.award {
            self.state.award_experience(award).await;
        }
        if let Some(result) = outcome.result {
            self.state.finish(result);
        }
    }

    async fn use_item(&mut self, serial: u32) {
        let item = match CombatItem::from_serial(serial) {
            Ok(item) => item,
            Err(error) => {
                self.state.emit(OutboundEvent::error(error.code()));
                return;
            }
        };

        // The active creature must not change between check and apply; the
        // lock is held across the records call.
        let outcome = {
            let mut combat = self.state.combat.lock().await;
            if let Err(error) = combat.check_item(item) {
                self.state.emit(OutboundEvent::error(error.code()));
                return;
            }

            match self
                .state
                .records
                .consume_item(self.state.user_id(), serial)
                .await
            {
                Ok(true) => {}
                Ok(false) => {
                    self.state.emit(OutboundEvent::error(USER_DOES_NOT_OWN_ITEM));
                    return;
                }
                Err(error) => {
                    warn!(
                        target: "combat::session",
                        gym_id = self.state.gym_id(),
                        serial,
                        %error,
                        "failed to consume item"
                    );
                    self.state.emit(OutboundEvent::error(SERVER_ERROR));
                    return;
                }
            }

            match combat.use_item(item) {
                Ok(outcome) => {
                    self.state.emit(OutboundEvent::item_used(&outcome));
                    outcome
                }
                Err(error) => {
                    self.state.emit(OutboundEvent::error(error.code()));
                    return;
                }
            }
        };

        self.state.metrics.record_item_used();
        debug!(
            target: "combat::session",
            gym_id = self.state.gym_id(),
            %item,
            effect = ?outcome.effect,
            "item used"
        );

        if matches!(outcome.effect, ItemEffect::LeveledUp { .. })
            && let Err(error) = self
                .state
                .records
                .record_item_effect(&outcome.loomie.id, outcome.effect)
                .await
        {
            warn!(
                target: "combat::session",
                creature = %outcome.loomie.id,
                %error,
                "failed to persist item effect"
            );
        }
    }
}

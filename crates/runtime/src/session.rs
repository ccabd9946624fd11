//! Combat session assembly and lifecycle.
//!
//! [`SessionBuilder`] collects the collaborators shared by every combat and
//! spawns one [`CombatSession`] per accepted challenge. A session owns three
//! worker tasks plus a supervisor that tears everything down once the
//! session is asked to close.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use loomie_core::{
    CaughtCreature, Combat, CombatCreature, CoreError, Dice, Roster, Side, TypeAdvantageCache,
};

use crate::api::{
    CloseReason, RegistryConflict, Result, RuntimeError, SessionHandle, SessionRegistry,
};
use crate::config::CombatConfig;
use crate::events::OutboundEvent;
use crate::oracle::ThreadDice;
use crate::repository::{CombatRecords, ExperiencePolicy, NoExperience};
use crate::workers::{
    GymAttacker, InactivityWatchdog, InboundReader, SessionState, dodge_channel,
};

/// Everything needed to start one combat.
#[derive(Clone, Debug)]
pub struct CombatSetup {
    pub gym_id: String,
    pub user_id: String,
    /// The player's team, in fighting order.
    pub team: Vec<CaughtCreature>,
    /// The gym's protectors, in fighting order.
    pub protectors: Vec<CaughtCreature>,
}

/// Builder for combat sessions. Cloneable; spawn as many sessions as needed.
#[derive(Clone)]
pub struct SessionBuilder {
    config: CombatConfig,
    registry: SessionRegistry,
    types: Option<Arc<TypeAdvantageCache>>,
    records: Option<Arc<dyn CombatRecords>>,
    experience: Arc<dyn ExperiencePolicy>,
    dice: Arc<dyn Dice>,
}

impl SessionBuilder {
    pub fn new(registry: SessionRegistry) -> Self {
        Self {
            config: CombatConfig::default(),
            registry,
            types: None,
            records: None,
            experience: Arc::new(NoExperience),
            dice: Arc::new(ThreadDice),
        }
    }

    /// Override session configuration
    pub fn config(mut self, config: CombatConfig) -> Self {
        self.config = config.normalized();
        self
    }

    /// Set the required type-advantage cache
    pub fn types(mut self, types: Arc<TypeAdvantageCache>) -> Self {
        self.types = Some(types);
        self
    }

    /// Set the required persistence collaborator
    pub fn records(mut self, records: Arc<dyn CombatRecords>) -> Self {
        self.records = Some(records);
        self
    }

    /// Set the experience policy (default: awards nothing)
    pub fn experience(mut self, experience: Arc<dyn ExperiencePolicy>) -> Self {
        self.experience = experience;
        self
    }

    /// Set the dice used for gym dodge rolls
    pub fn dice(mut self, dice: Arc<dyn Dice>) -> Self {
        self.dice = dice;
        self
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Validates the rosters, registers the gym and starts the session.
    ///
    /// Fails with [`RuntimeError::CombatInProgress`] if the gym already has
    /// a session and with [`RuntimeError::UserInCombat`] if the user is
    /// fighting elsewhere; nothing is spawned in either case.
    pub fn spawn(&self, setup: CombatSetup) -> Result<CombatSession> {
        let types = self
            .types
            .clone()
            .ok_or(RuntimeError::MissingComponent("a type chart"))?;
        let records = self
            .records
            .clone()
            .ok_or(RuntimeError::MissingComponent("combat records"))?;

        if let Some(busy) = setup.team.iter().find(|creature| creature.is_busy) {
            return Err(RuntimeError::CreatureBusy(busy.id.clone()));
        }

        let player = Roster::new(Side::Player, to_combat(&setup.team)?)?;
        let gym = Roster::new(Side::Gym, to_combat(&setup.protectors)?)?;
        let combat = Combat::new(player, gym, types)
            .with_gym_dodge_percent(self.config.gym_dodge_percent);

        let start = OutboundEvent::combat_start(&combat.snapshot());

        let handle = SessionHandle::new(&setup.gym_id, &setup.user_id);
        match self.registry.try_register(&setup.gym_id, handle.clone()) {
            Ok(()) => {}
            Err(RegistryConflict::GymInCombat) => {
                return Err(RuntimeError::CombatInProgress {
                    gym_id: setup.gym_id,
                });
            }
            Err(RegistryConflict::UserInCombat) => {
                return Err(RuntimeError::UserInCombat {
                    user_id: setup.user_id,
                });
            }
        }

        let (inbound_tx, inbound_rx) = mpsc::channel(self.config.inbound_buffer);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (dodge_signal, dodge_window) = dodge_channel();

        let metrics = Arc::clone(self.registry.metrics());
        let state = Arc::new(SessionState::new(
            handle.clone(),
            combat,
            self.config.clone(),
            Arc::clone(&self.dice),
            Arc::clone(&records),
            Arc::clone(&self.experience),
            Arc::clone(&metrics),
            outbound_tx,
        ));

        state.emit(start);
        metrics.record_session_started();
        info!(
            target: "combat::session",
            gym_id = %setup.gym_id,
            user_id = %setup.user_id,
            team = setup.team.len(),
            protectors = setup.protectors.len(),
            "combat started"
        );

        let workers = vec![
            tokio::spawn(InboundReader::new(Arc::clone(&state), inbound_rx, dodge_signal).run()),
            tokio::spawn(GymAttacker::new(Arc::clone(&state), dodge_window).run()),
            tokio::spawn(InactivityWatchdog::new(state).run()),
        ];

        let supervisor = tokio::spawn(supervise(
            handle.clone(),
            workers,
            self.registry.clone(),
            records,
        ));

        Ok(CombatSession {
            handle,
            inbound: inbound_tx,
            outbound: outbound_rx,
            supervisor,
        })
    }
}

fn to_combat(creatures: &[CaughtCreature]) -> std::result::Result<Vec<CombatCreature>, CoreError> {
    creatures.iter().map(CaughtCreature::to_combat).collect()
}

/// Waits for the close signal, stops the workers and releases the gym.
async fn supervise(
    handle: SessionHandle,
    workers: Vec<JoinHandle<()>>,
    registry: SessionRegistry,
    records: Arc<dyn CombatRecords>,
) -> CloseReason {
    let reason = handle.closed().await;

    for worker in workers {
        if let Err(error) = worker.await {
            error!(target: "combat::session", %error, "session worker failed");
        }
    }

    registry.unregister(handle.gym_id());
    registry.metrics().record_session_ended(reason);

    let gym_id = handle.gym_id().to_owned();
    let user_id = handle.user_id().to_owned();
    tokio::spawn(async move {
        if let Err(error) = records.clear_combat(&gym_id, &user_id).await {
            warn!(target: "combat::session", %gym_id, %error, "failed to clear combat record");
        }
    });

    info!(
        target: "combat::session",
        gym_id = handle.gym_id(),
        user_id = handle.user_id(),
        %reason,
        "session closed"
    );
    reason
}

/// A running combat.
///
/// Frames pushed through [`CombatSession::send`] reach the read loop;
/// events come back through [`CombatSession::recv`]. The outbound stream
/// ends once the session has torn down.
pub struct CombatSession {
    handle: SessionHandle,
    inbound: mpsc::Sender<String>,
    outbound: mpsc::UnboundedReceiver<OutboundEvent>,
    supervisor: JoinHandle<CloseReason>,
}

impl CombatSession {
    pub fn builder(registry: SessionRegistry) -> SessionBuilder {
        SessionBuilder::new(registry)
    }

    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Delivers one raw inbound frame. Returns `false` once the read loop
    /// has stopped.
    pub async fn send(&self, frame: impl Into<String>) -> bool {
        self.inbound.send(frame.into()).await.is_ok()
    }

    /// Next outbound event, or `None` after teardown.
    pub async fn recv(&mut self) -> Option<OutboundEvent> {
        self.outbound.recv().await
    }

    /// Splits the session for a transport that drives both directions.
    pub fn into_parts(self) -> SessionParts {
        debug!(target: "combat::session", gym_id = self.handle.gym_id(), "session split for transport");
        SessionParts {
            handle: self.handle,
            inbound: self.inbound,
            outbound: self.outbound,
            task: SessionTask(self.supervisor),
        }
    }

    /// Closes the inbound side and waits for teardown.
    pub async fn join(self) -> Result<CloseReason> {
        drop(self.inbound);
        SessionTask(self.supervisor).join().await
    }
}

/// The pieces of a [`CombatSession`], for transports.
pub struct SessionParts {
    pub handle: SessionHandle,
    /// Dropping every sender ends the session with
    /// [`CloseReason::TransportClosed`].
    pub inbound: mpsc::Sender<String>,
    pub outbound: mpsc::UnboundedReceiver<OutboundEvent>,
    pub task: SessionTask,
}

/// Supervisor task of a session; resolves with the close reason.
pub struct SessionTask(JoinHandle<CloseReason>);

impl SessionTask {
    pub async fn join(self) -> Result<CloseReason> {
        self.0.await.map_err(RuntimeError::WorkerJoin)
    }
}

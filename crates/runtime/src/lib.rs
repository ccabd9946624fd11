//! Async runtime for real-time gym combats.
//!
//! This crate drives the pure [`loomie_core::Combat`] state machine with
//! tokio tasks: it owns the clocks (dodge windows, attack cooldowns, gym
//! attack pacing, inactivity), the wire protocol, and the registry that
//! keeps one combat per gym. Transports embed a [`SessionBuilder`] and
//! exchange raw frames with each [`CombatSession`].
//!
//! Modules are organized by responsibility:
//! - [`session`] hosts the builder and the session lifecycle
//! - [`api`] exposes the handle, registry and error types
//! - [`events`] defines the inbound/outbound wire envelopes
//! - [`repository`] declares the persistence collaborators
//! - [`oracle`] provides the process-level dice and type chart
//! - `workers` keeps the per-session tasks internal to the crate
pub mod api;
pub mod config;
pub mod events;
pub mod oracle;
pub mod repository;
pub mod session;

mod workers;

pub use api::{
    CloseReason, RegistryConflict, Result, RuntimeError, SessionHandle, SessionRegistry,
};
pub use config::CombatConfig;
pub use events::{
    InboundCommand, InboundKind, InboundMessage, OutboundEvent, OutboundKind, ProtocolError,
};
pub use oracle::{ThreadDice, type_cache_from_json};
pub use repository::{
    CombatRecords, ExperiencePolicy, InMemoryCombatRecords, NoExperience, RecordsError,
};
pub use session::{CombatSession, CombatSetup, SessionBuilder, SessionParts, SessionTask};
pub use workers::{CombatMetrics, MetricsSnapshot};

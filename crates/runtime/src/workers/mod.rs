//! Tasks that make up a running combat session.
//!
//! Each session runs three cooperative tasks over one shared
//! [`state::SessionState`]: the inbound reader, the gym attacker and the
//! inactivity watchdog. All of them stop on the session's shutdown signal.

mod dodge;
mod gym;
mod metrics;
mod reader;
mod state;
mod watchdog;

pub use metrics::{CombatMetrics, MetricsSnapshot};

pub(crate) use dodge::dodge_channel;
pub(crate) use gym::GymAttacker;
pub(crate) use reader::InboundReader;
pub(crate) use state::SessionState;
pub(crate) use watchdog::InactivityWatchdog;

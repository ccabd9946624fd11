//! Combat server: composition root and TCP transport.
//!
//! Wires the combat runtime to a fixture-backed world and exposes sessions
//! over line-delimited JSON on TCP.
pub mod config;
pub mod fixtures;
pub mod transport;

pub use config::ServerConfig;
pub use fixtures::{FixtureError, JoinRejection, World};
pub use transport::{JOIN, Transport, TransportError};

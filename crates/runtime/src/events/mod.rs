//! Wire protocol between a combat session and its transport.
//!
//! Both directions share one JSON envelope, `{type, message, payload}`.
//! [`InboundMessage`] parses client frames into an [`InboundCommand`];
//! [`OutboundEvent`] is what the session pushes back.

mod inbound;
mod outbound;

pub use inbound::{InboundCommand, InboundKind, InboundMessage, ProtocolError};
pub use outbound::{OutboundEvent, OutboundKind};

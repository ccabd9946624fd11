//! Client frames: the envelope, its recognised types and their payloads.
//!
//! Unknown types parse successfully and surface as
//! [`InboundCommand::Unknown`]; only malformed JSON or a bad payload is a
//! [`ProtocolError`].
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Malformed inbound frames. The read loop logs and drops these.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("frame is not a valid message envelope")]
    Malformed(#[from] serde_json::Error),

    #[error("{kind} requires a payload")]
    MissingPayload { kind: InboundKind },

    #[error("{kind} payload is invalid")]
    InvalidPayload {
        kind: InboundKind,
        #[source]
        source: serde_json::Error,
    },
}

/// Message types a client may send.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString, strum::AsRefStr,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum InboundKind {
    /// Internal trigger; ignored when a client sends it.
    GymAttack,
    UserAttack,
    UserDodge,
    UserUseItem,
    Greeting,
}

/// The inbound envelope as it arrives on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

/// A parsed inbound frame, ready for the session to act on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InboundCommand {
    UserAttack,
    UserDodge,
    UseItem { serial: u32 },
    Greeting,
    /// A client-sent `GYM_ATTACK`; gym attacks are only ever scheduled
    /// by the session itself.
    GymAttack,
    /// Any type this session does not know. Ignored.
    Unknown(String),
}

#[derive(Deserialize)]
struct UseItemPayload {
    item_serial: u32,
}

impl InboundMessage {
    pub fn new(kind: InboundKind) -> Self {
        Self {
            kind: kind.to_string(),
            message: None,
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn parse(frame: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(frame)?)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn command(self) -> Result<InboundCommand, ProtocolError> {
        let Ok(kind) = InboundKind::from_str(&self.kind) else {
            return Ok(InboundCommand::Unknown(self.kind));
        };

        let command = match kind {
            InboundKind::GymAttack => InboundCommand::GymAttack,
            InboundKind::UserAttack => InboundCommand::UserAttack,
            InboundKind::UserDodge => InboundCommand::UserDodge,
            InboundKind::Greeting => InboundCommand::Greeting,
            InboundKind::UserUseItem => {
                let payload = self.payload.ok_or(ProtocolError::MissingPayload { kind })?;
                let UseItemPayload { item_serial } = serde_json::from_value(payload)
                    .map_err(|source| ProtocolError::InvalidPayload { kind, source })?;
                InboundCommand::UseItem {
                    serial: item_serial,
                }
            }
        };

        Ok(command)
    }
}

impl InboundCommand {
    /// Parses one raw frame.
    pub fn from_frame(frame: &str) -> Result<Self, ProtocolError> {
        InboundMessage::parse(frame)?.command()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_known_types() {
        assert_eq!(
            InboundCommand::from_frame(r#"{"type":"USER_ATTACK"}"#).unwrap(),
            InboundCommand::UserAttack
        );
        assert_eq!(
            InboundCommand::from_frame(r#"{"type":"USER_DODGE","message":"now"}"#).unwrap(),
            InboundCommand::UserDodge
        );
        assert_eq!(
            InboundCommand::from_frame(r#"{"type":"GREETING"}"#).unwrap(),
            InboundCommand::Greeting
        );
    }

    #[test]
    fn unknown_types_are_not_errors() {
        assert_eq!(
            InboundCommand::from_frame(r#"{"type":"DANCE"}"#).unwrap(),
            InboundCommand::Unknown("DANCE".into())
        );
    }

    #[test]
    fn use_item_reads_serial_from_payload() {
        let frame = InboundMessage::new(InboundKind::UserUseItem)
            .with_payload(json!({ "item_serial": 4 }))
            .to_json()
            .unwrap();
        assert_eq!(
            InboundCommand::from_frame(&frame).unwrap(),
            InboundCommand::UseItem { serial: 4 }
        );

        let missing = InboundCommand::from_frame(r#"{"type":"USER_USE_ITEM"}"#).unwrap_err();
        assert!(matches!(missing, ProtocolError::MissingPayload { .. }));

        let invalid =
            InboundCommand::from_frame(r#"{"type":"USER_USE_ITEM","payload":{"item_serial":"x"}}"#)
                .unwrap_err();
        assert!(matches!(invalid, ProtocolError::InvalidPayload { .. }));
    }

    #[test]
    fn malformed_frames_are_rejected() {
        assert!(matches!(
            InboundCommand::from_frame("not json"),
            Err(ProtocolError::Malformed(_))
        ));
        assert!(matches!(
            InboundCommand::from_frame(r#"{"message":"no type"}"#),
            Err(ProtocolError::Malformed(_))
        ));
    }
}

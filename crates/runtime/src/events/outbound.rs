//! Session frames sent to the client, with the payload shape of each kind.
use serde::Serialize;
use serde_json::{Value, json};

use loomie_core::{CombatEvent, CombatSnapshot, ItemOutcome};

/// Message types the session sends to its client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, strum::Display, strum::AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboundKind {
    CombatStart,
    GymAttackCandidate,
    GymAttackDodged,
    UserAttackDodged,
    UpdateUserLoomieHp,
    UserLoomieWeakened,
    UpdatePlayerLoomie,
    UserHasLost,
    UpdateGymLoomieHp,
    GymLoomieWeakened,
    UpdateGymLoomie,
    UserHasWon,
    ItemUsed,
    Error,
}

/// One outbound frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OutboundEvent {
    #[serde(rename = "type")]
    pub kind: OutboundKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl OutboundEvent {
    pub fn new(kind: OutboundKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            payload: None,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn combat_start(snapshot: &CombatSnapshot) -> Self {
        Self::new(OutboundKind::CombatStart, "The combat has started").with_payload(json!({
            "player_loomie": snapshot.player_loomie,
            "alive_user_loomies": snapshot.alive_player_loomies,
            "gym_loomie": snapshot.gym_loomie,
            "alive_gym_loomies": snapshot.alive_gym_loomies,
        }))
    }

    pub fn item_used(outcome: &ItemOutcome) -> Self {
        Self::new(OutboundKind::ItemUsed, "The item was used").with_payload(json!({
            "loomie": outcome.loomie,
        }))
    }

    /// An `ERROR` frame whose message is the stable reason code.
    pub fn error(code: &str) -> Self {
        Self::new(OutboundKind::Error, code)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<CombatEvent> for OutboundEvent {
    fn from(event: CombatEvent) -> Self {
        match event {
            CombatEvent::GymAttackCandidate => Self::new(
                OutboundKind::GymAttackCandidate,
                "The gym loomie is about to attack",
            ),
            CombatEvent::GymAttackDodged => {
                Self::new(OutboundKind::GymAttackDodged, "You dodged the attack")
            }
            CombatEvent::UserAttackDodged => Self::new(
                OutboundKind::UserAttackDodged,
                "The gym loomie dodged your attack",
            ),
            CombatEvent::UserLoomieHpUpdated { hp } => Self::new(
                OutboundKind::UpdateUserLoomieHp,
                "Your loomie was attacked",
            )
            .with_payload(json!({ "hp": hp })),
            CombatEvent::UserLoomieWeakened { loomie_id } => Self::new(
                OutboundKind::UserLoomieWeakened,
                "Your loomie was weakened",
            )
            .with_payload(json!({ "loomie_id": loomie_id })),
            CombatEvent::PlayerLoomieUpdated { loomie, alive } => Self::new(
                OutboundKind::UpdatePlayerLoomie,
                "Your next loomie entered the combat",
            )
            .with_payload(json!({ "loomie": loomie, "alive_loomies": alive })),
            CombatEvent::UserHasLost => {
                Self::new(OutboundKind::UserHasLost, "All your loomies were weakened")
            }
            CombatEvent::GymLoomieHpUpdated { hp } => Self::new(
                OutboundKind::UpdateGymLoomieHp,
                "The gym loomie was attacked",
            )
            .with_payload(json!({ "hp": hp })),
            CombatEvent::GymLoomieWeakened { loomie_id } => Self::new(
                OutboundKind::GymLoomieWeakened,
                "The gym loomie was weakened",
            )
            .with_payload(json!({ "loomie_id": loomie_id })),
            CombatEvent::GymLoomieUpdated { loomie, alive } => Self::new(
                OutboundKind::UpdateGymLoomie,
                "The next gym loomie entered the combat",
            )
            .with_payload(json!({ "loomie": loomie, "alive_loomies": alive })),
            CombatEvent::UserHasWon => {
                Self::new(OutboundKind::UserHasWon, "All the gym loomies were weakened")
            }
        }
    }
}

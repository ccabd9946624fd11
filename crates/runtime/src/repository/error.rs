//! Error types raised by combat record implementations.

use thiserror::Error;

use loomie_core::CreatureId;

#[derive(Debug, Error)]
pub enum RecordsError {
    #[error("combat records lock was poisoned")]
    LockPoisoned,

    #[error("unknown user {0}")]
    UnknownUser(String),

    #[error("unknown creature {0}")]
    UnknownCreature(CreatureId),

    #[error("records backend unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, RecordsError>;

//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from session assembly and worker coordination so the
//! transport layer can report them consistently.
use thiserror::Error;

use loomie_core::{CoreError, CreatureId};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("gym {gym_id} is already in combat")]
    CombatInProgress { gym_id: String },

    #[error("user {user_id} is already in combat")]
    UserInCombat { user_id: String },

    #[error("creature {0} is already committed to another combat")]
    CreatureBusy(CreatureId),

    #[error("session requires {0} to be configured before building")]
    MissingComponent(&'static str),

    #[error("invalid combat setup")]
    Setup(#[from] CoreError),

    #[error("session task join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}

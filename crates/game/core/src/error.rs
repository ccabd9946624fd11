//! Error types raised by the combat core.
//!
//! Item failures live in [`crate::items::ItemError`] next to the effects they
//! validate; this module covers construction-time failures.

use thiserror::Error;

use crate::state::{CreatureId, Side};

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("{side} roster has no creatures")]
    EmptyRoster { side: Side },

    #[error("creature {0} has level 0 (levels start at 1)")]
    InvalidLevel(CreatureId),

    #[error("creature {0} appears more than once in the {1} roster")]
    DuplicateCreature(CreatureId, Side),
}

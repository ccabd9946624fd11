//! Collaborators that persist what a combat changes.
//!
//! A session only decides *when* something must be written (experience on a
//! weakened defender, item consumption, clearing the combat record); the
//! storage behind it lives outside this crate and is reached through
//! [`CombatRecords`].

mod error;
mod memory;
mod traits;

pub use error::{RecordsError, Result};
pub use memory::InMemoryCombatRecords;
pub use traits::{CombatRecords, ExperiencePolicy, NoExperience};

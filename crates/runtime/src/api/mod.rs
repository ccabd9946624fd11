//! Public runtime API surface.
//!
//! Gathers the types transports and composition roots interact with, so the
//! worker modules can stay focused on the combat protocol itself.

pub mod errors;
pub mod handle;
pub mod registry;

pub use errors::{Result, RuntimeError};
pub use handle::{CloseReason, SessionHandle};
pub use registry::{RegistryConflict, SessionRegistry};

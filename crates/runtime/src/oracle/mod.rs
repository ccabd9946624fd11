//! Runtime implementations of the read-only capabilities the core consumes.
//!
//! The core only sees the [`loomie_core::Dice`] and [`loomie_core::TypeChart`]
//! traits; this module provides the process-level sources for them.
mod dice;

pub use dice::ThreadDice;
pub use loomie_core::{StaticTypeChart, TypeAdvantageCache, TypeChart};

use std::sync::Arc;

/// Builds the process-wide advantage cache from a JSON type chart of the
/// form `{"Water": ["Fire", ...], ...}`.
pub fn type_cache_from_json(json: &str) -> serde_json::Result<Arc<TypeAdvantageCache>> {
    let chart: StaticTypeChart = serde_json::from_str(json)?;
    Ok(Arc::new(TypeAdvantageCache::new(Arc::new(chart))))
}

//! Elemental type relationships.
//!
//! A [`TypeChart`] is the external rules source ("which types does X beat").
//! [`TypeAdvantageCache`] memoizes its answers per attacking type so each
//! type is looked up at most once per process, then serves pure lookups.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Rules source for type advantages.
///
/// Unknown types must yield an empty list; the cache treats that as
/// "no advantage" rather than a failure.
pub trait TypeChart: Send + Sync {
    /// Types that `attacking_type` is strong against.
    fn strong_against(&self, attacking_type: &str) -> Vec<String>;
}

/// In-memory type chart keyed by attacking type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StaticTypeChart {
    strong_against: HashMap<String, Vec<String>>,
}

impl StaticTypeChart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the strong-against list for `attacking_type`.
    pub fn with_type<I, S>(mut self, attacking_type: impl Into<String>, beats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.strong_against.insert(
            attacking_type.into(),
            beats.into_iter().map(Into::into).collect(),
        );
        self
    }

    pub fn len(&self) -> usize {
        self.strong_against.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strong_against.is_empty()
    }
}

impl FromIterator<(String, Vec<String>)> for StaticTypeChart {
    fn from_iter<T: IntoIterator<Item = (String, Vec<String>)>>(iter: T) -> Self {
        Self {
            strong_against: iter.into_iter().collect(),
        }
    }
}

impl TypeChart for StaticTypeChart {
    fn strong_against(&self, attacking_type: &str) -> Vec<String> {
        self.strong_against
            .get(attacking_type)
            .cloned()
            .unwrap_or_default()
    }
}

/// Lazily populated, process-wide memo of [`TypeChart`] answers.
///
/// Readers share a read lock; a miss takes the write lock once to insert the
/// chart's answer. Poisoning is ignored because entries are immutable once
/// written.
pub struct TypeAdvantageCache {
    chart: Arc<dyn TypeChart>,
    strong_against: RwLock<HashMap<String, Arc<[String]>>>,
}

impl TypeAdvantageCache {
    pub fn new(chart: Arc<dyn TypeChart>) -> Self {
        Self {
            chart,
            strong_against: RwLock::new(HashMap::new()),
        }
    }

    /// Returns true iff `attacking_type` beats any of `defending_types`.
    pub fn is_strong_against(&self, attacking_type: &str, defending_types: &[String]) -> bool {
        let beats = self.lookup(attacking_type);
        beats
            .iter()
            .any(|strong| defending_types.iter().any(|defending| defending == strong))
    }

    /// Returns true if any of the attacker's types beats the defender.
    pub fn has_advantage(&self, attacker_types: &[String], defender_types: &[String]) -> bool {
        attacker_types
            .iter()
            .any(|attacking| self.is_strong_against(attacking, defender_types))
    }

    /// Number of attacking types memoized so far.
    pub fn cached_types(&self) -> usize {
        self.strong_against
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn lookup(&self, attacking_type: &str) -> Arc<[String]> {
        if let Some(hit) = self
            .strong_against
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(attacking_type)
        {
            return Arc::clone(hit);
        }

        let fetched: Arc<[String]> = self.chart.strong_against(attacking_type).into();
        let mut cache = self
            .strong_against
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            cache
                .entry(attacking_type.to_owned())
                .or_insert(fetched),
        )
    }
}

impl std::fmt::Debug for TypeAdvantageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeAdvantageCache")
            .field("cached_types", &self.cached_types())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingChart {
        inner: StaticTypeChart,
        calls: AtomicUsize,
    }

    impl TypeChart for CountingChart {
        fn strong_against(&self, attacking_type: &str) -> Vec<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.strong_against(attacking_type)
        }
    }

    fn types(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn chart_is_consulted_once_per_attacking_type() {
        let chart = Arc::new(CountingChart {
            inner: StaticTypeChart::new().with_type("Fire", ["Plant", "Ice"]),
            calls: AtomicUsize::new(0),
        });
        let cache = TypeAdvantageCache::new(chart.clone());

        assert!(cache.is_strong_against("Fire", &types(&["Water", "Plant"])));
        assert!(!cache.is_strong_against("Fire", &types(&["Water"])));
        assert!(cache.is_strong_against("Fire", &types(&["Ice"])));

        assert_eq!(chart.calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.cached_types(), 1);
    }

    #[test]
    fn unknown_type_has_no_advantage() {
        let cache = TypeAdvantageCache::new(Arc::new(StaticTypeChart::new()));

        assert!(!cache.is_strong_against("Shadow", &types(&["Fire"])));
        assert!(!cache.has_advantage(&types(&["Shadow"]), &types(&["Fire"])));
        // The miss is memoized as an empty set.
        assert_eq!(cache.cached_types(), 1);
    }

    #[test]
    fn any_attacker_type_grants_advantage() {
        let chart = StaticTypeChart::new()
            .with_type("Water", ["Fire"])
            .with_type("Rock", ["Flying"]);
        let cache = TypeAdvantageCache::new(Arc::new(chart));

        assert!(cache.has_advantage(&types(&["Rock", "Water"]), &types(&["Fire"])));
        assert!(!cache.has_advantage(&types(&["Rock"]), &types(&["Fire"])));
    }
}

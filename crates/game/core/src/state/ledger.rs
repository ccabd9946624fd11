use std::collections::HashMap;

use super::CreatureId;

/// Records which attacking creatures fought each defending creature.
///
/// Membership is idempotent: recording the same pair twice keeps a single
/// entry. Attackers are kept in first-fought order so experience awards are
/// issued in a stable order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FoughtByLedger {
    entries: HashMap<CreatureId, Vec<CreatureId>>,
}

impl FoughtByLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `attacker` fought `defender`. Returns false if the pair
    /// was already recorded.
    pub fn record(&mut self, defender: &CreatureId, attacker: &CreatureId) -> bool {
        let attackers = self.entries.entry(defender.clone()).or_default();
        if attackers.contains(attacker) {
            return false;
        }
        attackers.push(attacker.clone());
        true
    }

    /// Attackers recorded against `defender`.
    pub fn fought_by(&self, defender: &CreatureId) -> &[CreatureId] {
        self.entries
            .get(defender)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Removes and returns the entry for `defender`, so its attackers are
    /// rewarded at most once.
    pub fn take(&mut self, defender: &CreatureId) -> Vec<CreatureId> {
        self.entries.remove(defender).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_same_pair_twice_keeps_one_membership() {
        let mut ledger = FoughtByLedger::new();
        let gym = CreatureId::new("gym-1");
        let mine = CreatureId::new("mine-1");

        assert!(ledger.record(&gym, &mine));
        assert!(!ledger.record(&gym, &mine));
        assert_eq!(ledger.fought_by(&gym), &[mine]);
    }

    #[test]
    fn take_drains_the_entry() {
        let mut ledger = FoughtByLedger::new();
        let gym = CreatureId::new("gym-1");
        ledger.record(&gym, &CreatureId::new("a"));
        ledger.record(&gym, &CreatureId::new("b"));

        let attackers = ledger.take(&gym);
        assert_eq!(attackers, vec![CreatureId::new("a"), CreatureId::new("b")]);
        assert!(ledger.take(&gym).is_empty());
        assert!(ledger.fought_by(&gym).is_empty());
    }
}

use std::collections::{HashSet, VecDeque};

use super::{CombatCreature, Side};
use crate::error::{CoreError, Result};

/// Ordered list of one side's combatants.
///
/// The head is always the active creature. Removing the head promotes the
/// next member; the roster is empty only once every member is weakened,
/// which ends the combat for that side.
#[derive(Clone, Debug, PartialEq)]
pub struct Roster {
    side: Side,
    members: VecDeque<CombatCreature>,
}

impl Roster {
    /// Builds a roster, rejecting empty teams and duplicate creatures.
    pub fn new(side: Side, members: impl IntoIterator<Item = CombatCreature>) -> Result<Self> {
        let members: VecDeque<CombatCreature> = members.into_iter().collect();
        if members.is_empty() {
            return Err(CoreError::EmptyRoster { side });
        }

        let mut seen = HashSet::with_capacity(members.len());
        for member in &members {
            if !seen.insert(&member.id) {
                return Err(CoreError::DuplicateCreature(member.id.clone(), side));
            }
        }

        Ok(Self { side, members })
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// The creature currently fighting, if any remain.
    pub fn active(&self) -> Option<&CombatCreature> {
        self.members.front()
    }

    pub fn active_mut(&mut self) -> Option<&mut CombatCreature> {
        self.members.front_mut()
    }

    /// Removes the active creature and promotes the next one.
    pub fn remove_active(&mut self) -> Option<CombatCreature> {
        self.members.pop_front()
    }

    /// Number of creatures still able to fight.
    pub fn alive(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::creature;

    #[test]
    fn empty_roster_is_rejected() {
        let err = Roster::new(Side::Gym, Vec::new()).unwrap_err();
        assert_eq!(err, CoreError::EmptyRoster { side: Side::Gym });
    }

    #[test]
    fn duplicate_members_are_rejected() {
        let err = Roster::new(
            Side::Player,
            [creature("a", 10, 1, 1), creature("a", 10, 1, 1)],
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::DuplicateCreature(_, Side::Player)));
    }

    #[test]
    fn removing_head_promotes_next_member() {
        let mut roster = Roster::new(
            Side::Player,
            [creature("a", 10, 1, 1), creature("b", 10, 1, 1)],
        )
        .unwrap();

        assert_eq!(roster.active().unwrap().id.as_str(), "a");
        assert_eq!(roster.remove_active().unwrap().id.as_str(), "a");
        assert_eq!(roster.active().unwrap().id.as_str(), "b");
        assert_eq!(roster.alive(), 1);
    }

    #[test]
    fn removing_last_member_leaves_empty_roster() {
        let mut roster = Roster::new(Side::Gym, [creature("a", 10, 1, 1)]).unwrap();

        assert!(roster.remove_active().is_some());
        assert!(roster.is_empty());
        assert!(roster.active().is_none());
        assert!(roster.remove_active().is_none());
    }
}

//! Shared fixtures for unit tests.

use crate::state::{CaughtCreature, CombatCreature, CreatureId};

pub(crate) fn caught(id: &str, hp: u32, attack: u32, defense: u32, level: u32) -> CaughtCreature {
    CaughtCreature {
        id: CreatureId::new(id),
        serial: 1,
        name: id.to_owned(),
        types: vec!["Normal".to_owned()],
        rarity: "Common".to_owned(),
        hp,
        attack,
        defense,
        level,
        experience: 0.0,
        is_busy: false,
    }
}

pub(crate) fn creature(id: &str, hp: u32, attack: u32, defense: u32) -> CombatCreature {
    caught(id, hp, attack, defense, 1)
        .to_combat()
        .expect("level 1 fixture is valid")
}

pub(crate) fn typed(mut creature: CombatCreature, types: &[&str]) -> CombatCreature {
    creature.types = types.iter().map(|t| t.to_string()).collect();
    creature
}

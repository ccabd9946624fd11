#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use combat_runtime::{
    CombatConfig, CombatRecords, CombatSession, CombatSetup, InMemoryCombatRecords, OutboundEvent,
    SessionBuilder, SessionRegistry,
};
use loomie_core::{
    CaughtCreature, CreatureId, ScriptedDice, StaticTypeChart, TypeAdvantageCache,
};
use tokio::time;

pub const GYM: &str = "gym-1";
pub const USER: &str = "alice";

pub fn caught(id: &str, hp: u32, attack: u32, defense: u32) -> CaughtCreature {
    CaughtCreature {
        id: CreatureId::new(id),
        serial: 1,
        name: id.to_owned(),
        types: vec!["Normal".to_owned()],
        rarity: "Common".to_owned(),
        hp,
        attack,
        defense,
        level: 1,
        experience: 0.0,
        is_busy: false,
    }
}

/// Gym attacks far in the future so player-side tests are not interleaved.
pub fn quiet_gym() -> CombatConfig {
    CombatConfig {
        gym_attack_min: Duration::from_secs(1_000),
        gym_attack_max: Duration::from_secs(1_000),
        inactivity_limit: Duration::from_secs(10_000),
        ..CombatConfig::default()
    }
}

/// Gym attacks every 2 seconds exactly.
pub fn steady_gym() -> CombatConfig {
    CombatConfig {
        gym_attack_min: Duration::from_secs(2),
        gym_attack_max: Duration::from_secs(2),
        ..CombatConfig::default()
    }
}

pub fn types() -> Arc<TypeAdvantageCache> {
    Arc::new(TypeAdvantageCache::new(Arc::new(StaticTypeChart::new())))
}

pub struct Harness {
    pub registry: SessionRegistry,
    pub records: Arc<InMemoryCombatRecords>,
    pub builder: SessionBuilder,
}

impl Harness {
    pub fn new(config: CombatConfig, records: InMemoryCombatRecords, roll: u32) -> Self {
        let registry = SessionRegistry::new();
        let records = Arc::new(records);
        let builder = SessionBuilder::new(registry.clone())
            .config(config)
            .types(types())
            .records(Arc::clone(&records) as Arc<dyn CombatRecords>)
            .dice(Arc::new(ScriptedDice::always(roll)));
        Self {
            registry,
            records,
            builder,
        }
    }

    pub fn spawn(&self, team: Vec<CaughtCreature>, protectors: Vec<CaughtCreature>) -> CombatSession {
        self.builder
            .spawn(CombatSetup {
                gym_id: GYM.to_owned(),
                user_id: USER.to_owned(),
                team,
                protectors,
            })
            .expect("session should start")
    }
}

pub async fn next(session: &mut CombatSession) -> OutboundEvent {
    time::timeout(Duration::from_secs(60), session.recv())
        .await
        .expect("event before timeout")
        .expect("session still open")
}

/// True if nothing arrives within `within`.
pub async fn silent(session: &mut CombatSession, within: Duration) -> bool {
    time::timeout(within, session.recv()).await.is_err()
}

pub fn frame(kind: &str) -> String {
    format!(r#"{{"type":"{kind}"}}"#)
}

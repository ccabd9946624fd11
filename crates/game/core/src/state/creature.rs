use std::fmt;

use crate::error::{CoreError, Result};

/// Identifier of a creature's permanent record.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct CreatureId(pub String);

impl CreatureId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CreatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CreatureId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

/// Level-derived stat multiplier, `1 + (level - 1) / 8`.
pub fn experience_factor(level: u32) -> f64 {
    1.0 + f64::from(level.max(1) - 1) / 8.0
}

/// Scales a base stat by the level-derived experience factor
/// `1 + (level - 1) / 8`, rounding down.
///
/// Computed as `base * (level + 7) / 8` in integer arithmetic, which is the
/// same value without float drift.
pub fn scale_stat(base: u32, level: u32) -> u32 {
    let level = u64::from(level.max(1));
    ((u64::from(base) * (level + 7)) / 8).min(u64::from(u32::MAX)) as u32
}

/// A creature as stored in its owner's collection or a gym's garrison.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CaughtCreature {
    #[cfg_attr(feature = "serde", serde(rename = "_id"))]
    pub id: CreatureId,
    pub serial: u32,
    pub name: String,
    pub types: Vec<String>,
    pub rarity: String,
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub level: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub experience: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_busy: bool,
}

impl CaughtCreature {
    /// Converts the permanent record into its combat form, applying the
    /// level boost once.
    pub fn to_combat(&self) -> Result<CombatCreature> {
        if self.level == 0 {
            return Err(CoreError::InvalidLevel(self.id.clone()));
        }

        let boosted_hp = scale_stat(self.hp, self.level);

        Ok(CombatCreature {
            id: self.id.clone(),
            serial: self.serial,
            name: self.name.clone(),
            types: self.types.clone(),
            rarity: self.rarity.clone(),
            base_hp: self.hp,
            base_attack: self.attack,
            base_defense: self.defense,
            max_hp: boosted_hp,
            boosted_hp,
            boosted_attack: scale_stat(self.attack, self.level),
            boosted_defense: scale_stat(self.defense, self.level),
            level: self.level,
            experience: self.experience,
            is_busy: self.is_busy,
        })
    }
}

/// One creature instance taking part in a combat.
///
/// Base stats never change; boosted stats are the level-scaled values the
/// combat math works with. `boosted_hp` stays within `0..=max_hp`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatCreature {
    #[cfg_attr(feature = "serde", serde(rename = "_id"))]
    pub id: CreatureId,
    pub serial: u32,
    pub name: String,
    pub types: Vec<String>,
    pub rarity: String,
    #[cfg_attr(feature = "serde", serde(rename = "hp"))]
    pub base_hp: u32,
    #[cfg_attr(feature = "serde", serde(rename = "attack"))]
    pub base_attack: u32,
    #[cfg_attr(feature = "serde", serde(rename = "defense"))]
    pub base_defense: u32,
    pub max_hp: u32,
    pub boosted_hp: u32,
    pub boosted_attack: u32,
    pub boosted_defense: u32,
    pub level: u32,
    pub experience: f64,
    pub is_busy: bool,
}

impl CombatCreature {
    /// A weakened creature has no hp left and must leave its roster.
    pub fn is_weakened(&self) -> bool {
        self.boosted_hp == 0
    }

    /// Subtracts `damage` from the boosted hp (clamped to 0) and returns the
    /// remaining hp.
    pub fn take_damage(&mut self, damage: u32) -> u32 {
        self.boosted_hp = self.boosted_hp.saturating_sub(damage);
        self.boosted_hp
    }

    /// Restores up to `amount` hp without exceeding `max_hp`. Returns the
    /// amount actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.boosted_hp;
        self.boosted_hp = self.boosted_hp.saturating_add(amount).min(self.max_hp);
        self.boosted_hp - before
    }

    pub fn is_at_full_hp(&self) -> bool {
        self.boosted_hp >= self.max_hp
    }
}

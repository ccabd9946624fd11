//! Timing and probability knobs for combat sessions.

use std::env;
use std::time::Duration;

use loomie_core::GYM_DODGE_PERCENT;

/// Configuration shared by every session a registry spawns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CombatConfig {
    /// How long the player has to dodge an announced gym attack.
    pub dodge_window: Duration,
    /// Minimum spacing between two accepted player attacks.
    pub attack_cooldown: Duration,
    /// How often the inactivity watchdog checks the session.
    pub watchdog_interval: Duration,
    /// Silence after which the session is closed.
    pub inactivity_limit: Duration,
    /// Lower bound of the random pause before each gym attack.
    pub gym_attack_min: Duration,
    /// Upper bound (inclusive) of the random pause before each gym attack.
    pub gym_attack_max: Duration,
    /// Chance, in percent, that the gym dodges a player attack.
    pub gym_dodge_percent: u32,
    /// Capacity of the inbound frame channel handed to the transport.
    pub inbound_buffer: usize,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            dodge_window: Duration::from_secs(1),
            attack_cooldown: Duration::from_secs(1),
            watchdog_interval: Duration::from_secs(5),
            inactivity_limit: Duration::from_secs(30),
            gym_attack_min: Duration::from_secs(2),
            gym_attack_max: Duration::from_secs(4),
            gym_dodge_percent: GYM_DODGE_PERCENT,
            inbound_buffer: 32,
        }
    }
}

impl CombatConfig {
    /// Loads overrides from the environment. Missing or unparsable values
    /// keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(ms) = read_env::<u64>("COMBAT_DODGE_WINDOW_MS") {
            config.dodge_window = Duration::from_millis(ms);
        }
        if let Some(ms) = read_env::<u64>("COMBAT_ATTACK_COOLDOWN_MS") {
            config.attack_cooldown = Duration::from_millis(ms);
        }
        if let Some(secs) = read_env::<u64>("COMBAT_WATCHDOG_INTERVAL_SECS") {
            config.watchdog_interval = Duration::from_secs(secs.max(1));
        }
        if let Some(secs) = read_env::<u64>("COMBAT_INACTIVITY_LIMIT_SECS") {
            config.inactivity_limit = Duration::from_secs(secs);
        }
        if let Some(secs) = read_env::<u64>("GAME_MIN_COMBAT_TIMEOUT") {
            config.gym_attack_min = Duration::from_secs(secs);
        }
        if let Some(secs) = read_env::<u64>("GAME_MAX_COMBAT_TIMEOUT") {
            config.gym_attack_max = Duration::from_secs(secs);
        }
        if let Some(percent) = read_env::<u32>("COMBAT_GYM_DODGE_PERCENT") {
            config.gym_dodge_percent = percent.min(100);
        }

        config.normalized()
    }

    /// Swaps inverted gym attack bounds and clamps the dodge chance.
    pub fn normalized(mut self) -> Self {
        if self.gym_attack_min > self.gym_attack_max {
            std::mem::swap(&mut self.gym_attack_min, &mut self.gym_attack_max);
        }
        self.gym_dodge_percent = self.gym_dodge_percent.min(100);
        self.inbound_buffer = self.inbound_buffer.max(1);
        self
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_protocol_timings() {
        let config = CombatConfig::default();
        assert_eq!(config.dodge_window, Duration::from_secs(1));
        assert_eq!(config.attack_cooldown, Duration::from_secs(1));
        assert_eq!(config.watchdog_interval, Duration::from_secs(5));
        assert_eq!(config.inactivity_limit, Duration::from_secs(30));
        assert_eq!(config.gym_dodge_percent, 10);
    }

    #[test]
    fn normalized_fixes_inverted_bounds() {
        let config = CombatConfig {
            gym_attack_min: Duration::from_secs(5),
            gym_attack_max: Duration::from_secs(1),
            gym_dodge_percent: 250,
            inbound_buffer: 0,
            ..CombatConfig::default()
        }
        .normalized();

        assert_eq!(config.gym_attack_min, Duration::from_secs(1));
        assert_eq!(config.gym_attack_max, Duration::from_secs(5));
        assert_eq!(config.gym_dodge_percent, 100);
        assert_eq!(config.inbound_buffer, 1);
    }
}

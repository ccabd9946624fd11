//! Server configuration loaded from the environment.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use combat_runtime::CombatConfig;

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// World fixture; the bundled demo world is used when unset.
    pub fixtures: Option<PathBuf>,
    /// Log directory override; defaults to the platform cache directory.
    pub log_dir: Option<PathBuf>,
    /// How long a new connection may take to send its JOIN line.
    pub join_timeout: Duration,
    pub combat: CombatConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 7878)),
            fixtures: None,
            log_dir: None,
            join_timeout: Duration::from_secs(10),
            combat: CombatConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let mut config = Self {
            combat: CombatConfig::from_env(),
            ..Self::default()
        };

        if let Some(addr) = read_env::<SocketAddr>("COMBAT_BIND_ADDR") {
            config.bind_addr = addr;
        }
        config.fixtures = env::var_os("COMBAT_FIXTURES").map(PathBuf::from);
        config.log_dir = env::var_os("COMBAT_LOG_DIR").map(PathBuf::from);
        if let Some(secs) = read_env::<u64>("COMBAT_JOIN_TIMEOUT_SECS") {
            config.join_timeout = Duration::from_secs(secs.max(1));
        }

        config
    }

    /// Directory for the rolling log file, if one can be resolved.
    pub fn resolved_log_dir(&self) -> Option<PathBuf> {
        self.log_dir.clone().or_else(|| {
            directories::ProjectDirs::from("", "", "loomies-combat")
                .map(|dirs| dirs.cache_dir().join("logs"))
        })
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

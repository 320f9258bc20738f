//! Application-level configuration loading, including grace delays and the
//! avatar set players draw from.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use rand::seq::IndexedRandom;
use serde::Deserialize;
use serde_with::{DurationMilliSeconds, serde_as};
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "QUIZ_BACK_CONFIG_PATH";
/// Fallback avatar returned when the avatar set is exhausted.
const DEFAULT_AVATAR: &str = "owl";

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Delay between flagging a kicked player and physically removing them,
    /// so their client can observe the flag and exit.
    pub kick_removal_grace: Duration,
    /// Delay between broadcasting the restart signal and replacing the
    /// session during a full restart.
    pub full_restart_grace: Duration,
    /// Capacity of each session's snapshot broadcast channel.
    pub snapshot_capacity: usize,
    /// Avatars assigned to players who join without choosing one.
    pub avatars: Vec<String>,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        avatars = config.avatars.len(),
                        "loaded configuration"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Pick a random avatar that no current player uses yet.
    ///
    /// When the whole set is taken we fall back to a random (reused) entry,
    /// and to [`DEFAULT_AVATAR`] only when the set itself is empty, so
    /// callers always receive a value.
    pub fn pick_avatar(&self, used: &[&str]) -> String {
        let mut rng = rand::rng();
        let unused: Vec<&String> = self
            .avatars
            .iter()
            .filter(|candidate| !used.contains(&candidate.as_str()))
            .collect();

        if let Some(avatar) = unused.choose(&mut rng) {
            return (*avatar).clone();
        }

        self.avatars
            .choose(&mut rng)
            .cloned()
            .unwrap_or_else(|| DEFAULT_AVATAR.to_string())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            kick_removal_grace: Duration::from_secs(5),
            full_restart_grace: Duration::from_secs(3),
            snapshot_capacity: 32,
            avatars: default_avatars(),
        }
    }
}

#[serde_as]
#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    kick_removal_grace_ms: Option<Duration>,
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    full_restart_grace_ms: Option<Duration>,
    snapshot_capacity: Option<usize>,
    avatars: Option<Vec<String>>,
}

impl From<RawConfig> for AppConfig {
    fn from(raw: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            kick_removal_grace: raw.kick_removal_grace_ms.unwrap_or(defaults.kick_removal_grace),
            full_restart_grace: raw.full_restart_grace_ms.unwrap_or(defaults.full_restart_grace),
            snapshot_capacity: raw.snapshot_capacity.unwrap_or(defaults.snapshot_capacity),
            avatars: raw
                .avatars
                .filter(|set| !set.is_empty())
                .unwrap_or(defaults.avatars),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Built-in avatar set shipped with the binary.
fn default_avatars() -> Vec<String> {
    [
        "owl", "fox", "panda", "koala", "tiger", "whale", "otter", "raven", "gecko", "lynx",
        "bison", "heron", "mole", "wolf", "crab", "ibis",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_avatar_avoids_taken_entries() {
        let config = AppConfig {
            avatars: vec!["owl".into(), "fox".into()],
            ..AppConfig::default()
        };
        assert_eq!(config.pick_avatar(&["owl"]), "fox");
    }

    #[test]
    fn pick_avatar_reuses_when_exhausted() {
        let config = AppConfig {
            avatars: vec!["owl".into()],
            ..AppConfig::default()
        };
        assert_eq!(config.pick_avatar(&["owl"]), "owl");
    }
}

use std::env;
use std::path::{Path, PathBuf};

use crate::models::RecordKey;

/// Storage configuration.
///
/// Reads from the `ROSTER_DATA_DIR` environment variable, falling back to
/// the XDG data directory (`$XDG_DATA_HOME/roster` or
/// `~/.local/share/roster`) when unset.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding one JSON file per record.
    pub data_dir: PathBuf,
}

impl StoreConfig {
    /// Environment variable that overrides the data directory.
    pub const ENV_VAR: &str = "ROSTER_DATA_DIR";

    /// Build a config from the environment.
    ///
    /// Priority: `ROSTER_DATA_DIR` env var, then [`default_data_dir`].
    pub fn from_env() -> Self {
        let data_dir = env::var(Self::ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_data_dir());
        Self { data_dir }
    }

    /// Build a config from an explicit directory (useful for tests and CLI flags).
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Path of the JSON file backing `key`.
    pub fn record_path(&self, key: RecordKey) -> PathBuf {
        self.data_dir.join(format!("{}.json", key.as_str()))
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Return the default data directory.
///
/// Uses XDG layout on every platform, matching the config directory.
pub fn default_data_dir() -> PathBuf {
    if let Ok(xdg) = env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg).join("roster");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".local")
        .join("share")
        .join("roster")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_path_uses_key_name() {
        let cfg = StoreConfig::new("/var/lib/roster");
        assert_eq!(
            cfg.record_path(RecordKey::Schedule),
            PathBuf::from("/var/lib/roster/schedule.json")
        );
        assert_eq!(
            cfg.record_path(RecordKey::Mentors),
            PathBuf::from("/var/lib/roster/mentors.json")
        );
    }

    #[test]
    fn explicit_new() {
        let cfg = StoreConfig::new("/tmp/elsewhere");
        assert_eq!(cfg.data_dir(), Path::new("/tmp/elsewhere"));
    }

    #[test]
    fn default_data_dir_ends_with_roster() {
        assert!(default_data_dir().ends_with("roster"));
    }
}

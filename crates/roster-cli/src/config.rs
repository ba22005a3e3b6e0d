//! Configuration file management for roster.
//!
//! Provides a TOML-based config file at `~/.config/roster/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use roster_core::generate::GeminiConfig;
use roster_core::generate::gemini::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use roster_store::config::{StoreConfig, default_data_dir};

pub const API_KEY_ENV: &str = "ROSTER_API_KEY";
/// Fallback key variable shared with other Gemini tooling.
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "ROSTER_MODEL";
pub const BASE_URL_ENV: &str = "ROSTER_GEMINI_URL";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub gemini: GeminiSection,
    #[serde(default)]
    pub storage: StorageSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GeminiSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StorageSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the roster config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/roster` or `~/.config/roster`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("roster");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("roster")
}

/// Return the path to the roster config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents).context("failed to parse config file")?;
    Ok(config)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config(config: &ConfigFile) -> Result<()> {
    save_config_to(config, &config_path())
}

pub fn save_config_to(config: &ConfigFile, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    // The file may hold an API key.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Values given on the command line, highest priority.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub api_key: Option<String>,
    pub model: Option<String>,
}

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct RosterConfig {
    pub store_config: StoreConfig,
    /// Absent until a command that calls the generator needs it.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl RosterConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - Data dir: `--data-dir` > `ROSTER_DATA_DIR` > `storage.data_dir` > XDG data dir
    /// - API key: `--api-key` > `ROSTER_API_KEY` > `GEMINI_API_KEY` > `gemini.api_key` > none
    /// - Model: `--model` > `ROSTER_MODEL` > `gemini.model` > `gemini-2.5-flash`
    /// - Base URL: `ROSTER_GEMINI_URL` > `gemini.base_url` > Google endpoint
    pub fn resolve(overrides: &Overrides) -> Result<Self> {
        let file_config = match load_config() {
            Ok(cfg) => Some(cfg),
            Err(e) if config_path().exists() => return Err(e),
            Err(_) => None,
        };
        Ok(Self::resolve_with(overrides, file_config.unwrap_or_default()))
    }

    fn resolve_with(overrides: &Overrides, file: ConfigFile) -> Self {
        let data_dir = overrides
            .data_dir
            .clone()
            .or_else(|| env_path(StoreConfig::ENV_VAR))
            .or(file.storage.data_dir)
            .unwrap_or_else(default_data_dir);

        let api_key = overrides
            .api_key
            .clone()
            .or_else(|| env_string(API_KEY_ENV))
            .or_else(|| env_string(GEMINI_API_KEY_ENV))
            .or(file.gemini.api_key)
            .filter(|k| !k.trim().is_empty());

        let model = overrides
            .model
            .clone()
            .or_else(|| env_string(MODEL_ENV))
            .or(file.gemini.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_owned());

        let base_url = env_string(BASE_URL_ENV)
            .or(file.gemini.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());

        Self {
            store_config: StoreConfig::new(data_dir),
            api_key,
            model,
            base_url,
        }
    }

    /// Client settings for the Gemini generator. Errors if no API key was
    /// found anywhere in the chain.
    pub fn gemini_config(&self) -> Result<GeminiConfig> {
        let Some(api_key) = self.api_key.as_deref() else {
            bail!(
                "Gemini API key not found; set {API_KEY_ENV} or {GEMINI_API_KEY_ENV}, pass \
                 --api-key, or run `roster init --api-key <KEY>`"
            );
        };
        Ok(GeminiConfig::new(api_key)
            .with_model(&self.model)
            .with_base_url(&self.base_url))
    }
}

fn env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn env_path(name: &str) -> Option<PathBuf> {
    env_string(name).map(PathBuf::from)
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

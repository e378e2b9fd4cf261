//! Configuration file management for streakplan.
//!
//! Provides a TOML-based config file at `~/.config/streakplan/config.toml` and
//! a resolution chain: CLI flag > env var > config file > default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use streakplan_core::plan::GeneratorConfig;
use streakplan_core::plan::generate::{DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_TOKENS};
use streakplan_core::remote::{DEFAULT_BASE_URL, DEFAULT_MODEL, HttpClientConfig};
use streakplan_db::config::{DATABASE_URL_ENV, DbConfig};

pub const API_KEY_ENV: &str = "STREAKPLAN_API_KEY";
pub const API_BASE_URL_ENV: &str = "STREAKPLAN_API_BASE_URL";
pub const MODEL_ENV: &str = "STREAKPLAN_MODEL";

const DEFAULT_TIMEOUT_SECS: u64 = 60;

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub database: DatabaseSection,
    #[serde(default)]
    pub generator: GeneratorSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub url: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            url: DbConfig::DEFAULT_URL.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSection {
    pub base_url: String,
    pub model: String,
    /// Without a key the planner uses template fallback only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    pub max_attempts: u32,
    pub max_tokens: u32,
}

impl Default for GeneratorSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the streakplan config directory.
///
/// Always uses XDG layout: `$XDG_CONFIG_HOME/streakplan` or
/// `~/.config/streakplan`, also on macOS.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("streakplan");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("streakplan")
}

pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Load and parse the config file at `path`.
pub fn load_config_from(path: &Path) -> Result<ConfigFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    toml::from_str(&contents).context("failed to parse config file")
}

/// Serialize and write `config` to `path`, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix.
pub fn save_config_to(config: &ConfigFile, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

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

/// Fully resolved configuration, ready for use.
#[derive(Debug)]
pub struct StreakplanConfig {
    pub db_config: DbConfig,
    pub generator: GeneratorConfig,
    /// `None` when no API key is configured.
    pub remote: Option<HttpClientConfig>,
}

impl StreakplanConfig {
    /// Resolve configuration using the chain: CLI flag > env var > config file > default.
    ///
    /// - DB URL: `cli_db_url` > `STREAKPLAN_DATABASE_URL` > `database.url` > `DbConfig::DEFAULT_URL`
    /// - API key: `STREAKPLAN_API_KEY` > `generator.api_key` > none (fallback only)
    /// - Base URL and model: env var > `[generator]` > built-in default
    pub fn resolve(cli_db_url: Option<&str>) -> Result<Self> {
        let path = config_path();
        let file_config = if path.exists() {
            Some(load_config_from(&path)?)
        } else {
            None
        };
        Ok(Self::from_parts(cli_db_url, file_config.unwrap_or_default()))
    }

    fn from_parts(cli_db_url: Option<&str>, file: ConfigFile) -> Self {
        let db_url = cli_db_url
            .map(str::to_string)
            .or_else(|| env_nonempty(DATABASE_URL_ENV))
            .unwrap_or(file.database.url);

        let section = file.generator;
        let generator = GeneratorConfig {
            max_attempts: section.max_attempts,
            attempt_timeout: Duration::from_secs(section.timeout_secs),
            max_tokens: section.max_tokens,
        };

        let remote = env_nonempty(API_KEY_ENV)
            .or(section.api_key.filter(|k| !k.trim().is_empty()))
            .map(|api_key| HttpClientConfig {
                base_url: env_nonempty(API_BASE_URL_ENV).unwrap_or(section.base_url),
                api_key,
                model: env_nonempty(MODEL_ENV).unwrap_or(section.model),
                timeout: generator.attempt_timeout,
            });

        Self {
            db_config: DbConfig::new(db_url),
            generator,
            remote,
        }
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------

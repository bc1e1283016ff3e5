// src/config.rs

use crate::error::{PdError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings loaded from `~/.config/pdlog/config.toml`.
///
/// Every field has a default, so a missing file or a partial one is fine.
/// The `--db` flag / `PDLOG_DB` override `database` at the CLI layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Journal database file. Defaults to `~/.config/pdlog/pdlog.db`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    /// Where `pdlog export` writes backups when `-o` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,

    /// tracing filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "pdlog=warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: None,
            export_dir: None,
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    /// `~/.config/pdlog`
    pub fn config_dir() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().ok_or(PdError::HomeDirNotFound)?;
        Ok(home_dir.join(".config/pdlog"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads the default config file, falling back to defaults when it does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        toml::from_str(&contents)
            .map_err(|e| PdError::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| PdError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Resolved database path: explicit override, then config, then the default location.
    pub fn database_path(&self, cli_override: Option<&Path>) -> Result<PathBuf> {
        if let Some(p) = cli_override {
            return Ok(p.to_path_buf());
        }
        match &self.database {
            Some(p) => Ok(p.clone()),
            None => Ok(Self::config_dir()?.join("pdlog.db")),
        }
    }

    pub fn export_dir(&self) -> Result<PathBuf> {
        match &self.export_dir {
            Some(p) => Ok(p.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }
}

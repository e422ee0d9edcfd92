//! Configuration management
//!
//! Settings live in `settings.json` inside the data directory:
//! ```json
//! {
//!   "dbFilename": "fintrack.duckdb",
//!   "currencySymbol": "$",
//!   "argon2": { "memoryCost": 19456, "timeCost": 2, "parallelism": 1 }
//! }
//! ```
//! Keys this crate does not know about are kept as-is when saving.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::Argon2Params;

pub const SETTINGS_FILENAME: &str = "settings.json";
pub const DEFAULT_DB_FILENAME: &str = "fintrack.duckdb";
pub const DEFAULT_CURRENCY_SYMBOL: &str = "$";

/// Environment variable that overrides `dbFilename`
pub const DB_FILE_ENV: &str = "FINTRACK_DB_FILE";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    db_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    currency_symbol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    argon2: Option<Argon2Params>,
    #[serde(flatten)]
    other: BTreeMap<String, serde_json::Value>,
}

/// Fintrack configuration (resolved view of the settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub db_filename: String,
    pub currency_symbol: String,
    pub argon2: Argon2Params,
    // Keep the raw settings for preservation when saving
    raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_filename: DEFAULT_DB_FILENAME.to_string(),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
            argon2: Argon2Params::default(),
            raw_settings: SettingsFile::default(),
        }
    }
}

impl Config {
    /// Load config from the data directory
    ///
    /// A missing file gives the defaults. `FINTRACK_DB_FILE` overrides the
    /// database file name (for CI/testing).
    pub fn load(data_dir: &Path) -> Result<Self> {
        let raw = Self::read_settings(data_dir)?;

        let db_filename = match std::env::var(DB_FILE_ENV) {
            Ok(name) if !name.trim().is_empty() => name,
            _ => raw
                .db_filename
                .clone()
                .unwrap_or_else(|| DEFAULT_DB_FILENAME.to_string()),
        };

        Ok(Self {
            db_filename,
            currency_symbol: raw
                .currency_symbol
                .clone()
                .unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string()),
            argon2: raw.argon2.unwrap_or_default(),
            raw_settings: raw,
        })
    }

    /// Save config to the data directory
    /// Preserves other settings that this crate doesn't manage
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let settings_path = data_dir.join(SETTINGS_FILENAME);

        let mut settings = Self::read_settings(data_dir)?;
        settings.other.extend(self.raw_settings.other.clone());

        // Update only the fields we manage
        // An environment override is never persisted
        if std::env::var_os(DB_FILE_ENV).is_none() {
            settings.db_filename = Some(self.db_filename.clone());
        }
        settings.currency_symbol = Some(self.currency_symbol.clone());
        settings.argon2 = Some(self.argon2);

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)
            .with_context(|| format!("Failed to write {}", settings_path.display()))?;
        Ok(())
    }

    /// Full path of the ledger database
    pub fn db_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.db_filename)
    }

    fn read_settings(data_dir: &Path) -> Result<SettingsFile> {
        let settings_path = data_dir.join(SETTINGS_FILENAME);
        if !settings_path.exists() {
            return Ok(SettingsFile::default());
        }

        let content = std::fs::read_to_string(&settings_path)
            .with_context(|| format!("Failed to read {}", settings_path.display()))?;
        match serde_json::from_str(&content) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                tracing::warn!(error = %e, "settings.json is malformed, using defaults");
                Ok(SettingsFile::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_file() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.currency_symbol, "$");
        assert_eq!(config.argon2, Argon2Params::default());
        assert!(config.db_path(dir.path()).ends_with(config.db_filename.as_str()));
    }

    #[test]
    fn test_load_camel_case_settings() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILENAME),
            r#"{
                "currencySymbol": "€",
                "argon2": {"memoryCost": 8, "timeCost": 1, "parallelism": 1}
            }"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.currency_symbol, "€");
        assert_eq!(config.argon2, Argon2Params::minimal());
    }

    #[test]
    fn test_malformed_settings_fall_back() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(SETTINGS_FILENAME), "{ not json").unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.currency_symbol, DEFAULT_CURRENCY_SYMBOL);
    }

    #[test]
    fn test_save_preserves_unknown_keys() {
        let dir = tempdir().unwrap();
        std::fs::write(
            dir.path().join(SETTINGS_FILENAME),
            r#"{"theme": "dark", "currencySymbol": "£"}"#,
        )
        .unwrap();

        let mut config = Config::load(dir.path()).unwrap();
        config.currency_symbol = "kr".to_string();
        config.save(dir.path()).unwrap();

        let content = std::fs::read_to_string(dir.path().join(SETTINGS_FILENAME)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["theme"], "dark");
        assert_eq!(value["currencySymbol"], "kr");
        assert_eq!(value["argon2"]["memoryCost"], 19456);

        let reloaded = Config::load(dir.path()).unwrap();
        assert_eq!(reloaded.currency_symbol, "kr");
    }
}

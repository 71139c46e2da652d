//! Configuration for study-cards.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub study: StudyConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load from the default location. A missing file yields defaults.
    pub fn load() -> anyhow::Result<Self> {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn config_path() -> Option<PathBuf> {
        project_dirs().map(|d| d.config_dir().join("config.toml"))
    }

    pub fn db_path(&self) -> PathBuf {
        self.storage
            .database
            .clone()
            .or_else(|| project_dirs().map(|d| d.data_dir().join("study-cards.db")))
            .unwrap_or_else(|| "study-cards.db".into())
    }

    pub fn log_path(&self) -> PathBuf {
        self.logging
            .file
            .clone()
            .or_else(|| project_dirs().map(|d| d.data_dir().join("study-cards.log")))
            .unwrap_or_else(|| "study-cards.log".into())
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "study-cards")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyConfig {
    /// New cards per day for decks without their own setting.
    #[serde(default = "default_new_cards")]
    pub default_new_cards: usize,
}

fn default_new_cards() -> usize { study_core::DEFAULT_NEW_CARDS }

impl Default for StudyConfig {
    fn default() -> Self {
        Self {
            default_new_cards: default_new_cards(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub database: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive, overridden by `RUST_LOG`.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_level() -> String { "info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.study.default_new_cards, 30);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[study]\ndefault_new_cards = 10\n\n[storage]\ndatabase = \"/tmp/cards.db\"").unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.study.default_new_cards, 10);
        assert_eq!(config.db_path(), PathBuf::from("/tmp/cards.db"));
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_bad_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[study]\ndefault_new_cards = \"many\"").unwrap();
        assert!(Config::load_from(file.path()).is_err());
    }
}

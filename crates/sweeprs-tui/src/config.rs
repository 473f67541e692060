//! Configuration file handling.
//!
//! Reads from `~/.config/sweeprs/sweeprs.toml`

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use sweeprs_core::{ExportOptions, GeneratorOptions, GroupSort};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Where the cleaned CSV is written.
    #[serde(default = "default_output_file")]
    pub output_file: PathBuf,
    /// Append the review status column to exported rows.
    #[serde(default = "default_include_status")]
    pub include_status: bool,
    /// Seconds before a revealed password is masked again.
    #[serde(default = "default_reveal_timeout_secs")]
    pub reveal_timeout_secs: u64,
    #[serde(default)]
    pub default_sort: GroupSort,
    #[serde(default)]
    pub generator: GeneratorOptions,
}

fn default_output_file() -> PathBuf {
    PathBuf::from("cleaned_passwords.csv")
}

fn default_include_status() -> bool {
    true
}

fn default_reveal_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_file: default_output_file(),
            include_status: default_include_status(),
            reveal_timeout_secs: default_reveal_timeout_secs(),
            default_sort: GroupSort::default(),
            generator: GeneratorOptions::default(),
        }
    }
}

impl Config {
    /// Load configuration from the config file.
    ///
    /// If `custom_path` is provided it must exist. Otherwise the default
    /// location is used and a default file is written there on first run.
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self> {
        match custom_path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Self::read(&path)
            }
            None => {
                let path = Self::config_path()?;
                if path.exists() {
                    Self::read(&path)
                } else {
                    let config = Config::default();
                    config.save_to(&path)?;
                    tracing::info!("Created default config at {}", path.display());
                    Ok(config)
                }
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Write the configuration, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    pub fn export_options(&self) -> ExportOptions {
        ExportOptions {
            include_status: self.include_status,
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join("sweeprs").join("sweeprs.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config: Config = toml::from_str("include_status = false\n").unwrap();
        assert!(!config.include_status);
        assert_eq!(config.output_file, PathBuf::from("cleaned_passwords.csv"));
        assert_eq!(config.reveal_timeout_secs, 30);
        assert_eq!(config.default_sort, GroupSort::Name);
        assert_eq!(config.generator, GeneratorOptions::default());
    }

    #[test]
    fn reads_nested_generator_table() {
        let text = "default_sort = \"progress\"\n\n[generator]\nlength = 24\nsymbols = false\n";
        let config: Config = toml::from_str(text).unwrap();
        assert_eq!(config.default_sort, GroupSort::Progress);
        assert_eq!(config.generator.length, 24);
        assert!(!config.generator.symbols);
        assert!(config.generator.digits);
    }

    #[test]
    fn custom_path_must_exist() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(Some(dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("sweeprs.toml");
        let config = Config {
            output_file: PathBuf::from("/tmp/out.csv"),
            reveal_timeout_secs: 5,
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        assert_eq!(Config::load(Some(path)).unwrap(), config);
    }

    #[test]
    fn unparseable_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "reveal_timeout_secs = \"soon\"").unwrap();
        let err = Config::load(Some(path)).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}

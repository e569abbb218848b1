//! Evaluator configuration (`~/.cmdblock.toml`)
//!
//! ```toml
//! seed = 42                    # fixed seed for rand()/randf(); entropy when absent
//! default_precision = 3        # randf() decimals when the 4th argument is omitted
//! max_sequence_len = 1000000   # longest sequence a..b may produce
//! max_sample_attempts = 10000000
//! json = false                 # CLI prints JSON instead of text
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Error types for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config format error: {0}")]
    Format(String),

    #[error("Config support not compiled in (enable the `config` feature)")]
    Unsupported,
}

#[cfg(feature = "config")]
impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Format(e.to_string())
    }
}

/// Tunables shared by every evaluation an `Evaluator` performs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seed for the random utilities
    pub seed: Option<u64>,

    /// Decimal places used by randf() without an explicit precision
    pub default_precision: i32,

    /// Upper bound on generated sequence length
    pub max_sequence_len: usize,

    /// Upper bound on randf() draws before giving up
    pub max_sample_attempts: u64,

    /// Render CLI output as JSON
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            seed: None,
            default_precision: 3,
            max_sequence_len: 1_000_000,
            max_sample_attempts: 10_000_000,
            json: false,
        }
    }
}

impl Config {
    /// Parse a config from TOML text
    #[cfg(feature = "config")]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    #[cfg(not(feature = "config"))]
    pub fn from_toml_str(_content: &str) -> Result<Self, ConfigError> {
        Err(ConfigError::Unsupported)
    }

    /// Load a config from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Resolve the config location: explicit path, `$CMDBLOCK_CONFIG`, then `~/.cmdblock.toml`.
    /// Returns the defaults when no file exists at the implicit location.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        if let Some(path) = std::env::var_os("CMDBLOCK_CONFIG") {
            return Self::load(Path::new(&path));
        }

        match default_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }
}

/// Get home directory
pub fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// `~/.cmdblock.toml`
pub fn default_path() -> Option<PathBuf> {
    dirs_home().map(|h| h.join(".cmdblock.toml"))
}

#[cfg(all(test, feature = "config"))]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_config() {
        let content = r#"
seed = 7
default_precision = 2
max_sequence_len = 500
max_sample_attempts = 1000
json = true
"#;
        let config = Config::from_toml_str(content).unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.default_precision, 2);
        assert_eq!(config.max_sequence_len, 500);
        assert_eq!(config.max_sample_attempts, 1000);
        assert!(config.json);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = Config::from_toml_str("seed = 1").unwrap();
        assert_eq!(config.seed, Some(1));
        assert_eq!(config.default_precision, 3);
        assert_eq!(config.max_sequence_len, 1_000_000);
        assert!(!config.json);
    }

    #[test]
    fn test_malformed_config() {
        let result = Config::from_toml_str("seed = \"not a number\"");
        assert!(matches!(result, Err(ConfigError::Format(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmdblock.toml");
        std::fs::write(&path, "default_precision = 5\n").unwrap();
        let config = Config::discover(Some(&path)).unwrap();
        assert_eq!(config.default_precision, 5);
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}

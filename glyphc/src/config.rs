//! Configuration for the glyphc CLI.
//!
//! Grounded in `faxt::config::Config`'s search-path/`find_config_file`
//! pattern: current directory, then `$HOME/.config/glyphc/`, then the
//! platform config directory, each checked in turn for `glyphc.toml`.

use dirs::{config_dir, home_dir};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{GlyphcError, Result};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "glyphc.toml";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Global verbose setting, overridable by `--verbose`.
    #[serde(default)]
    pub verbose: bool,

    /// Read-specific configuration.
    #[serde(default)]
    pub read: ReadConfig,
}

/// Read-specific configuration options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadConfig {
    /// The namespace syntax-quote resolves bare symbols against when no
    /// `--ns` flag is given.
    #[serde(default = "default_ns")]
    pub default_ns: String,

    /// Whether to keep reading remaining top-level forms from a source
    /// after one of them fails, rather than aborting the whole file.
    #[serde(default)]
    pub continue_on_error: bool,
}

fn default_ns() -> String {
    "user".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            verbose: false,
            read: ReadConfig::default(),
        }
    }
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            default_ns: default_ns(),
            continue_on_error: false,
        }
    }
}

impl Config {
    /// Load configuration from the default search locations, falling back to
    /// [`Config::default`] if none is found.
    pub fn load() -> Result<Self> {
        match Self::find_config_file() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(GlyphcError::Config(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    fn check_current_dir_config() -> Option<PathBuf> {
        let path = PathBuf::from(CONFIG_FILE_NAME);
        path.exists().then_some(path)
    }

    fn check_home_config() -> Option<PathBuf> {
        home_dir()
            .map(|dir| dir.join(".config").join("glyphc").join(CONFIG_FILE_NAME))
            .filter(|path| path.exists())
    }

    fn check_system_config() -> Option<PathBuf> {
        config_dir()
            .map(|dir| dir.join("glyphc").join(CONFIG_FILE_NAME))
            .filter(|path| path.exists())
    }

    /// Find the configuration file in standard locations, in search order.
    fn find_config_file() -> Option<PathBuf> {
        Self::check_current_dir_config()
            .or_else(Self::check_home_config)
            .or_else(Self::check_system_config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_has_user_namespace_and_stops_on_error() {
        let config = Config::default();
        assert_eq!(config.read.default_ns, "user");
        assert!(!config.read.continue_on_error);
    }

    #[test]
    fn load_from_nonexistent_path_is_an_error() {
        let result = Config::load_from_path(Path::new("/nonexistent/path/glyphc.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn load_from_path_parses_a_written_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("glyphc.toml");
        std::fs::write(&path, "verbose = true\n[read]\ndefault_ns = \"demo\"\n").unwrap();
        let config = Config::load_from_path(&path).unwrap();
        assert!(config.verbose);
        assert_eq!(config.read.default_ns, "demo");
    }
}

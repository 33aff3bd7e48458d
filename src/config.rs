//! Application configuration.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults
//! 2. A TOML file (the platform config dir, or `--config`)
//! 3. `DUPECAT_*` environment variables (e.g. `DUPECAT_WORKERS=4`)
//!
//! Command-line flags are applied on top by the caller.
//!
//! ```toml
//! workers = 10
//! recursive = true
//! use_hash = true
//! color = true
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::duplicates::DEFAULT_WORKERS;

/// Prefix of environment variables read into the config.
pub const ENV_PREFIX: &str = "DUPECAT_";

/// Errors raised while loading or printing configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A layer could not be parsed or has the wrong types.
    #[error("invalid configuration: {0}")]
    Invalid(#[from] Box<figment::Error>),

    /// The merged config could not be rendered as TOML.
    #[error("failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Merged application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of fingerprint workers.
    pub workers: usize,
    /// Descend into subdirectories.
    pub recursive: bool,
    /// Compare fingerprints, not just sizes.
    pub use_hash: bool,
    /// Colored terminal output.
    pub color: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            recursive: true,
            use_hash: true,
            color: true,
        }
    }
}

impl Config {
    /// The platform-specific config file location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dupecat").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// The layered provider chain for `path` (or the default location).
    #[must_use]
    pub fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(file) = path.map(Path::to_path_buf).or_else(Self::default_path) {
            log::debug!("Config file: {}", file.display());
            figment = figment.merge(Toml::file(file));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load and merge every layer.
    ///
    /// A missing file is not an error; its layer is simply empty.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for malformed TOML or mistyped values.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::figment(path).extract().map_err(|e| Box::new(e).into())
    }

    /// Parse a TOML document over the defaults, ignoring file and environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for malformed TOML or mistyped values.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::string(toml))
            .extract()
            .map_err(|e| Box::new(e).into())
    }

    /// Render as a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Render`] if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.workers, 10);
        assert!(config.recursive);
        assert!(config.use_hash);
        assert!(config.color);
    }

    #[test]
    fn test_from_toml_str_partial() {
        let config = Config::from_toml_str("workers = 4\ncolor = false\n").unwrap();
        assert_eq!(config.workers, 4);
        assert!(!config.color);
        assert!(config.recursive);
    }

    #[test]
    fn test_from_toml_str_invalid() {
        assert!(matches!(
            Config::from_toml_str("workers = \"many\""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(Config::from_toml_str("workers = ").is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = Config {
            workers: 3,
            recursive: false,
            use_hash: false,
            color: true,
        };
        let rendered = config.to_toml().unwrap();
        assert!(rendered.contains("workers = 3"));
        assert_eq!(Config::from_toml_str(&rendered).unwrap(), config);
    }

    #[test]
    fn test_layers_env_over_file() {
        Jail::expect_with(|jail| {
            jail.create_file("dupecat.toml", "workers = 2\nrecursive = false\n")?;
            jail.set_env("DUPECAT_WORKERS", "7");

            let config = Config::load(Some(Path::new("dupecat.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config.workers, 7);
            assert!(!config.recursive);
            Ok(())
        });
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        Jail::expect_with(|_jail| {
            let config = Config::load(Some(Path::new("does-not-exist.toml")))
                .map_err(|e| e.to_string())?;
            assert_eq!(config, Config::default());
            Ok(())
        });
    }
}

//! Configuration loader.
//!
//! Reads and writes `config.toml` under a base directory, defaulting to
//! `~/.vemesh`. A missing file yields [`Config::default`].
//!
//! # Examples
//!
//! ```no_run
//! use vemesh_core::config_loader::ConfigLoader;
//!
//! let loader = ConfigLoader::new().expect("failed to create loader");
//! if !loader.exists() {
//!     loader.write_default().expect("failed to write default config");
//! }
//! let config = loader.load().expect("failed to load config");
//! println!("serving {}", config.network.name);
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::ConfigError;

const CONFIG_FILE_NAME: &str = "config.toml";

const BASE_DIR_NAME: &str = ".vemesh";

/// Loads and saves the configuration file.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    /// Creates a loader rooted at `~/.vemesh`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHomeDirectory`] if the home directory cannot be determined.
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            base_dir: default_base_dir()?,
        })
    }

    /// Creates a loader rooted at `base_dir`.
    #[must_use]
    pub const fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Creates a loader for an explicit config file path.
    ///
    /// The file's parent directory becomes the base directory. Paths starting
    /// with `~` are expanded.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoHomeDirectory`] if `~` cannot be expanded,
    /// or [`ConfigError::InvalidValue`] if the file name is not `config.toml`.
    pub fn for_file(path: &str) -> Result<Self, ConfigError> {
        let path = expand_path(path)?;
        if path.file_name().and_then(|n| n.to_str()) != Some(CONFIG_FILE_NAME) {
            return Err(ConfigError::invalid_value(
                "config path",
                path.display().to_string(),
            ));
        }
        let base_dir = path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Ok(Self { base_dir })
    }

    /// Path of the configuration file.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE_NAME)
    }

    /// The base directory.
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Loads and validates the configuration, or returns defaults if the file is absent.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ParseFailed`] on invalid TOML, [`ConfigError::Io`]
    /// on read failures, and [`ConfigError::InvalidValue`] if validation fails.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let config_path = self.config_path();

        if !config_path.exists() {
            return Ok(Config::default());
        }

        Self::load_from_path(&config_path)
    }

    /// Loads the configuration, failing if the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::FileNotFound`] if the file is absent, otherwise
    /// the same errors as [`load`](Self::load).
    pub fn load_required(&self) -> Result<Config, ConfigError> {
        let config_path = self.config_path();

        if !config_path.exists() {
            return Err(ConfigError::file_not_found(
                config_path.display().to_string(),
            ));
        }

        Self::load_from_path(&config_path)
    }

    /// Saves the configuration, creating the base directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] on write failures or
    /// [`ConfigError::ParseFailed`] if serialization fails.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        self.ensure_base_dir()?;

        let toml_str = toml::to_string_pretty(config).map_err(|e| {
            ConfigError::parse_failed(format!("failed to serialize configuration: {e}"))
        })?;

        fs::write(self.config_path(), toml_str)?;
        Ok(())
    }

    /// Writes [`Config::default_toml`] to the config path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] on write failures.
    pub fn write_default(&self) -> Result<(), ConfigError> {
        self.ensure_base_dir()?;
        fs::write(self.config_path(), Config::default_toml())?;
        Ok(())
    }

    /// Whether the configuration file exists.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.config_path().exists()
    }

    fn ensure_base_dir(&self) -> Result<(), ConfigError> {
        if !self.base_dir.exists() {
            fs::create_dir_all(&self.base_dir)?;
        }
        Ok(())
    }

    fn load_from_path(path: &Path) -> Result<Config, ConfigError> {
        let content = fs::read_to_string(path)?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            ConfigError::parse_failed(format!("invalid TOML in {}: {e}", path.display()))
        })?;

        config.validate()?;
        Ok(config)
    }
}

/// Expands a leading `~` to the home directory.
///
/// # Errors
///
/// Returns [`ConfigError::NoHomeDirectory`] if the path starts with `~` and
/// the home directory cannot be determined.
pub fn expand_path(path: &str) -> Result<PathBuf, ConfigError> {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or_else(ConfigError::no_home_directory)?;
        Ok(home.join(rest))
    } else if path == "~" {
        dirs::home_dir().ok_or_else(ConfigError::no_home_directory)
    } else {
        Ok(PathBuf::from(path))
    }
}

/// `~/.vemesh`.
///
/// # Errors
///
/// Returns [`ConfigError::NoHomeDirectory`] if the home directory cannot be determined.
pub fn default_base_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or_else(ConfigError::no_home_directory)?;
    Ok(home.join(BASE_DIR_NAME))
}

/// Loads the configuration from the default location.
///
/// # Errors
///
/// See [`ConfigLoader::new`] and [`ConfigLoader::load`].
pub fn load_config() -> Result<Config, ConfigError> {
    ConfigLoader::new()?.load()
}

#[cfg(test)]
mod tests {
    #![allow(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::indexing_slicing,
        clippy::needless_raw_string_hashes
    )]

    use super::*;
    use crate::config::TokenEntry;
    use tempfile::TempDir;

    // -------------------------------------------------------------------------
    // expand_path
    // -------------------------------------------------------------------------

    #[test]
    fn test_expand_path_with_tilde_prefix() {
        let path = expand_path("~/.vemesh/config.toml").expect("should succeed");
        let home = dirs::home_dir().expect("home dir should exist");
        assert_eq!(path, home.join(".vemesh/config.toml"));
    }

    #[test]
    fn test_expand_path_leaves_other_paths() {
        assert_eq!(
            expand_path("/etc/vemesh/config.toml").unwrap(),
            PathBuf::from("/etc/vemesh/config.toml")
        );
        assert_eq!(
            expand_path("/path/to/~/config.toml").unwrap(),
            PathBuf::from("/path/to/~/config.toml")
        );
    }

    #[test]
    fn test_default_base_dir() {
        let home = dirs::home_dir().expect("home dir should exist");
        assert_eq!(default_base_dir().unwrap(), home.join(".vemesh"));
    }

    // -------------------------------------------------------------------------
    // ConfigLoader
    // -------------------------------------------------------------------------

    #[test]
    fn test_for_file_uses_parent_dir() {
        let loader = ConfigLoader::for_file("/srv/vemesh/config.toml").unwrap();
        assert_eq!(loader.base_dir(), Path::new("/srv/vemesh"));
        assert!(ConfigLoader::for_file("/srv/vemesh/other.toml").is_err());
    }

    #[test]
    fn test_load_with_missing_file_returns_defaults() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let loader = ConfigLoader::with_base_dir(temp_dir.path().to_path_buf());

        assert!(!loader.exists());
        assert_eq!(loader.load().unwrap(), Config::default());
    }

    #[test]
    fn test_load_with_valid_toml() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        fs::write(
            temp_dir.path().join("config.toml"),
            r#"
[network]
name = "test"
chain_tag = 39

[[tokens]]
address = "0x0000000000000000000000000000000000001234"
symbol = "TKN"
decimals = 6
"#,
        )
        .expect("failed to write test file");

        let loader = ConfigLoader::with_base_dir(temp_dir.path().to_path_buf());
        let config = loader.load().expect("should succeed");

        assert_eq!(config.network.name, "test");
        assert_eq!(config.network.chain_tag, 39);
        assert_eq!(config.network.expiration, 720);
        assert_eq!(config.tokens.len(), 1);
        assert_eq!(config.tokens[0].symbol, "TKN");
    }

    #[test]
    fn test_load_with_invalid_toml_returns_parse_error() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        fs::write(temp_dir.path().join("config.toml"), "not toml [[[").unwrap();

        let loader = ConfigLoader::with_base_dir(temp_dir.path().to_path_buf());
        assert!(matches!(
            loader.load(),
            Err(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn test_load_runs_validation() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        fs::write(
            temp_dir.path().join("config.toml"),
            "[network]\nexpiration = 0\n",
        )
        .unwrap();

        let loader = ConfigLoader::with_base_dir(temp_dir.path().to_path_buf());
        assert!(matches!(
            loader.load(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_load_required_with_missing_file_returns_error() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let loader = ConfigLoader::with_base_dir(temp_dir.path().to_path_buf());

        assert!(matches!(
            loader.load_required(),
            Err(ConfigError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let loader = ConfigLoader::with_base_dir(temp_dir.path().join("nested/vemesh"));

        let original = Config::builder()
            .network_name("solo")
            .chain_tag(0xf6)
            .token(TokenEntry::new(
                "0x0000000000000000000000000000000000001234",
                "TKN",
                6,
            ))
            .build();

        loader.save(&original).expect("save should succeed");
        assert!(loader.exists());
        assert_eq!(loader.load_required().unwrap(), original);
    }

    #[test]
    fn test_write_default_creates_valid_config() {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let loader = ConfigLoader::with_base_dir(temp_dir.path().join("a/b"));

        loader.write_default().expect("write should succeed");
        assert_eq!(loader.load().unwrap(), Config::default());
    }
}

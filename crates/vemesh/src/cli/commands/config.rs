//! # Config Command
//!
//! ```text
//! vemesh config           # Print the effective configuration
//! vemesh config path      # Print the configuration file path
//! vemesh config init      # Write a default configuration file
//! ```

use std::path::PathBuf;

use vemesh_core::config::Config;
use vemesh_core::config_loader::ConfigLoader;
use vemesh_core::error::ConfigError;

use crate::cli::args::ConfigAction;
use crate::cli::commands::common::load_config;

// ============================================================================
// ConfigCommandError
// ============================================================================

/// Errors that can occur during config command execution.
#[derive(Debug, thiserror::Error)]
pub enum ConfigCommandError {
    /// Failed to load configuration.
    #[error("Failed to load configuration: {0}")]
    LoadError(#[source] ConfigError),

    /// `init` found an existing file.
    #[error("Configuration already exists at {}", .0.display())]
    AlreadyExists(PathBuf),

    /// Failed to write the default file.
    #[error("Failed to write configuration: {0}")]
    WriteError(#[source] ConfigError),

    /// Failed to render the configuration.
    #[error("Failed to render configuration: {0}")]
    SerializeError(String),
}

// ============================================================================
// ConfigCommand
// ============================================================================

/// The `vemesh config` command handler.
#[derive(Debug, Clone)]
pub struct ConfigCommand {
    /// Subcommand; `None` prints the configuration.
    pub action: Option<ConfigAction>,
    /// Explicit configuration file.
    pub config: Option<PathBuf>,
}

impl ConfigCommand {
    /// Create a new `ConfigCommand`.
    #[must_use]
    pub const fn new(action: Option<ConfigAction>, config: Option<PathBuf>) -> Self {
        Self { action, config }
    }

    fn loader(&self) -> Result<ConfigLoader, ConfigCommandError> {
        match &self.config {
            Some(path) => ConfigLoader::for_file(&path.to_string_lossy()),
            None => ConfigLoader::new(),
        }
        .map_err(ConfigCommandError::LoadError)
    }

    /// The text this command would print.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigCommandError`] if the configuration cannot be loaded,
    /// rendered, or written.
    pub fn execute(&self) -> Result<String, ConfigCommandError> {
        match self.action {
            None => self.show(),
            Some(ConfigAction::Path) => Ok(self.loader()?.config_path().display().to_string()),
            Some(ConfigAction::Init) => self.init(),
        }
    }

    /// Execute and print.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute).
    pub fn run(&self) -> Result<(), ConfigCommandError> {
        let output = self.execute()?;
        println!("{}", output.trim_end());
        Ok(())
    }

    fn show(&self) -> Result<String, ConfigCommandError> {
        let config =
            load_config(self.config.as_deref()).map_err(ConfigCommandError::LoadError)?;
        render(&config)
    }

    fn init(&self) -> Result<String, ConfigCommandError> {
        let loader = self.loader()?;
        let path = loader.config_path();
        if loader.exists() {
            return Err(ConfigCommandError::AlreadyExists(path));
        }
        loader
            .write_default()
            .map_err(ConfigCommandError::WriteError)?;
        tracing::info!(path = %path.display(), "wrote default configuration");
        Ok(format!("Wrote {}", path.display()))
    }
}

fn render(config: &Config) -> Result<String, ConfigCommandError> {
    toml::to_string_pretty(config).map_err(|e| ConfigCommandError::SerializeError(e.to_string()))
}

//! Shared plumbing for construction commands.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use vemesh_core::config::Config;
use vemesh_core::config_loader::ConfigLoader;
use vemesh_core::error::{ApiError, ConfigError, MeshError, MeshErrorCode};

use crate::cli::commands::exit_codes::{EXIT_ERROR, EXIT_INVALID_REQUEST};
use crate::construction::ConstructionService;
use crate::node::OfflineNode;

/// Errors shared by the construction commands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The request file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    ReadFailed {
        /// The file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The request file is not the expected JSON shape.
    #[error("Invalid request in {}: {source}", path.display())]
    InvalidJson {
        /// The file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration could not be loaded.
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    /// The construction step failed.
    #[error("{0}")]
    Mesh(#[from] MeshError),

    /// The response could not be rendered.
    #[error("Failed to render output: {0}")]
    Output(#[source] serde_json::Error),
}

impl CommandError {
    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidJson { .. } => EXIT_INVALID_REQUEST,
            Self::Mesh(e) => match MeshErrorCode::from(e) {
                MeshErrorCode::ParseFailed
                | MeshErrorCode::InvalidRequest
                | MeshErrorCode::SignatureFailed => EXIT_INVALID_REQUEST,
                _ => EXIT_ERROR,
            },
            _ => EXIT_ERROR,
        }
    }

    /// The Mesh `Error` object of a construction failure.
    #[must_use]
    pub fn api_error(&self) -> Option<ApiError> {
        match self {
            Self::Mesh(e) => Some(ApiError::from(e)),
            _ => None,
        }
    }

    /// What the CLI writes to stderr: the message, followed by the Mesh
    /// `Error` object as one line of JSON when there is one.
    #[must_use]
    pub fn report(&self) -> String {
        match self.api_error().and_then(|api| serde_json::to_string(&api).ok()) {
            Some(json) => format!("{self}\n{json}"),
            None => self.to_string(),
        }
    }
}

/// Load configuration from `path`, or from `~/.vemesh` when absent.
///
/// An explicit path must exist; the default location falls back to
/// built-in defaults.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be found, read, or validated.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => ConfigLoader::for_file(&path.to_string_lossy())?.load_required(),
        None => ConfigLoader::new()?.load(),
    }
}

/// A construction service with no node behind it.
///
/// # Errors
///
/// Returns [`CommandError::Config`] or [`CommandError::Mesh`] if the
/// configuration cannot be loaded or is invalid.
pub fn offline_service(
    config_path: Option<&Path>,
) -> Result<ConstructionService<OfflineNode>, CommandError> {
    let config = load_config(config_path)?;
    Ok(ConstructionService::new(config, Arc::new(OfflineNode))?)
}

/// Read a JSON request body.
///
/// # Errors
///
/// Returns [`CommandError::ReadFailed`] or [`CommandError::InvalidJson`].
pub fn read_request<T: DeserializeOwned>(path: &Path) -> Result<T, CommandError> {
    let contents = fs::read_to_string(path).map_err(|source| CommandError::ReadFailed {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| CommandError::InvalidJson {
        path: path.to_path_buf(),
        source,
    })
}

/// Print a response as pretty JSON.
///
/// # Errors
///
/// Returns [`CommandError::Output`] if serialization fails.
pub fn print_json<T: Serialize>(value: &T) -> Result<(), CommandError> {
    let output = serde_json::to_string_pretty(value).map_err(CommandError::Output)?;
    println!("{output}");
    Ok(())
}

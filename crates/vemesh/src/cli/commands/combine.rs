//! # Combine Command
//!
//! `vemesh combine <FILE>` attaches signatures to an unsigned transaction
//! and prints the signed bytes.

use std::path::PathBuf;

use crate::cli::commands::common::{offline_service, print_json, read_request, CommandError};
use crate::construction::{ConstructionCombineRequest, ConstructionCombineResponse};

/// The `vemesh combine` command handler.
#[derive(Debug, Clone)]
pub struct CombineCommand {
    /// JSON request file.
    pub file: PathBuf,
    /// Explicit configuration file.
    pub config: Option<PathBuf>,
}

impl CombineCommand {
    /// Create a new `CombineCommand`.
    #[must_use]
    pub const fn new(file: PathBuf, config: Option<PathBuf>) -> Self {
        Self { file, config }
    }

    /// Combine.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if the file is unreadable or a signature is
    /// missing, malformed, or from the wrong signer.
    pub fn execute(&self) -> Result<ConstructionCombineResponse, CommandError> {
        let request: ConstructionCombineRequest = read_request(&self.file)?;
        let service = offline_service(self.config.as_deref())?;
        Ok(service.combine(&request)?)
    }

    /// Combine and print.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute).
    pub fn run(&self) -> Result<(), CommandError> {
        print_json(&self.execute()?)
    }
}

//! # Preprocess Command
//!
//! `vemesh preprocess <FILE>` validates an intent and prints the options
//! and required public keys.

use std::path::PathBuf;

use crate::cli::commands::common::{offline_service, print_json, read_request, CommandError};
use crate::construction::{ConstructionPreprocessRequest, ConstructionPreprocessResponse};

/// The `vemesh preprocess` command handler.
#[derive(Debug, Clone)]
pub struct PreprocessCommand {
    /// JSON request file.
    pub file: PathBuf,
    /// Explicit configuration file.
    pub config: Option<PathBuf>,
}

impl PreprocessCommand {
    /// Create a new `PreprocessCommand`.
    #[must_use]
    pub const fn new(file: PathBuf, config: Option<PathBuf>) -> Self {
        Self { file, config }
    }

    /// Preprocess the request.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if the file is unreadable or the intent is
    /// invalid.
    pub fn execute(&self) -> Result<ConstructionPreprocessResponse, CommandError> {
        let request: ConstructionPreprocessRequest = read_request(&self.file)?;
        let service = offline_service(self.config.as_deref())?;
        Ok(service.preprocess(&request)?)
    }

    /// Preprocess and print.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute).
    pub fn run(&self) -> Result<(), CommandError> {
        print_json(&self.execute()?)
    }
}

//! # Payloads Command
//!
//! `vemesh payloads <FILE>` builds the unsigned transaction and prints it
//! with the payloads each signer must sign. The request must already carry
//! full construction metadata.

use std::path::PathBuf;

use crate::cli::commands::common::{offline_service, print_json, read_request, CommandError};
use crate::construction::{ConstructionPayloadsRequest, ConstructionPayloadsResponse};

/// The `vemesh payloads` command handler.
#[derive(Debug, Clone)]
pub struct PayloadsCommand {
    /// JSON request file.
    pub file: PathBuf,
    /// Explicit configuration file.
    pub config: Option<PathBuf>,
}

impl PayloadsCommand {
    /// Create a new `PayloadsCommand`.
    #[must_use]
    pub const fn new(file: PathBuf, config: Option<PathBuf>) -> Self {
        Self { file, config }
    }

    /// Build the payloads.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if the file is unreadable, the metadata is
    /// incomplete, or the keys do not match the signers.
    pub fn execute(&self) -> Result<ConstructionPayloadsResponse, CommandError> {
        let request: ConstructionPayloadsRequest = read_request(&self.file)?;
        let service = offline_service(self.config.as_deref())?;
        Ok(service.payloads(&request)?)
    }

    /// Build and print the payloads.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute).
    pub fn run(&self) -> Result<(), CommandError> {
        print_json(&self.execute()?)
    }
}

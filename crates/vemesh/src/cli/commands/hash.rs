//! # Hash Command
//!
//! `vemesh hash <HEX>` prints the id of a signed transaction.

use std::path::PathBuf;

use crate::cli::commands::common::{offline_service, print_json, CommandError};
use crate::construction::{ConstructionHashRequest, TransactionIdentifierResponse};

/// The `vemesh hash` command handler.
#[derive(Debug, Clone)]
pub struct HashCommand {
    /// Hex-encoded signed transaction.
    pub transaction: String,
    /// Explicit configuration file.
    pub config: Option<PathBuf>,
}

impl HashCommand {
    /// Create a new `HashCommand`.
    #[must_use]
    pub fn new(transaction: impl Into<String>, config: Option<PathBuf>) -> Self {
        Self {
            transaction: transaction.into(),
            config,
        }
    }

    /// Compute the id.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if the transaction is malformed or unsigned.
    pub fn execute(&self) -> Result<TransactionIdentifierResponse, CommandError> {
        let service = offline_service(self.config.as_deref())?;
        Ok(service.hash(&ConstructionHashRequest {
            signed_transaction: self.transaction.clone(),
        })?)
    }

    /// Compute and print the id.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute).
    pub fn run(&self) -> Result<(), CommandError> {
        print_json(&self.execute()?)
    }
}

//! # Parse Command
//!
//! `vemesh parse <HEX> [--signed]` prints the operations of a transaction.
//! Without `--signed` the input is the unsigned envelope produced by
//! `payloads`; with it, the native signed bytes produced by `combine`.
//!
//! Token currencies not listed in the configuration come out as `UNKNOWN`
//! since no node is consulted.

use std::path::PathBuf;

use crate::cli::commands::common::{offline_service, print_json, CommandError};
use crate::construction::{ConstructionParseRequest, ConstructionParseResponse};

/// The `vemesh parse` command handler.
#[derive(Debug, Clone)]
pub struct ParseCommand {
    /// Hex-encoded transaction.
    pub transaction: String,
    /// Wire form of `transaction`.
    pub signed: bool,
    /// Explicit configuration file.
    pub config: Option<PathBuf>,
}

impl ParseCommand {
    /// Create a new `ParseCommand`.
    #[must_use]
    pub fn new(transaction: impl Into<String>, signed: bool, config: Option<PathBuf>) -> Self {
        Self {
            transaction: transaction.into(),
            signed,
            config,
        }
    }

    /// Parse the transaction.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if the bytes are malformed or in the other
    /// wire form.
    pub fn execute(&self) -> Result<ConstructionParseResponse, CommandError> {
        let service = offline_service(self.config.as_deref())?;
        Ok(service.parse(&ConstructionParseRequest {
            signed: self.signed,
            transaction: self.transaction.clone(),
        })?)
    }

    /// Parse and print.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute).
    pub fn run(&self) -> Result<(), CommandError> {
        print_json(&self.execute()?)
    }
}

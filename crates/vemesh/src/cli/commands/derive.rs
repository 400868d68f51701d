//! # Derive Command
//!
//! `vemesh derive <PUBKEY>` prints the account of a compressed public key.
//!
//! ```json
//! { "account_identifier": { "address": "0x..." } }
//! ```

use std::path::PathBuf;

use vemesh_core::types::PublicKey;

use crate::cli::args::CurveArg;
use crate::cli::commands::common::{offline_service, print_json, CommandError};
use crate::construction::ConstructionDeriveResponse;

/// The `vemesh derive` command handler.
#[derive(Debug, Clone)]
pub struct DeriveCommand {
    /// Hex-encoded public key.
    pub public_key: String,
    /// Curve of the key.
    pub curve: CurveArg,
    /// Explicit configuration file.
    pub config: Option<PathBuf>,
}

impl DeriveCommand {
    /// Create a new `DeriveCommand`.
    #[must_use]
    pub fn new(public_key: impl Into<String>, curve: CurveArg, config: Option<PathBuf>) -> Self {
        Self {
            public_key: public_key.into(),
            curve,
            config,
        }
    }

    /// Derive the address.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] if configuration fails to load or the key is
    /// malformed or not secp256k1.
    pub fn execute(&self) -> Result<ConstructionDeriveResponse, CommandError> {
        let service = offline_service(self.config.as_deref())?;
        let key = PublicKey {
            hex_bytes: self.public_key.clone(),
            curve_type: self.curve.into(),
        };
        Ok(service.derive(&key)?)
    }

    /// Derive and print the address.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute).
    pub fn run(&self) -> Result<(), CommandError> {
        print_json(&self.execute()?)
    }
}

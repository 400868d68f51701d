//! # Sign Command
//!
//! `vemesh sign <PAYLOAD_HEX> --key <HEX>` signs one signing payload
//! offline and prints a Mesh `Signature` object ready for a combine request.
//!
//! ```json
//! {
//!   "signing_payload": { "account_identifier": { "address": "0x..." }, "hex_bytes": "...", "signature_type": "ecdsa_recovery" },
//!   "public_key": { "hex_bytes": "02...", "curve_type": "secp256k1" },
//!   "signature_type": "ecdsa_recovery",
//!   "hex_bytes": "..."
//! }
//! ```

use alloy_primitives::{hex, B256};
use vemesh_core::encoding::{decode_hex, format_address};
use vemesh_core::types::{
    AccountIdentifier, CurveType, PublicKey, Signature, SignatureType, SigningPayload,
};
use vemesh_crypto::{Secp256k1KeyPair, SecretKey};

use crate::cli::commands::common::print_json;
use crate::cli::commands::exit_codes::{EXIT_ERROR, EXIT_INVALID_REQUEST};

/// Errors that can occur when signing a payload.
#[derive(Debug, thiserror::Error)]
pub enum SignCommandError {
    /// The secret key is not 32 bytes of hex or not a valid scalar.
    #[error("Invalid secret key")]
    InvalidKey,

    /// The payload is not 32 bytes of hex.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Signing failed.
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// The signature could not be rendered.
    #[error("Failed to render output: {0}")]
    Output(String),
}

impl SignCommandError {
    /// Process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidKey | Self::InvalidPayload(_) => EXIT_INVALID_REQUEST,
            Self::SigningFailed(_) | Self::Output(_) => EXIT_ERROR,
        }
    }
}

/// The `vemesh sign` command handler.
#[derive(Clone)]
pub struct SignCommand {
    /// Hex-encoded 32-byte payload.
    pub payload: String,
    key: String,
}

impl std::fmt::Debug for SignCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignCommand")
            .field("payload", &self.payload)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl SignCommand {
    /// Create a new `SignCommand`.
    #[must_use]
    pub fn new(payload: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            key: key.into(),
        }
    }

    /// Sign the payload.
    ///
    /// # Errors
    ///
    /// Returns [`SignCommandError`] if the key or payload is malformed.
    pub fn execute(&self) -> Result<Signature, SignCommandError> {
        let secret = SecretKey::from_hex(&self.key).map_err(|_| SignCommandError::InvalidKey)?;
        let keypair =
            Secp256k1KeyPair::from_secret_key(&secret).map_err(|_| SignCommandError::InvalidKey)?;

        let bytes = decode_hex(&self.payload, "payload")
            .map_err(|e| SignCommandError::InvalidPayload(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(SignCommandError::InvalidPayload(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        let hash = B256::from_slice(&bytes);

        let signature = keypair
            .sign(&hash)
            .map_err(|e| SignCommandError::SigningFailed(e.to_string()))?;
        let public_key = keypair.public_key();

        Ok(Signature {
            signing_payload: SigningPayload {
                account_identifier: AccountIdentifier::new(format_address(
                    &public_key.address(),
                )),
                hex_bytes: hex::encode(hash),
                signature_type: Some(SignatureType::EcdsaRecovery),
            },
            public_key: PublicKey {
                hex_bytes: hex::encode(public_key.compressed()),
                curve_type: CurveType::Secp256k1,
            },
            signature_type: SignatureType::EcdsaRecovery,
            hex_bytes: hex::encode(signature.to_bytes()),
        })
    }

    /// Sign and print the signature.
    ///
    /// # Errors
    ///
    /// Same as [`execute`](Self::execute).
    pub fn run(&self) -> Result<(), SignCommandError> {
        let signature = self.execute()?;
        print_json(&signature).map_err(|e| SignCommandError::Output(e.to_string()))
    }
}

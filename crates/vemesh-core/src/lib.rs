//! # vemesh-core
//!
//! Mesh data model, error taxonomy, and configuration shared by every vemesh crate.
//!
//! ## Modules
//!
//! - [`types`] - Mesh objects ([`Operation`], [`Amount`], [`Currency`], signing material)
//! - [`error`] - Error enums, result aliases, and Mesh error codes
//! - [`encoding`] - Hex and address helpers
//! - [`config`] / [`config_loader`] - TOML configuration at `~/.vemesh/config.toml`
//!
//! ## Error Handling
//!
//! ```rust
//! use vemesh_core::error::{BuildError, MeshError, MeshErrorCode};
//!
//! let err: MeshError = BuildError::missing_metadata("blockRef").into();
//! let code = MeshErrorCode::from(&err);
//! assert_eq!(code, MeshErrorCode::InvalidRequest);
//! assert!(!code.retriable());
//! ```
//!
//! [`Operation`]: types::Operation
//! [`Amount`]: types::Amount
//! [`Currency`]: types::Currency

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod config_loader;
pub mod encoding;
pub mod error;
pub mod types;

pub use error::{
    ApiError, BuildError, ConfigError, MeshError, MeshErrorCode, NodeError, ParseError, Result,
    SignError,
};

pub use config::{Config, ConfigBuilder, NetworkConfig, TokenEntry};

pub use config_loader::{expand_path, load_config, ConfigLoader};

pub use types::{
    AccountIdentifier, Amount, Currency, CurveType, Metadata, Operation, OperationIdentifier,
    OperationStatus, OperationType, PublicKey, Signature, SignatureType, SignedValue,
    SigningPayload, TransactionIdentifier,
};

pub use alloy_primitives::{Address, B256, U256};

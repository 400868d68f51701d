//! Error types for the vemesh adapter.
//!
//! Errors are organized by domain:
//!
//! - [`ParseError`] - Malformed bytes, hex, addresses, amounts, or wire forms
//! - [`BuildError`] - Construction request problems (metadata fields, operations, signatures)
//! - [`SignError`] - Key material and signature recovery failures
//! - [`ConfigError`] - Configuration failures
//! - [`NodeError`] - Failures reported by (or while reaching) the chain node
//! - [`MeshError`] - Top-level error that wraps all of the above
//!
//! Every error maps onto a stable [`MeshErrorCode`], which is what the Mesh
//! `Error` object exposes to callers.
//!
//! # Example
//!
//! ```rust
//! use vemesh_core::error::{BuildError, MeshError, MeshErrorCode};
//!
//! let err: MeshError = BuildError::missing_metadata("blockRef").into();
//! assert_eq!(MeshErrorCode::from(&err), MeshErrorCode::InvalidRequest);
//! assert!(!MeshErrorCode::from(&err).retriable());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Top-level error type for the vemesh adapter.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    /// Input bytes or values could not be parsed.
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// A construction request was malformed or violated the protocol shape.
    #[error("Construction error: {0}")]
    Build(#[from] BuildError),

    /// Key or signature handling failed.
    #[error("Signing error: {0}")]
    Sign(#[from] SignError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The chain node failed or refused the call.
    #[error("Node error: {0}")]
    Node(#[from] NodeError),
}

/// Mesh error codes exposed in the `Error` object of every failed response.
///
/// The numeric values are part of the public API and never change meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum MeshErrorCode {
    /// Transaction bytes, hex, address, or amount could not be parsed.
    ParseFailed = 1,
    /// The construction request is missing fields or has the wrong shape.
    InvalidRequest = 2,
    /// A signature or public key is invalid.
    SignatureFailed = 3,
    /// Server-side configuration problem.
    InternalError = 4,
    /// The node could not be reached or returned an error.
    NodeUnavailable = 5,
    /// The node rejected the submitted transaction.
    TransactionRejected = 6,
    /// The endpoint requires a node connection but the adapter runs offline.
    OfflineMode = 7,
}

impl MeshErrorCode {
    /// All error codes, in ascending order.
    pub const ALL: [Self; 7] = [
        Self::ParseFailed,
        Self::InvalidRequest,
        Self::SignatureFailed,
        Self::InternalError,
        Self::NodeUnavailable,
        Self::TransactionRejected,
        Self::OfflineMode,
    ];

    /// Get the numeric error code value.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Get a human-readable message for this error code.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ParseFailed => "Unable to parse input",
            Self::InvalidRequest => "Invalid construction request",
            Self::SignatureFailed => "Invalid signature or public key",
            Self::InternalError => "Internal error",
            Self::NodeUnavailable => "Node unavailable",
            Self::TransactionRejected => "Transaction rejected by node",
            Self::OfflineMode => "Endpoint unavailable in offline mode",
        }
    }

    /// Whether retrying the same request may succeed.
    #[must_use]
    pub const fn retriable(self) -> bool {
        matches!(self, Self::NodeUnavailable)
    }
}

impl fmt::Display for MeshErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

impl From<&MeshError> for MeshErrorCode {
    fn from(error: &MeshError) -> Self {
        match error {
            MeshError::Parse(_) => Self::ParseFailed,
            MeshError::Build(
                BuildError::InvalidSignature { .. } | BuildError::InvalidPublicKey { .. },
            )
            | MeshError::Sign(_) => Self::SignatureFailed,
            MeshError::Build(_) => Self::InvalidRequest,
            MeshError::Config(_) => Self::InternalError,
            MeshError::Node(NodeError::Offline { .. }) => Self::OfflineMode,
            MeshError::Node(NodeError::Rejected { .. }) => Self::TransactionRejected,
            MeshError::Node(NodeError::Unavailable { .. }) => Self::NodeUnavailable,
        }
    }
}

impl From<MeshError> for MeshErrorCode {
    fn from(error: MeshError) -> Self {
        Self::from(&error)
    }
}

/// The Mesh `Error` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    /// Stable numeric code.
    pub code: i32,
    /// Message for the code (not the specific failure).
    pub message: String,
    /// Whether the request may succeed if retried.
    pub retriable: bool,
    /// Failure-specific details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<MeshErrorCode> for ApiError {
    fn from(code: MeshErrorCode) -> Self {
        Self {
            code: code.code(),
            message: code.message().to_string(),
            retriable: code.retriable(),
            details: None,
        }
    }
}

impl From<&MeshError> for ApiError {
    fn from(error: &MeshError) -> Self {
        let mut api = Self::from(MeshErrorCode::from(error));
        api.details = Some(serde_json::json!({ "error": error.to_string() }));
        api
    }
}

// ============================================================================
// ParseError
// ============================================================================

/// Errors that can occur while parsing transactions, clauses, or values.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The transaction type byte is not recognized.
    #[error("unknown transaction type: 0x{0:02x}")]
    UnknownTxType(u8),

    /// RLP decoding failed.
    #[error("RLP decoding failed: {context}")]
    InvalidRlp {
        /// Context about what was being decoded.
        context: String,
    },

    /// The transaction structure is malformed.
    #[error("malformed transaction: {context}")]
    MalformedTransaction {
        /// Context about what was malformed.
        context: String,
    },

    /// A clause carried a value that is not a valid unsigned integer.
    #[error("malformed clause {index}: {context}")]
    MalformedClause {
        /// Position of the clause within its transaction.
        index: usize,
        /// Context about what was malformed.
        context: String,
    },

    /// The address is not a 20-byte hex address.
    #[error("invalid address: {address}")]
    InvalidAddress {
        /// The malformed address string.
        address: String,
    },

    /// The amount is not a (signed) decimal integer.
    #[error("invalid amount: {value}")]
    InvalidAmount {
        /// The malformed amount string.
        value: String,
    },

    /// The input is not valid hex.
    #[error("invalid hex: {context}")]
    InvalidHex {
        /// Context about which input was being decoded.
        context: String,
    },

    /// Bytes decoded, but not in the wire form the caller declared.
    #[error("wire form mismatch: {context}")]
    WireFormMismatch {
        /// Context about the expected and found forms.
        context: String,
    },
}

impl ParseError {
    /// Create an `InvalidRlp` error with context.
    #[must_use]
    pub fn invalid_rlp(context: impl Into<String>) -> Self {
        Self::InvalidRlp {
            context: context.into(),
        }
    }

    /// Create a `MalformedTransaction` error with context.
    #[must_use]
    pub fn malformed_transaction(context: impl Into<String>) -> Self {
        Self::MalformedTransaction {
            context: context.into(),
        }
    }

    /// Create a `MalformedClause` error.
    #[must_use]
    pub fn malformed_clause(index: usize, context: impl Into<String>) -> Self {
        Self::MalformedClause {
            index,
            context: context.into(),
        }
    }

    /// Create an `InvalidAddress` error.
    #[must_use]
    pub fn invalid_address(address: impl Into<String>) -> Self {
        Self::InvalidAddress {
            address: address.into(),
        }
    }

    /// Create an `InvalidAmount` error.
    #[must_use]
    pub fn invalid_amount(value: impl Into<String>) -> Self {
        Self::InvalidAmount {
            value: value.into(),
        }
    }

    /// Create an `InvalidHex` error.
    #[must_use]
    pub fn invalid_hex(context: impl Into<String>) -> Self {
        Self::InvalidHex {
            context: context.into(),
        }
    }

    /// Create a `WireFormMismatch` error.
    #[must_use]
    pub fn wire_form_mismatch(context: impl Into<String>) -> Self {
        Self::WireFormMismatch {
            context: context.into(),
        }
    }
}

// ============================================================================
// BuildError
// ============================================================================

/// Errors raised while assembling a transaction from a construction request.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// A required metadata field is absent.
    #[error("missing metadata field: {field}")]
    MissingMetadata {
        /// The metadata key.
        field: String,
    },

    /// A metadata field is present but has the wrong type or an invalid value.
    #[error("invalid metadata field {field}: {context}")]
    InvalidMetadata {
        /// The metadata key.
        field: String,
        /// What was wrong with it.
        context: String,
    },

    /// An operation could not be turned into a clause.
    #[error("invalid operation {index}: {context}")]
    InvalidOperation {
        /// The operation's `operation_identifier.index`.
        index: u64,
        /// What was wrong with it.
        context: String,
    },

    /// The request as a whole is inconsistent.
    #[error("invalid request: {context}")]
    InvalidRequest {
        /// What was wrong with it.
        context: String,
    },

    /// Combine received the wrong number of signatures.
    #[error("expected {expected} signature(s), got {actual}")]
    SignatureCount {
        /// Number of signatures the transaction requires.
        expected: usize,
        /// Number of signatures supplied.
        actual: usize,
    },

    /// A supplied signature is malformed.
    #[error("invalid signature: {context}")]
    InvalidSignature {
        /// What was wrong with it.
        context: String,
    },

    /// A supplied public key is malformed or on an unsupported curve.
    #[error("invalid public key: {context}")]
    InvalidPublicKey {
        /// What was wrong with it.
        context: String,
    },
}

impl BuildError {
    /// Create a `MissingMetadata` error.
    #[must_use]
    pub fn missing_metadata(field: impl Into<String>) -> Self {
        Self::MissingMetadata {
            field: field.into(),
        }
    }

    /// Create an `InvalidMetadata` error.
    #[must_use]
    pub fn invalid_metadata(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::InvalidMetadata {
            field: field.into(),
            context: context.into(),
        }
    }

    /// Create an `InvalidOperation` error.
    #[must_use]
    pub fn invalid_operation(index: u64, context: impl Into<String>) -> Self {
        Self::InvalidOperation {
            index,
            context: context.into(),
        }
    }

    /// Create an `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(context: impl Into<String>) -> Self {
        Self::InvalidRequest {
            context: context.into(),
        }
    }

    /// Create an `InvalidSignature` error.
    #[must_use]
    pub fn invalid_signature(context: impl Into<String>) -> Self {
        Self::InvalidSignature {
            context: context.into(),
        }
    }

    /// Create an `InvalidPublicKey` error.
    #[must_use]
    pub fn invalid_public_key(context: impl Into<String>) -> Self {
        Self::InvalidPublicKey {
            context: context.into(),
        }
    }
}

// ============================================================================
// SignError
// ============================================================================

/// Errors that can occur during key handling and signature recovery.
#[derive(Debug, thiserror::Error)]
pub enum SignError {
    /// The key material is invalid or corrupted.
    #[error("invalid key material")]
    InvalidKey,

    /// The signing operation failed.
    #[error("signature failed: {context}")]
    SignatureFailed {
        /// Context about why signing failed.
        context: String,
    },

    /// The signer could not be recovered from a signature.
    #[error("signer recovery failed: {context}")]
    RecoveryFailed {
        /// Context about why recovery failed.
        context: String,
    },
}

impl SignError {
    /// Create a `SignatureFailed` error with context.
    #[must_use]
    pub fn signature_failed(context: impl Into<String>) -> Self {
        Self::SignatureFailed {
            context: context.into(),
        }
    }

    /// Create a `RecoveryFailed` error with context.
    #[must_use]
    pub fn recovery_failed(context: impl Into<String>) -> Self {
        Self::RecoveryFailed {
            context: context.into(),
        }
    }
}

// ============================================================================
// ConfigError
// ============================================================================

/// Errors that can occur during configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file was not found.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Failed to parse the configuration file.
    #[error("failed to parse configuration: {context}")]
    ParseFailed {
        /// Context about the parsing failure.
        context: String,
    },

    /// A configuration value is invalid.
    #[error("invalid value for {field}: {value}")]
    InvalidValue {
        /// The field name with the invalid value.
        field: String,
        /// The invalid value.
        value: String,
    },

    /// The home directory could not be determined.
    #[error("could not determine home directory")]
    NoHomeDirectory,

    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Create a `FileNotFound` error.
    #[must_use]
    pub fn file_not_found(path: impl Into<String>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a `ParseFailed` error.
    #[must_use]
    pub fn parse_failed(context: impl Into<String>) -> Self {
        Self::ParseFailed {
            context: context.into(),
        }
    }

    /// Create an `InvalidValue` error.
    #[must_use]
    pub fn invalid_value(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create a `NoHomeDirectory` error.
    #[must_use]
    pub const fn no_home_directory() -> Self {
        Self::NoHomeDirectory
    }
}

// ============================================================================
// NodeError
// ============================================================================

/// Errors reported by the node client.
///
/// The adapter never retries; retry policy belongs to the client.
#[derive(Debug, thiserror::Error)]
pub enum NodeError {
    /// The node could not be reached or answered with an error.
    #[error("{method}: {context}")]
    Unavailable {
        /// The node call that failed.
        method: String,
        /// What went wrong.
        context: String,
    },

    /// The node refused a submitted transaction.
    #[error("transaction rejected: {reason}")]
    Rejected {
        /// The node's reason.
        reason: String,
    },

    /// The adapter runs without a node.
    #[error("{method} requires a node connection")]
    Offline {
        /// The node call that was attempted.
        method: String,
    },
}

impl NodeError {
    /// Create an `Unavailable` error.
    #[must_use]
    pub fn unavailable(method: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Unavailable {
            method: method.into(),
            context: context.into(),
        }
    }

    /// Create a `Rejected` error.
    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::Rejected {
            reason: reason.into(),
        }
    }

    /// Create an `Offline` error.
    #[must_use]
    pub fn offline(method: impl Into<String>) -> Self {
        Self::Offline {
            method: method.into(),
        }
    }
}

// ============================================================================
// Result type aliases
// ============================================================================

/// A `Result` type alias using [`MeshError`] as the error type.
pub type Result<T> = std::result::Result<T, MeshError>;

/// A `Result` type alias for parsing operations.
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// A `Result` type alias for construction operations.
pub type BuildResult<T> = std::result::Result<T, BuildError>;

/// A `Result` type alias for signing operations.
pub type SignResult<T> = std::result::Result<T, SignError>;

/// A `Result` type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

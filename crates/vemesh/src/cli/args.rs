//! # CLI Argument Definitions
//!
//! - `vemesh derive <PUBKEY>` - Address of a compressed secp256k1 key
//! - `vemesh preprocess <FILE>` - Options and required keys for an intent
//! - `vemesh payloads <FILE>` - Unsigned transaction and signing payloads
//! - `vemesh parse <HEX> [--signed]` - Operations of a transaction
//! - `vemesh sign <PAYLOAD_HEX> --key <HEX>` - Sign one payload
//! - `vemesh combine <FILE>` - Attach signatures
//! - `vemesh hash <HEX>` - Transaction id
//! - `vemesh config [path|init]` - Show or create configuration
//!
//! Request files hold the Mesh JSON request body of the matching endpoint.
//!
//! ## Global Options
//!
//! - `-v, --verbose` - Increase verbosity level
//! - `-c, --config <PATH>` - Path to `config.toml`

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Offline Mesh construction for VeChainThor.
#[derive(Debug, Parser)]
#[command(name = "vemesh")]
#[command(author, version, about = "Mesh construction tooling for VeChainThor")]
#[command(propagate_version = true)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to the configuration file.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Command to run.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Derive the account address of a public key.
    Derive {
        /// Hex-encoded compressed secp256k1 public key.
        #[arg(value_name = "PUBKEY")]
        public_key: String,

        /// Curve of the key.
        #[arg(short = 'C', long, default_value = "secp256k1", value_name = "CURVE")]
        curve: CurveArg,
    },

    /// Validate an intent and list the keys it needs.
    Preprocess {
        /// JSON `/construction/preprocess` request.
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Build the unsigned transaction and its signing payloads.
    Payloads {
        /// JSON `/construction/payloads` request.
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Show the operations of a transaction.
    Parse {
        /// Hex-encoded transaction.
        #[arg(value_name = "HEX")]
        transaction: String,

        /// The transaction is signed (otherwise the unsigned envelope).
        #[arg(short, long)]
        signed: bool,
    },

    /// Sign one payload with a raw secret key.
    Sign(SignArgs),

    /// Attach signatures to an unsigned transaction.
    Combine {
        /// JSON `/construction/combine` request.
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Compute the id of a signed transaction.
    Hash {
        /// Hex-encoded signed transaction.
        #[arg(value_name = "HEX")]
        transaction: String,
    },

    /// Show configuration.
    Config {
        /// Config action.
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

/// Config subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum ConfigAction {
    /// Print the configuration file path.
    Path,
    /// Write a default configuration file if none exists.
    Init,
}

/// Arguments for `vemesh sign`.
#[derive(Clone, Args)]
pub struct SignArgs {
    /// Hex-encoded 32-byte payload.
    #[arg(value_name = "PAYLOAD_HEX")]
    pub payload: String,

    /// Hex-encoded secp256k1 secret key.
    #[arg(short, long, value_name = "HEX")]
    pub key: String,
}

impl std::fmt::Debug for SignArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignArgs")
            .field("payload", &self.payload)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Curves accepted on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum CurveArg {
    /// secp256k1
    #[default]
    Secp256k1,

    /// edwards25519 (rejected by `derive`)
    Edwards25519,
}

impl std::fmt::Display for CurveArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Secp256k1 => write!(f, "secp256k1"),
            Self::Edwards25519 => write!(f, "edwards25519"),
        }
    }
}

impl From<CurveArg> for vemesh_core::types::CurveType {
    fn from(curve: CurveArg) -> Self {
        match curve {
            CurveArg::Secp256k1 => Self::Secp256k1,
            CurveArg::Edwards25519 => Self::Edwards25519,
        }
    }
}

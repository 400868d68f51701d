//! # CLI Module
//!
//! Command-line interface for vemesh.
//!
//! - [`args`] - Argument parsing and CLI structure definitions
//! - [`commands`] - Command handler implementations
//!
//! ```no_run
//! use clap::Parser;
//! use vemesh::cli::{Cli, Commands};
//!
//! let cli = Cli::parse();
//! if let Commands::Hash { transaction } = cli.command {
//!     println!("hashing {transaction}");
//! }
//! ```

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, ConfigAction, CurveArg, SignArgs};

//! # vemesh
//!
//! Mesh (Rosetta) construction and read path for VeChainThor.
//!
//! ## Modules
//!
//! - [`construction`] - The construction endpoints as a service
//! - [`reader`] - Committed and pending transactions to operations
//! - [`node`] - The node queries the service depends on
//! - [`cli`] - Command-line interface definitions and handlers
//! - [`logging`] - Structured logging setup
//!
//! ## Usage
//!
//! ```no_run
//! use clap::Parser;
//! use vemesh::cli::{Cli, Commands};
//!
//! let cli = Cli::parse();
//! println!("Verbose level: {}", cli.verbose);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod cli;
pub mod construction;
pub mod logging;
pub mod node;
pub mod reader;

pub use construction::ConstructionService;
pub use logging::{
    init_logging, verbosity_to_level, LogConfig, LogError, LogFormat, LogGuard, LogLevel,
};
pub use node::{BestBlock, DynamicGasPrice, NodeClient, NodeResult, OfflineNode};
pub use reader::{transaction_operations, NodeReceipt, NodeTransaction};

#[cfg(any(test, feature = "mock"))]
pub use node::MockNode;

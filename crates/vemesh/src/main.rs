//! # vemesh
//!
//! Offline Mesh construction for VeChainThor.
//!
//! ## Usage
//!
//! ```bash
//! # Address of a public key
//! vemesh derive 02a6f5...
//!
//! # Keys an intent needs
//! vemesh preprocess preprocess.json
//!
//! # Unsigned transaction and what to sign
//! vemesh payloads payloads.json
//!
//! # Sign a payload, attach, and hash
//! vemesh sign 5f8a... --key 0x...
//! vemesh combine combine.json
//! vemesh hash 0xf8...
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use clap::Parser;
use vemesh::cli::commands::exit_codes::EXIT_ERROR;
use vemesh::cli::commands::{
    CombineCommand, CommandError, ConfigCommand, DeriveCommand, HashCommand, ParseCommand,
    PayloadsCommand, PreprocessCommand, SignCommand,
};
use vemesh::cli::{Cli, Commands};
use vemesh::logging::{init_logging, verbosity_to_level, LogConfig, LogError, LogFormat, LogGuard};

/// Set up logging based on verbosity level.
///
/// # Errors
///
/// Returns [`LogError`] if logging initialization fails.
fn setup_logging(verbose: u8) -> Result<LogGuard, LogError> {
    let config = LogConfig {
        level: verbosity_to_level(verbose),
        format: LogFormat::Pretty,
        file_path: None,
    };
    init_logging(&config)
}

/// Turn a command error into its report and exit code.
fn failure(e: &CommandError) -> (String, i32) {
    (e.report(), e.exit_code())
}

fn main() {
    let cli = Cli::parse();

    let _guard = match setup_logging(cli.verbose) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            std::process::exit(EXIT_ERROR);
        }
    };

    let config = cli.config;
    let result = match cli.command {
        Commands::Derive { public_key, curve } => DeriveCommand::new(public_key, curve, config)
            .run()
            .map_err(|e| failure(&e)),
        Commands::Preprocess { file } => PreprocessCommand::new(file, config)
            .run()
            .map_err(|e| failure(&e)),
        Commands::Payloads { file } => PayloadsCommand::new(file, config)
            .run()
            .map_err(|e| failure(&e)),
        Commands::Parse {
            transaction,
            signed,
        } => ParseCommand::new(transaction, signed, config)
            .run()
            .map_err(|e| failure(&e)),
        Commands::Sign(args) => SignCommand::new(args.payload, args.key)
            .run()
            .map_err(|e| (e.to_string(), e.exit_code())),
        Commands::Combine { file } => CombineCommand::new(file, config)
            .run()
            .map_err(|e| failure(&e)),
        Commands::Hash { transaction } => HashCommand::new(transaction, config)
            .run()
            .map_err(|e| failure(&e)),
        Commands::Config { action } => ConfigCommand::new(action, config)
            .run()
            .map_err(|e| (e.to_string(), EXIT_ERROR)),
    };

    if let Err((message, code)) = result {
        eprintln!("Error: {message}");
        std::process::exit(code);
    }
}

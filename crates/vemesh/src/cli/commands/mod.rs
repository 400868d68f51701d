//! # CLI Command Handlers
//!
//! - [`derive`] - Public key to address
//! - [`preprocess`] - Intent validation
//! - [`payloads`] - Unsigned transaction and signing payloads
//! - [`parse`] - Transaction to operations
//! - [`sign`] - Offline payload signing
//! - [`combine`] - Signature attachment
//! - [`hash`] - Transaction id
//! - [`config`] - Configuration display
//!
//! Construction commands run against an offline node: anything that needs
//! the chain (fresh metadata, submission) is refused. Each handler has an
//! `execute` method returning its response and a `run` method that prints
//! it as JSON.

pub mod combine;
pub mod common;
pub mod config;
pub mod derive;
pub mod exit_codes;
pub mod hash;
pub mod parse;
pub mod payloads;
pub mod preprocess;
pub mod sign;

pub use combine::CombineCommand;
pub use common::CommandError;
pub use config::{ConfigCommand, ConfigCommandError};
pub use derive::DeriveCommand;
pub use hash::HashCommand;
pub use parse::ParseCommand;
pub use payloads::PayloadsCommand;
pub use preprocess::PreprocessCommand;
pub use sign::{SignCommand, SignCommandError};

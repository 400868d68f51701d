//! # vemesh-chain
//!
//! VeChainThor transaction handling for the vemesh construction API.
//!
//! This crate maps between native clauses and Mesh operations, and between
//! native transaction bytes and the construction wire forms.
//!
//! ## Pipeline
//!
//! ```text
//! operations ──build_clauses──▶ clauses ──build_from_request──▶ Transaction
//!                                                                   │
//!                           create_signing_payloads ◀───────────────┤
//!                                                                   ▼
//!             MeshTransaction (unsigned envelope) ──combine──▶ signed bytes
//!
//! clauses + ParseContext ──ClauseParser::parse──▶ operations
//! ```
//!
//! ## Example
//!
//! ```rust
//! use alloy_primitives::{Address, U256};
//! use vemesh_chain::{Clause, ClauseParser, CurrencyRegistry, FeeCharge, ParseContext};
//!
//! let registry = CurrencyRegistry::new();
//! let parser = ClauseParser::new(&registry);
//!
//! let clauses = vec![Clause::transfer(Address::repeat_byte(0xaa), U256::from(10u64))];
//! let ctx = ParseContext::new(Address::repeat_byte(0x01)).with_fee(FeeCharge::raw(21_000));
//!
//! let ops = parser.parse(&clauses, &ctx).unwrap();
//! assert_eq!(ops.len(), 3);
//! ```
//!
//! ## Modules
//!
//! - [`abi`] - `transfer(address,uint256)` call data
//! - [`clause`] - Native and node clause shapes behind [`ClauseView`]
//! - [`transaction`] - Legacy and dynamic-fee native codec, hashes, signers
//! - [`envelope`] - Unsigned and signed construction wire forms
//! - [`parser`] - Clauses to operations and back
//! - [`builder`] - Metadata, signing payloads, combine
//! - [`currency`] - Currency registry
//! - [`gas`] - Intrinsic gas
//! - [`rlp`] - RLP helpers

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod abi;
pub mod builder;
pub mod clause;
pub mod currency;
pub mod envelope;
pub mod gas;
pub mod parser;
pub mod rlp;
pub mod transaction;

pub use builder::{
    address_from_public_key, build_from_request, combine, create_signing_payloads, origin_of,
    ConstructionMetadata, SigningPayloads,
};
pub use clause::{Clause, ClauseView, NodeClause};
pub use currency::{CurrencyRegistry, TokenInfo, TokenResolver};
pub use envelope::{MeshTransaction, WireForm};
pub use gas::intrinsic_gas;
pub use parser::{build_clauses, ClauseParser, FeeCharge, ParseContext};
pub use transaction::{FeeParams, Reserved, Transaction, TxType};

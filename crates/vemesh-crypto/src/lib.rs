//! # vemesh-crypto
//!
//! Cryptography for VeChainThor transactions.
//!
//! ## Modules
//!
//! - [`hash`] - blake2b-256 (signing hashes, ids) and keccak-256 (addresses, selectors)
//! - [`keys`] - Zeroizing [`SecretKey`]
//! - [`keypair`] - secp256k1 key pairs, recoverable signatures, address derivation
//!
//! ## Security
//!
//! - No unsafe code
//! - Secret keys are zeroized on drop and never printed
//! - Signatures are normalized to low-S

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod hash;
pub mod keypair;
pub mod keys;

pub use hash::{blake2b256, blake2b256_concat, keccak256};
pub use keypair::{
    recover_address, Secp256k1KeyPair, Secp256k1PublicKey, Secp256k1Signature, SIGNATURE_LEN,
};
pub use keys::{SecretKey, SECRET_KEY_LEN};

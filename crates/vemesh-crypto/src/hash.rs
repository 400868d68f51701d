//! Hash functions used by VeChainThor.
//!
//! Transaction signing hashes and ids use blake2b with a 256-bit output.
//! Addresses and ABI selectors use keccak-256.

use alloy_primitives::B256;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use sha3::Keccak256;

type Blake2b256 = Blake2b<U32>;

/// blake2b-256 of `data`.
#[must_use]
pub fn blake2b256(data: impl AsRef<[u8]>) -> B256 {
    B256::from_slice(&Blake2b256::digest(data.as_ref()))
}

/// blake2b-256 over the concatenation of `parts`, without allocating.
#[must_use]
pub fn blake2b256_concat(parts: &[&[u8]]) -> B256 {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    B256::from_slice(&hasher.finalize())
}

/// keccak-256 of `data`.
#[must_use]
pub fn keccak256(data: impl AsRef<[u8]>) -> B256 {
    B256::from_slice(&Keccak256::digest(data.as_ref()))
}

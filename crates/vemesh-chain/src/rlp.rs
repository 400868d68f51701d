//! RLP helpers for the VeChainThor transaction codec.
//!
//! Thin wrappers over `alloy-rlp` that map failures onto [`ParseError`] and
//! enforce the canonical forms Thor requires: integers without leading
//! zeros, and lists that consume their whole input.
//!
//! # Example
//!
//! ```
//! use vemesh_chain::rlp::{decode_list, decode_u64, ListEncoder};
//!
//! let encoded = ListEncoder::new().item(&1024u64).item(&b"abc"[..]).finish();
//! let items = decode_list(&encoded).unwrap();
//! assert_eq!(items.len(), 2);
//! assert_eq!(decode_u64(items[0]).unwrap(), 1024);
//! ```

use alloy_primitives::{Address, B256, U256};
use alloy_rlp::{Decodable, Encodable, Header, PayloadView};
use vemesh_core::error::ParseError;

/// Result type for RLP operations using [`ParseError`].
pub type RlpResult<T> = Result<T, ParseError>;

// ============================================================================
// Encoding
// ============================================================================

/// Accumulates encoded items and wraps them in a list header.
#[derive(Debug, Default, Clone)]
pub struct ListEncoder {
    payload: Vec<u8>,
}

impl ListEncoder {
    /// An empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an encodable item (integer, byte string, `U256`).
    #[must_use]
    pub fn item<T: Encodable + ?Sized>(mut self, value: &T) -> Self {
        value.encode(&mut self.payload);
        self
    }

    /// Append an item that is already RLP-encoded.
    #[must_use]
    pub fn raw(mut self, encoded: &[u8]) -> Self {
        self.payload.extend_from_slice(encoded);
        self
    }

    /// Emit the list header followed by the payload.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.payload.len() + 9);
        Header {
            list: true,
            payload_length: self.payload.len(),
        }
        .encode(&mut out);
        out.extend_from_slice(&self.payload);
        out
    }
}

/// Encode a byte string.
#[must_use]
pub fn encode_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len() + 9);
    bytes.encode(&mut out);
    out
}

// ============================================================================
// Decoding
// ============================================================================

/// Check if data starts with an RLP list prefix.
#[must_use]
pub fn is_list(data: &[u8]) -> bool {
    data.first().is_some_and(|&b| b >= 0xc0)
}

/// Decode a list into its raw encoded items.
///
/// # Errors
///
/// Returns [`ParseError::InvalidRlp`] if the input is not exactly one list.
pub fn decode_list(data: &[u8]) -> RlpResult<Vec<&[u8]>> {
    let mut buf = data;
    let payload = Header::decode_raw(&mut buf)
        .map_err(|e| ParseError::invalid_rlp(format!("failed to decode list: {e}")))?;

    if !buf.is_empty() {
        return Err(ParseError::invalid_rlp(format!(
            "{} trailing bytes after list",
            buf.len()
        )));
    }

    match payload {
        PayloadView::List(items) => Ok(items),
        PayloadView::String(_) => Err(ParseError::invalid_rlp("expected list, found string")),
    }
}

/// Decode a list and require exactly `expected` items.
///
/// # Errors
///
/// Returns [`ParseError::InvalidRlp`] on malformed input or a wrong item count.
pub fn decode_list_of<'a>(
    data: &'a [u8],
    expected: usize,
    what: &str,
) -> RlpResult<Vec<&'a [u8]>> {
    let items = decode_list(data)?;
    if items.len() != expected {
        return Err(ParseError::invalid_rlp(format!(
            "{what}: expected {expected} items, got {}",
            items.len()
        )));
    }
    Ok(items)
}

/// Decode a byte string.
///
/// # Errors
///
/// Returns [`ParseError::InvalidRlp`] if the item is a list or truncated.
pub fn decode_bytes(data: &[u8]) -> RlpResult<Vec<u8>> {
    let mut buf = data;
    let bytes = Header::decode_bytes(&mut buf, false)
        .map_err(|e| ParseError::invalid_rlp(format!("failed to decode bytes: {e}")))?;
    Ok(bytes.to_vec())
}

fn decode_uint<T: Decodable>(data: &[u8], what: &str) -> RlpResult<T> {
    let mut buf = data;
    T::decode(&mut buf).map_err(|e| ParseError::invalid_rlp(format!("failed to decode {what}: {e}")))
}

/// Decode a `u8`.
///
/// # Errors
///
/// Returns [`ParseError::InvalidRlp`] on non-canonical or oversized input.
pub fn decode_u8(data: &[u8]) -> RlpResult<u8> {
    decode_uint(data, "u8")
}

/// Decode a `u32`.
///
/// # Errors
///
/// Returns [`ParseError::InvalidRlp`] on non-canonical or oversized input.
pub fn decode_u32(data: &[u8]) -> RlpResult<u32> {
    decode_uint(data, "u32")
}

/// Decode a `u64`.
///
/// # Errors
///
/// Returns [`ParseError::InvalidRlp`] on non-canonical or oversized input.
pub fn decode_u64(data: &[u8]) -> RlpResult<u64> {
    decode_uint(data, "u64")
}

/// Decode a `U256`.
///
/// # Errors
///
/// Returns [`ParseError::InvalidRlp`] on non-canonical or oversized input.
pub fn decode_u256(data: &[u8]) -> RlpResult<U256> {
    decode_uint(data, "U256")
}

/// Decode an address that may be the empty string.
///
/// # Errors
///
/// Returns [`ParseError::InvalidRlp`] unless the item is empty or 20 bytes.
pub fn decode_optional_address(data: &[u8]) -> RlpResult<Option<Address>> {
    let bytes = decode_bytes(data)?;
    match bytes.len() {
        0 => Ok(None),
        20 => Ok(Some(Address::from_slice(&bytes))),
        n => Err(ParseError::invalid_rlp(format!(
            "address must be 0 or 20 bytes, got {n}"
        ))),
    }
}

/// Decode a 32-byte hash that may be the empty string.
///
/// # Errors
///
/// Returns [`ParseError::InvalidRlp`] unless the item is empty or 32 bytes.
pub fn decode_optional_b256(data: &[u8]) -> RlpResult<Option<B256>> {
    let bytes = decode_bytes(data)?;
    match bytes.len() {
        0 => Ok(None),
        32 => Ok(Some(B256::from_slice(&bytes))),
        n => Err(ParseError::invalid_rlp(format!(
            "hash must be 0 or 32 bytes, got {n}"
        ))),
    }
}

// ============================================================================
// Tests
// ============================================================================

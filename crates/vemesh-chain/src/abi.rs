//! Fungible-token `transfer(address,uint256)` call data.
//!
//! Detection is speculative: anything that is not exactly a canonical
//! transfer call returns `None`. Encoding from caller-supplied strings is
//! strict and fails on malformed input.
//!
//! | Bytes | Content |
//! |-------|---------|
//! | 0..4 | selector `0xa9059cbb` |
//! | 4..36 | recipient, left-padded to 32 bytes |
//! | 36..68 | amount, big-endian |
//!
//! # Example
//!
//! ```rust
//! use alloy_primitives::{Address, U256};
//! use vemesh_chain::abi::{decode_transfer, encode_transfer_call};
//!
//! let to = Address::repeat_byte(0xbb);
//! let data = encode_transfer_call(to, U256::from(5_000_000u64));
//!
//! let decoded = decode_transfer(&data).expect("transfer call");
//! assert_eq!(decoded.recipient, to);
//! assert_eq!(decoded.amount, U256::from(5_000_000u64));
//! ```

use alloy_primitives::{Address, U256};
use vemesh_core::encoding::parse_address;
use vemesh_core::error::{ParseError, ParseResult};
use vemesh_core::types::SignedValue;

/// Selector for `transfer(address,uint256)`.
///
/// Computed as: `keccak256("transfer(address,uint256)")[:4]`
pub const TRANSFER_SELECTOR: [u8; 4] = [0xa9, 0x05, 0x9c, 0xbb];

/// Length of a transfer call: 4 + 32 + 32.
pub const TRANSFER_CALL_LEN: usize = 68;

/// A decoded token transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTransfer {
    /// Token recipient.
    pub recipient: Address,
    /// Amount in the token's smallest unit.
    pub amount: U256,
}

/// Detect and decode a transfer call.
///
/// Returns `None` unless `data` is exactly 68 bytes, starts with the transfer
/// selector, and the address word has zero padding. Longer or non-canonical
/// payloads are left to be reported as plain contract calls, so that
/// re-encoding a detected transfer always reproduces the original bytes.
#[must_use]
pub fn decode_transfer(data: &[u8]) -> Option<TokenTransfer> {
    if data.len() != TRANSFER_CALL_LEN || data.get(0..4)? != TRANSFER_SELECTOR {
        return None;
    }

    let address_word = data.get(4..36)?;
    let (padding, address) = address_word.split_at(12);
    if padding.iter().any(|&b| b != 0) {
        return None;
    }

    let amount: [u8; 32] = data.get(36..68)?.try_into().ok()?;

    Some(TokenTransfer {
        recipient: Address::from_slice(address),
        amount: U256::from_be_bytes(amount),
    })
}

/// Encode a transfer call from typed values.
#[must_use]
pub fn encode_transfer_call(recipient: Address, amount: U256) -> Vec<u8> {
    let mut data = Vec::with_capacity(TRANSFER_CALL_LEN);
    data.extend_from_slice(&TRANSFER_SELECTOR);
    data.extend_from_slice(&[0u8; 12]);
    data.extend_from_slice(recipient.as_slice());
    data.extend_from_slice(&amount.to_be_bytes::<32>());
    data
}

/// Encode a transfer call from a recipient string and a decimal amount string.
///
/// # Errors
///
/// Returns [`ParseError::InvalidAddress`] for a malformed recipient and
/// [`ParseError::InvalidAmount`] for a malformed or negative amount.
pub fn encode_transfer(recipient: &str, amount: &str) -> ParseResult<Vec<u8>> {
    let recipient = parse_address(recipient)?;
    let value = SignedValue::parse(amount)?;
    if value.negative {
        return Err(ParseError::invalid_amount(amount));
    }
    Ok(encode_transfer_call(recipient, value.magnitude))
}

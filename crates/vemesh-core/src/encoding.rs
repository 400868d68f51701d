//! Hex and address helpers shared by every layer.
//!
//! Addresses are always rendered lowercase with a `0x` prefix. Hex input is
//! accepted with or without the prefix.

use alloy_primitives::{hex, Address, U256};

use crate::error::{ParseError, ParseResult};

/// Render bytes as `0x`-prefixed lowercase hex.
#[must_use]
pub fn encode_hex(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode optionally `0x`-prefixed hex.
///
/// # Errors
///
/// Returns [`ParseError::InvalidHex`] naming `context` on odd length or
/// non-hex characters.
pub fn decode_hex(input: &str, context: &str) -> ParseResult<Vec<u8>> {
    let stripped = input.strip_prefix("0x").unwrap_or(input);
    hex::decode(stripped).map_err(|e| ParseError::invalid_hex(format!("{context}: {e}")))
}

/// Parse a 20-byte address.
///
/// # Errors
///
/// Returns [`ParseError::InvalidAddress`] unless the input is exactly 40 hex
/// digits after an optional `0x` prefix.
pub fn parse_address(input: &str) -> ParseResult<Address> {
    let stripped = input.strip_prefix("0x").unwrap_or(input);
    if stripped.len() != 40 {
        return Err(ParseError::invalid_address(input));
    }
    let bytes = hex::decode(stripped).map_err(|_| ParseError::invalid_address(input))?;
    Ok(Address::from_slice(&bytes))
}

/// Parse a node quantity: `0x`-hex or decimal, with `0x` alone meaning zero.
///
/// Only bare digits are accepted; signs, whitespace, and separators are not.
///
/// # Errors
///
/// Returns [`ParseError::InvalidAmount`] for anything else, or on overflow.
pub fn parse_quantity(input: &str) -> ParseResult<U256> {
    let (digits, radix) = input
        .strip_prefix("0x")
        .map_or((input, 10), |hex| (hex, 16));
    if radix == 10 && digits.is_empty() {
        return Err(ParseError::invalid_amount(input));
    }
    if !digits.chars().all(|c| c.is_digit(radix)) {
        return Err(ParseError::invalid_amount(input));
    }
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    U256::from_str_radix(digits, u64::from(radix)).map_err(|_| ParseError::invalid_amount(input))
}

/// Render an address as lowercase `0x` hex.
#[must_use]
pub fn format_address(address: &Address) -> String {
    encode_hex(address.as_slice())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn test_parse_address_accepts_both_prefix_forms() {
        let a = parse_address("0x7567D83b7b8d80ADdCb281A71d54Fc7B3364ffed").unwrap();
        let b = parse_address("7567d83b7b8d80addcb281a71d54fc7b3364ffed").unwrap();
        assert_eq!(a, b);
        assert_eq!(
            format_address(&a),
            "0x7567d83b7b8d80addcb281a71d54fc7b3364ffed"
        );
    }

    #[test]
    fn test_parse_address_rejects_bad_input() {
        for bad in ["", "0x", "0x1234", "0xzz67d83b7b8d80addcb281a71d54fc7b3364ffed"] {
            assert!(matches!(
                parse_address(bad),
                Err(ParseError::InvalidAddress { .. })
            ));
        }
    }

    #[test]
    fn test_decode_hex_names_context() {
        let err = decode_hex("0xabc", "signed_transaction").unwrap_err();
        assert!(err.to_string().contains("signed_transaction"));
        assert_eq!(decode_hex("0x", "x").unwrap(), Vec::<u8>::new());
        assert_eq!(decode_hex("ff00", "x").unwrap(), vec![0xff, 0x00]);
    }

    #[test]
    fn test_parse_quantity_forms() {
        assert_eq!(parse_quantity("0x").unwrap(), U256::ZERO);
        assert_eq!(parse_quantity("0xff").unwrap(), U256::from(255u64));
        assert_eq!(parse_quantity("1000").unwrap(), U256::from(1000u64));
    }

    #[test]
    fn test_parse_quantity_rejects_signs() {
        for bad in ["", "0x+1", "0x-1", "+1", "-1", "0x 1", "0x1_0", "0xzz", "1e3"] {
            assert!(
                matches!(parse_quantity(bad), Err(ParseError::InvalidAmount { .. })),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_encode_hex() {
        assert_eq!(encode_hex([0xde, 0xad]), "0xdead");
        assert_eq!(encode_hex([]), "0x");
    }
}

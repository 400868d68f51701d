//! Transaction clauses.
//!
//! Clauses reach the parser in two shapes: the native [`Clause`] decoded from
//! transaction bytes, and [`NodeClause`], the JSON form the node reports for
//! committed and pending transactions. Both implement [`ClauseView`], so the
//! parser is written once.

use std::borrow::Cow;

use alloy_primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use vemesh_core::encoding::{
    decode_hex, encode_hex, format_address, parse_address, parse_quantity,
};
use vemesh_core::error::{ParseError, ParseResult};

use crate::rlp::{self, ListEncoder, RlpResult};

/// Read access to a clause, whatever its source.
pub trait ClauseView {
    /// Value transferred, in wei.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidAmount`] if the value is malformed.
    fn value(&self) -> ParseResult<U256>;

    /// Destination, or `None` for contract creation.
    fn destination(&self) -> Option<Address>;

    /// Call data; empty for plain transfers.
    fn raw_data(&self) -> Cow<'_, [u8]>;
}

// ============================================================================
// Native clause
// ============================================================================

/// One native unit of intent: `[to, value, data]`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Clause {
    /// Destination; `None` deploys a contract.
    pub to: Option<Address>,
    /// Value in wei.
    pub value: U256,
    /// Call data.
    pub data: Bytes,
}

impl Clause {
    /// A clause sending `value` to `to` with no data.
    #[must_use]
    pub fn transfer(to: Address, value: U256) -> Self {
        Self {
            to: Some(to),
            value,
            data: Bytes::new(),
        }
    }

    /// A zero-value call to `to`.
    #[must_use]
    pub fn call(to: Address, data: impl Into<Bytes>) -> Self {
        Self {
            to: Some(to),
            value: U256::ZERO,
            data: data.into(),
        }
    }

    /// RLP encoding.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let to: &[u8] = self.to.as_ref().map_or(&[][..], |a| a.as_slice());
        ListEncoder::new()
            .item(to)
            .item(&self.value)
            .item(self.data.as_ref())
            .finish()
    }

    /// Decode one RLP-encoded clause.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidRlp`] on malformed input.
    pub fn decode(data: &[u8]) -> RlpResult<Self> {
        let items = rlp::decode_list_of(data, 3, "clause")?;
        let [to, value, payload] = items.as_slice() else {
            return Err(ParseError::invalid_rlp("clause: expected 3 items"));
        };

        Ok(Self {
            to: rlp::decode_optional_address(to)?,
            value: rlp::decode_u256(value)?,
            data: rlp::decode_bytes(payload)?.into(),
        })
    }
}

impl ClauseView for Clause {
    fn value(&self) -> ParseResult<U256> {
        Ok(self.value)
    }

    fn destination(&self) -> Option<Address> {
        self.to
    }

    fn raw_data(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.data.as_ref())
    }
}

impl From<&Clause> for NodeClause {
    fn from(clause: &Clause) -> Self {
        Self {
            to: clause.to.as_ref().map(format_address),
            value: format!("0x{:x}", clause.value),
            data: encode_hex(&clause.data),
        }
    }
}

// ============================================================================
// Node clause
// ============================================================================

/// A clause as reported by the node's REST API.
///
/// `value` is `0x`-hex on the node but decimal strings are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeClause {
    /// Destination address, `null` for contract creation.
    pub to: Option<String>,
    /// Value in wei.
    pub value: String,
    /// `0x`-hex call data.
    #[serde(default)]
    pub data: String,
}

impl ClauseView for NodeClause {
    fn value(&self) -> ParseResult<U256> {
        parse_quantity(self.value.trim()).map_err(|_| ParseError::invalid_amount(&self.value))
    }

    /// Malformed addresses from the node are treated as absent.
    fn destination(&self) -> Option<Address> {
        self.to.as_deref().and_then(|to| parse_address(to).ok())
    }

    /// Malformed hex from the node is treated as empty data.
    fn raw_data(&self) -> Cow<'_, [u8]> {
        if self.data.is_empty() {
            return Cow::Borrowed(&[]);
        }
        Cow::Owned(decode_hex(&self.data, "clause data").unwrap_or_default())
    }
}

/// Encode clauses as an RLP list.
#[must_use]
pub fn encode_clauses(clauses: &[Clause]) -> Vec<u8> {
    clauses
        .iter()
        .fold(ListEncoder::new(), |list, clause| list.raw(&clause.encode()))
        .finish()
}

/// Decode an RLP list of clauses.
///
/// # Errors
///
/// Returns [`ParseError::MalformedClause`] naming the first bad clause.
pub fn decode_clauses(data: &[u8]) -> RlpResult<Vec<Clause>> {
    rlp::decode_list(data)?
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            Clause::decode(item).map_err(|e| ParseError::malformed_clause(i, e.to_string()))
        })
        .collect()
}

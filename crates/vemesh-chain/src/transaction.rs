//! VeChainThor native transactions.
//!
//! Two kinds exist:
//!
//! - **Legacy**: a bare RLP list priced with a one-byte `gasPriceCoef`.
//! - **Dynamic fee**: the type byte `0x51` followed by an RLP list priced with
//!   `maxPriorityFeePerGas` and `maxFeePerGas`.
//!
//! Both always serialize a trailing signature item, which is the empty
//! string while the transaction is unsigned.
//!
//! Fee delegation is flagged by bit 1 of `reserved.features`; a delegated
//! transaction carries 130 signature bytes (origin, then delegator).

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_rlp::Encodable;
use vemesh_core::error::{ParseError, ParseResult, SignError};
use vemesh_crypto::{blake2b256_concat, recover_address, SIGNATURE_LEN};

use crate::clause::{decode_clauses, encode_clauses, Clause};
use crate::rlp::{self, ListEncoder, RlpResult};

/// Type byte of dynamic-fee transactions.
pub const DYNAMIC_FEE_TX_TYPE: u8 = 0x51;

/// `reserved.features` bit marking fee delegation.
pub const DELEGATION_FEATURE: u32 = 1;

/// RLP encoding of the empty string.
const EMPTY_STRING: u8 = 0x80;

// ============================================================================
// Transaction kind and pricing
// ============================================================================

/// Transaction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TxType {
    /// Untyped, priced by `gasPriceCoef`.
    Legacy,
    /// Type `0x51`, priced by base fee plus tip.
    DynamicFee,
}

impl TxType {
    /// Name used in construction metadata.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::DynamicFee => "dynamic",
        }
    }

    /// Parse a construction metadata name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "legacy" => Some(Self::Legacy),
            "dynamic" => Some(Self::DynamicFee),
            _ => None,
        }
    }

    /// The serialized prefix: empty for legacy.
    #[must_use]
    pub const fn prefix(self) -> &'static [u8] {
        match self {
            Self::Legacy => &[],
            Self::DynamicFee => &[DYNAMIC_FEE_TX_TYPE],
        }
    }
}

impl std::fmt::Display for TxType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pricing fields, which also determine the transaction kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeeParams {
    /// Legacy pricing.
    Legacy {
        /// 0 to 255; price is `base × (1 + coef / 255)`.
        gas_price_coef: u8,
    },
    /// Dynamic-fee pricing.
    DynamicFee {
        /// Tip per gas.
        max_priority_fee_per_gas: U256,
        /// Cap per gas, tip included.
        max_fee_per_gas: U256,
    },
}

impl FeeParams {
    /// The kind these fields belong to.
    #[must_use]
    pub const fn tx_type(&self) -> TxType {
        match self {
            Self::Legacy { .. } => TxType::Legacy,
            Self::DynamicFee { .. } => TxType::DynamicFee,
        }
    }
}

// ============================================================================
// Reserved
// ============================================================================

/// The `reserved` field: feature bits plus raw items kept for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reserved {
    /// Feature bits.
    pub features: u32,
    /// Unknown trailing items, each already RLP-encoded.
    pub unused: Vec<Bytes>,
}

impl Reserved {
    /// Reserved field with the delegation bit set.
    #[must_use]
    pub const fn delegated() -> Self {
        Self {
            features: DELEGATION_FEATURE,
            unused: Vec::new(),
        }
    }

    /// Encodes `[features, unused...]` with trailing empty items trimmed,
    /// so the zero value is `[]`.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut features_item = Vec::with_capacity(5);
        self.features.encode(&mut features_item);

        let mut items: Vec<Vec<u8>> = std::iter::once(features_item)
            .chain(self.unused.iter().map(|b| b.to_vec()))
            .collect();
        while items.last().is_some_and(|item| item.as_slice() == [EMPTY_STRING]) {
            items.pop();
        }

        items
            .iter()
            .fold(ListEncoder::new(), |list, item| list.raw(item))
            .finish()
    }

    /// Decode the reserved list.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidRlp`] if the list is malformed or not trimmed.
    pub fn decode(data: &[u8]) -> RlpResult<Self> {
        let items = rlp::decode_list(data)?;
        let Some((first, rest)) = items.split_first() else {
            return Ok(Self::default());
        };

        if items.last().is_some_and(|item| *item == [EMPTY_STRING]) {
            return Err(ParseError::invalid_rlp("reserved fields not trimmed"));
        }

        Ok(Self {
            features: rlp::decode_u32(first)?,
            unused: rest.iter().map(|item| Bytes::copy_from_slice(item)).collect(),
        })
    }

    /// Whether the delegation bit is set.
    #[must_use]
    pub const fn is_delegated(&self) -> bool {
        self.features & DELEGATION_FEATURE != 0
    }
}

// ============================================================================
// Transaction
// ============================================================================

/// A native transaction, signed or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Last byte of the genesis block id.
    pub chain_tag: u8,
    /// First 8 bytes of the reference block id.
    pub block_ref: u64,
    /// Blocks after `block_ref` the transaction stays valid.
    pub expiration: u32,
    /// Clauses, executed in order.
    pub clauses: Vec<Clause>,
    /// Pricing.
    pub fee: FeeParams,
    /// Gas limit.
    pub gas: u64,
    /// Transaction that must be executed first.
    pub depends_on: Option<B256>,
    /// Arbitrary nonce.
    pub nonce: u64,
    /// Features and reserved items.
    pub reserved: Reserved,
    /// Empty while unsigned; 65 or 130 bytes once signed.
    pub signature: Bytes,
}

impl Transaction {
    /// The transaction kind.
    #[must_use]
    pub const fn tx_type(&self) -> TxType {
        self.fee.tx_type()
    }

    /// Whether a fee delegator pays gas.
    #[must_use]
    pub const fn is_delegated(&self) -> bool {
        self.reserved.is_delegated()
    }

    /// Whether a signature is attached.
    #[must_use]
    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }

    /// Number of signatures the transaction needs.
    #[must_use]
    pub const fn required_signatures(&self) -> usize {
        if self.is_delegated() {
            2
        } else {
            1
        }
    }

    /// Returns the transaction with `signature` attached.
    #[must_use]
    pub fn with_signature(mut self, signature: impl Into<Bytes>) -> Self {
        self.signature = signature.into();
        self
    }

    fn fields(&self) -> ListEncoder {
        let depends_on: &[u8] = self.depends_on.as_ref().map_or(&[][..], |h| h.as_slice());

        let list = ListEncoder::new()
            .item(&self.chain_tag)
            .item(&self.block_ref)
            .item(&self.expiration)
            .raw(&encode_clauses(&self.clauses));

        let list = match &self.fee {
            FeeParams::Legacy { gas_price_coef } => list.item(gas_price_coef),
            FeeParams::DynamicFee {
                max_priority_fee_per_gas,
                max_fee_per_gas,
            } => list.item(max_priority_fee_per_gas).item(max_fee_per_gas),
        };

        list.item(&self.gas)
            .item(depends_on)
            .item(&self.nonce)
            .raw(&self.reserved.encode())
    }

    /// blake2b-256 over the type prefix and every field except the signature.
    #[must_use]
    pub fn signing_hash(&self) -> B256 {
        let body = self.fields().finish();
        blake2b256_concat(&[self.tx_type().prefix(), &body])
    }

    /// Hash the delegator signs: binds the signing hash to the origin.
    #[must_use]
    pub fn delegator_signing_hash(&self, origin: &Address) -> B256 {
        blake2b256_concat(&[self.signing_hash().as_slice(), origin.as_slice()])
    }

    /// Native serialization, including the (possibly empty) signature.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let body = self.fields().item(self.signature.as_ref()).finish();
        let prefix = self.tx_type().prefix();

        let mut out = Vec::with_capacity(prefix.len() + body.len());
        out.extend_from_slice(prefix);
        out.extend_from_slice(&body);
        out
    }

    /// Decode a native transaction of either kind.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnknownTxType`] for an unrecognized prefix,
    /// [`ParseError::MalformedTransaction`] for empty input, and
    /// [`ParseError::InvalidRlp`] / [`ParseError::MalformedClause`] for bad fields.
    pub fn decode(data: &[u8]) -> ParseResult<Self> {
        let first = *data
            .first()
            .ok_or_else(|| ParseError::malformed_transaction("empty transaction data"))?;

        if rlp::is_list(data) {
            Self::decode_legacy(data)
        } else if first == DYNAMIC_FEE_TX_TYPE {
            Self::decode_dynamic(data.get(1..).unwrap_or_default())
        } else {
            Err(ParseError::UnknownTxType(first))
        }
    }

    fn decode_legacy(data: &[u8]) -> ParseResult<Self> {
        let items = rlp::decode_list_of(data, 10, "legacy transaction")?;
        let [chain_tag, block_ref, expiration, clauses, coef, gas, depends_on, nonce, reserved, signature] =
            items.as_slice()
        else {
            return Err(ParseError::invalid_rlp("legacy transaction: expected 10 items"));
        };

        Ok(Self {
            chain_tag: rlp::decode_u8(chain_tag)?,
            block_ref: rlp::decode_u64(block_ref)?,
            expiration: rlp::decode_u32(expiration)?,
            clauses: decode_clauses(clauses)?,
            fee: FeeParams::Legacy {
                gas_price_coef: rlp::decode_u8(coef)?,
            },
            gas: rlp::decode_u64(gas)?,
            depends_on: rlp::decode_optional_b256(depends_on)?,
            nonce: rlp::decode_u64(nonce)?,
            reserved: Reserved::decode(reserved)?,
            signature: rlp::decode_bytes(signature)?.into(),
        })
    }

    fn decode_dynamic(data: &[u8]) -> ParseResult<Self> {
        let items = rlp::decode_list_of(data, 11, "dynamic fee transaction")?;
        let [chain_tag, block_ref, expiration, clauses, max_priority, max_fee, gas, depends_on, nonce, reserved, signature] =
            items.as_slice()
        else {
            return Err(ParseError::invalid_rlp(
                "dynamic fee transaction: expected 11 items",
            ));
        };

        Ok(Self {
            chain_tag: rlp::decode_u8(chain_tag)?,
            block_ref: rlp::decode_u64(block_ref)?,
            expiration: rlp::decode_u32(expiration)?,
            clauses: decode_clauses(clauses)?,
            fee: FeeParams::DynamicFee {
                max_priority_fee_per_gas: rlp::decode_u256(max_priority)?,
                max_fee_per_gas: rlp::decode_u256(max_fee)?,
            },
            gas: rlp::decode_u64(gas)?,
            depends_on: rlp::decode_optional_b256(depends_on)?,
            nonce: rlp::decode_u64(nonce)?,
            reserved: Reserved::decode(reserved)?,
            signature: rlp::decode_bytes(signature)?.into(),
        })
    }

    fn check_signature_len(&self) -> Result<(), SignError> {
        let expected = self.required_signatures() * SIGNATURE_LEN;
        if self.signature.len() == expected {
            Ok(())
        } else {
            Err(SignError::recovery_failed(format!(
                "expected {expected} signature bytes, got {}",
                self.signature.len()
            )))
        }
    }

    /// Recover the sender.
    ///
    /// # Errors
    ///
    /// Returns [`SignError::RecoveryFailed`] if the transaction is unsigned,
    /// the signature length disagrees with the delegation flag, or recovery fails.
    pub fn origin(&self) -> Result<Address, SignError> {
        self.check_signature_len()?;
        let signature = self.signature.get(..SIGNATURE_LEN).unwrap_or_default();
        recover_address(&self.signing_hash(), signature)
    }

    /// Recover the fee delegator, if the transaction is delegated.
    ///
    /// # Errors
    ///
    /// Same as [`origin`](Self::origin).
    pub fn delegator(&self) -> Result<Option<Address>, SignError> {
        if !self.is_delegated() {
            return Ok(None);
        }
        let origin = self.origin()?;
        let signature = self.signature.get(SIGNATURE_LEN..).unwrap_or_default();
        recover_address(&self.delegator_signing_hash(&origin), signature).map(Some)
    }

    /// Transaction id: blake2b-256 over the signing hash and the origin.
    ///
    /// # Errors
    ///
    /// Same as [`origin`](Self::origin).
    pub fn id(&self) -> Result<B256, SignError> {
        let origin = self.origin()?;
        Ok(blake2b256_concat(&[
            self.signing_hash().as_slice(),
            origin.as_slice(),
        ]))
    }
}

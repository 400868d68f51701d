//! Construction wire forms.
//!
//! A native transaction cannot say who will sign it until it is signed. The
//! unsigned form therefore wraps it with the declared signers:
//!
//! ```text
//! unsigned = RLP([native_tx_bytes, origin, delegator])
//! signed   = native_tx_bytes
//! ```
//!
//! `delegator` is the empty string when the transaction is not delegated.
//! The caller always says which form it holds; bytes are never sniffed.

use alloy_primitives::Address;
use vemesh_core::encoding::encode_hex;
use vemesh_core::error::{ParseError, ParseResult};

use crate::rlp::{self, ListEncoder};
use crate::transaction::Transaction;

/// Which construction wire form a byte string is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireForm {
    /// `[native, origin, delegator]` envelope around an unsigned transaction.
    Unsigned,
    /// Bare native signed transaction.
    Signed,
}

impl WireForm {
    /// Select the form from a Mesh `signed` flag.
    #[must_use]
    pub const fn from_signed(signed: bool) -> Self {
        if signed {
            Self::Signed
        } else {
            Self::Unsigned
        }
    }
}

/// A native transaction with its declared signers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshTransaction {
    /// The native transaction.
    pub tx: Transaction,
    /// Declared sender, 20 bytes (or empty if unknown).
    pub origin: Vec<u8>,
    /// Declared fee payer, 20 bytes or empty.
    pub delegator: Vec<u8>,
}

impl MeshTransaction {
    /// Wrap `tx` with typed signer addresses.
    #[must_use]
    pub fn new(tx: Transaction, origin: Address, delegator: Option<Address>) -> Self {
        Self {
            tx,
            origin: origin.to_vec(),
            delegator: delegator.map(|d| d.to_vec()).unwrap_or_default(),
        }
    }

    /// The declared origin, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidAddress`] unless the field is empty or 20 bytes.
    pub fn origin_address(&self) -> ParseResult<Option<Address>> {
        optional_address(&self.origin)
    }

    /// The declared delegator, if any.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidAddress`] unless the field is empty or 20 bytes.
    pub fn delegator_address(&self) -> ParseResult<Option<Address>> {
        optional_address(&self.delegator)
    }

    /// Serialize in the given form.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::WireFormMismatch`] if the transaction's signature
    /// state does not match `form`.
    pub fn encode(&self, form: WireForm) -> ParseResult<Vec<u8>> {
        match form {
            WireForm::Unsigned => self.encode_unsigned(),
            WireForm::Signed => self.encode_signed(),
        }
    }

    /// Serialize the unsigned envelope.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::WireFormMismatch`] if the transaction is signed.
    pub fn encode_unsigned(&self) -> ParseResult<Vec<u8>> {
        if self.tx.is_signed() {
            return Err(ParseError::wire_form_mismatch(
                "signed transaction in unsigned envelope",
            ));
        }

        Ok(ListEncoder::new()
            .item(self.tx.encode().as_slice())
            .item(self.origin.as_slice())
            .item(self.delegator.as_slice())
            .finish())
    }

    /// Serialize the bare signed transaction.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::WireFormMismatch`] if the transaction is unsigned.
    pub fn encode_signed(&self) -> ParseResult<Vec<u8>> {
        if !self.tx.is_signed() {
            return Err(ParseError::wire_form_mismatch(
                "unsigned transaction has no signed form",
            ));
        }
        Ok(self.tx.encode())
    }

    /// Decode bytes in the given form.
    ///
    /// For the signed form, `origin` and `delegator` are recovered from the
    /// signature.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::WireFormMismatch`] if the bytes are in the other
    /// form, and a codec error if they are malformed.
    pub fn decode(data: &[u8], form: WireForm) -> ParseResult<Self> {
        match form {
            WireForm::Unsigned => Self::decode_unsigned(data),
            WireForm::Signed => Self::decode_signed(data),
        }
    }

    fn decode_unsigned(data: &[u8]) -> ParseResult<Self> {
        let items = rlp::decode_list_of(data, 3, "unsigned envelope")
            .map_err(|e| ParseError::wire_form_mismatch(e.to_string()))?;
        let [native, origin, delegator] = items.as_slice() else {
            return Err(ParseError::wire_form_mismatch(
                "unsigned envelope: expected 3 items",
            ));
        };

        let tx = Transaction::decode(&rlp::decode_bytes(native)?)?;
        if tx.is_signed() {
            return Err(ParseError::wire_form_mismatch(
                "unsigned envelope carries a signed transaction",
            ));
        }

        let envelope = Self {
            tx,
            origin: rlp::decode_bytes(origin)?,
            delegator: rlp::decode_bytes(delegator)?,
        };
        envelope.origin_address()?;
        envelope.delegator_address()?;
        Ok(envelope)
    }

    fn decode_signed(data: &[u8]) -> ParseResult<Self> {
        let tx = Transaction::decode(data).map_err(|e| match e {
            ParseError::InvalidRlp { context } => ParseError::wire_form_mismatch(format!(
                "not a signed transaction: {context}"
            )),
            other => other,
        })?;
        if !tx.is_signed() {
            return Err(ParseError::wire_form_mismatch(
                "transaction is not signed",
            ));
        }

        let origin = tx
            .origin()
            .map_err(|e| ParseError::malformed_transaction(e.to_string()))?;
        let delegator = tx
            .delegator()
            .map_err(|e| ParseError::malformed_transaction(e.to_string()))?;

        Ok(Self::new(tx, origin, delegator))
    }
}

fn optional_address(bytes: &[u8]) -> ParseResult<Option<Address>> {
    match bytes.len() {
        0 => Ok(None),
        20 => Ok(Some(Address::from_slice(bytes))),
        _ => Err(ParseError::invalid_address(encode_hex(bytes))),
    }
}

//! Mesh data model.
//!
//! These types mirror the JSON objects of the Mesh (Rosetta) API.
//! Field names are fixed by the Mesh API and are serialized verbatim.
//!
//! - [`Operation`] - One economic effect of a transaction
//! - [`Amount`] / [`Currency`] - Signed decimal value in a currency
//! - [`AccountIdentifier`] - A chain address
//! - [`SigningPayload`] / [`Signature`] / [`PublicKey`] - Construction signing material
//!
//! # Examples
//!
//! ```
//! use vemesh_core::types::{AccountIdentifier, Amount, Currency, Operation, OperationType};
//!
//! let vet = Currency::new("VET", 18);
//! let op = Operation::new(0, OperationType::Transfer)
//!     .with_account(AccountIdentifier::new("0x7567d83b7b8d80addcb281a71d54fc7b3364ffed"))
//!     .with_amount(Amount::new("-1000", vet));
//!
//! let json = serde_json::to_value(&op).unwrap();
//! assert_eq!(json["type"], "Transfer");
//! assert_eq!(json["operation_identifier"]["index"], 0);
//! ```

use std::fmt;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::error::{ParseError, ParseResult};

/// Free-form JSON metadata attached to operations and requests.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Metadata keys shared between the parser, the builder, and the construction flow.
pub mod keys {
    /// Operation metadata: index of the clause the operation came from.
    pub const CLAUSE_INDEX: &str = "clauseIndex";
    /// Operation metadata: clause destination.
    pub const TO: &str = "to";
    /// Operation metadata: raw clause data.
    pub const DATA: &str = "data";
    /// Operation metadata: gas the fee was computed from.
    pub const GAS: &str = "gas";
    /// Operation metadata: fee payer of a delegated transaction.
    pub const DELEGATOR_ADDRESS: &str = "delegatorAddress";

    /// Construction metadata: `"legacy"` or `"dynamic"`.
    pub const TRANSACTION_TYPE: &str = "transactionType";
    /// Construction metadata: first 8 bytes of a recent block id.
    pub const BLOCK_REF: &str = "blockRef";
    /// Construction metadata: last byte of the genesis block id.
    pub const CHAIN_TAG: &str = "chainTag";
    /// Construction metadata: gas limit.
    pub const GAS_LIMIT: &str = "gas";
    /// Construction metadata: transaction nonce.
    pub const NONCE: &str = "nonce";
    /// Construction metadata: legacy gas price coefficient.
    pub const GAS_PRICE_COEF: &str = "gasPriceCoef";
    /// Construction metadata: dynamic-fee cap.
    pub const MAX_FEE_PER_GAS: &str = "maxFeePerGas";
    /// Construction metadata: dynamic-fee tip.
    pub const MAX_PRIORITY_FEE_PER_GAS: &str = "maxPriorityFeePerGas";
    /// Construction metadata: fee delegator account.
    pub const FEE_DELEGATOR_ACCOUNT: &str = "fee_delegator_account";
    /// Construction metadata: expiration in blocks.
    pub const EXPIRATION: &str = "expiration";
    /// Preprocess options: clauses to estimate gas for.
    pub const CLAUSES: &str = "clauses";
    /// Preprocess options: the sending account.
    pub const ORIGIN: &str = "origin";
}

/// A chain account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountIdentifier {
    /// 0x-prefixed, lowercase 20-byte address.
    pub address: String,
}

impl AccountIdentifier {
    /// Create an account identifier.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

/// Currency metadata distinguishing a token from the built-in assets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurrencyMetadata {
    /// Token contract address.
    #[serde(rename = "contractAddress")]
    pub contract_address: String,
}

/// A currency: symbol, decimals, and for tokens the contract address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    /// Ticker symbol.
    pub symbol: String,
    /// Number of decimals of the smallest unit.
    pub decimals: u32,
    /// Present for contract-backed currencies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CurrencyMetadata>,
}

impl Currency {
    /// Create a currency without contract metadata.
    #[must_use]
    pub fn new(symbol: impl Into<String>, decimals: u32) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
            metadata: None,
        }
    }

    /// Attach a contract address.
    #[must_use]
    pub fn with_contract(mut self, contract_address: impl Into<String>) -> Self {
        self.metadata = Some(CurrencyMetadata {
            contract_address: contract_address.into(),
        });
        self
    }

    /// The contract address for contract-backed currencies.
    #[must_use]
    pub fn contract_address(&self) -> Option<&str> {
        self.metadata.as_ref().map(|m| m.contract_address.as_str())
    }
}

/// A signed decimal value in a currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount {
    /// Signed base-10 integer in the currency's smallest unit.
    pub value: String,
    /// The currency of the value.
    pub currency: Currency,
}

impl Amount {
    /// Create an amount from a value string.
    #[must_use]
    pub fn new(value: impl Into<String>, currency: Currency) -> Self {
        Self {
            value: value.into(),
            currency,
        }
    }

    /// A positive amount.
    #[must_use]
    pub fn credit(value: U256, currency: Currency) -> Self {
        Self::new(value.to_string(), currency)
    }

    /// A negative amount. Zero is rendered as `"0"`, never `"-0"`.
    #[must_use]
    pub fn debit(value: U256, currency: Currency) -> Self {
        if value.is_zero() {
            return Self::new("0", currency);
        }
        Self::new(format!("-{value}"), currency)
    }

    /// Parse the value into a sign and a magnitude.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidAmount`] if the value is not a base-10
    /// integer with an optional leading `-`.
    pub fn signed_value(&self) -> ParseResult<SignedValue> {
        SignedValue::parse(&self.value)
    }
}

/// A decimal value split into sign and magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedValue {
    /// `true` for values with a leading `-` and non-zero magnitude.
    pub negative: bool,
    /// Absolute value.
    pub magnitude: U256,
}

impl SignedValue {
    /// Parse a signed base-10 integer string.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidAmount`] on empty input, a bare sign,
    /// non-decimal characters, or overflow of 256 bits.
    pub fn parse(value: &str) -> ParseResult<Self> {
        let (negative, digits) = value
            .strip_prefix('-')
            .map_or((false, value), |rest| (true, rest));

        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::invalid_amount(value));
        }

        let magnitude =
            U256::from_str_radix(digits, 10).map_err(|_| ParseError::invalid_amount(value))?;

        Ok(Self {
            negative: negative && !magnitude.is_zero(),
            magnitude,
        })
    }

    /// `true` if the value is strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        !self.negative && !self.magnitude.is_zero()
    }
}

/// Operation types produced and consumed by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationType {
    /// Value or token movement.
    Transfer,
    /// Gas paid by the origin.
    Fee,
    /// Gas paid by a fee delegator on behalf of the origin.
    FeeDelegation,
    /// Contract interaction that is not a recognized token transfer.
    ContractCall,
}

impl OperationType {
    /// All operation types.
    pub const ALL: [Self; 4] = [
        Self::Transfer,
        Self::Fee,
        Self::FeeDelegation,
        Self::ContractCall,
    ];

    /// The wire name of this type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Transfer => "Transfer",
            Self::Fee => "Fee",
            Self::FeeDelegation => "FeeDelegation",
            Self::ContractCall => "ContractCall",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an operation on the read path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationStatus {
    /// The clause executed.
    Succeeded,
    /// The transaction was reverted; only the fee was charged.
    Reverted,
}

/// Index of an operation within its transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationIdentifier {
    /// Position in emission order.
    pub index: u64,
    /// Groups operations that came from the same clause.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_index: Option<u64>,
}

/// One economic effect of a transaction clause or of fee collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Position and clause grouping.
    pub operation_identifier: OperationIdentifier,
    /// Operations this one is paired with (credit → debit).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_operations: Vec<OperationIdentifier>,
    /// Operation type.
    #[serde(rename = "type")]
    pub op_type: OperationType,
    /// Set on read paths, absent while constructing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OperationStatus>,
    /// The account affected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<AccountIdentifier>,
    /// The balance change.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Amount>,
    /// Clause index, destination, data, gas, delegator.
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl Operation {
    /// Create a bare operation.
    #[must_use]
    pub fn new(index: u64, op_type: OperationType) -> Self {
        Self {
            operation_identifier: OperationIdentifier {
                index,
                network_index: None,
            },
            related_operations: Vec::new(),
            op_type,
            status: None,
            account: None,
            amount: None,
            metadata: Metadata::new(),
        }
    }

    /// Set the network index.
    #[must_use]
    pub const fn with_network_index(mut self, network_index: u64) -> Self {
        self.operation_identifier.network_index = Some(network_index);
        self
    }

    /// Set the account.
    #[must_use]
    pub fn with_account(mut self, account: AccountIdentifier) -> Self {
        self.account = Some(account);
        self
    }

    /// Set the amount.
    #[must_use]
    pub fn with_amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Set the status.
    #[must_use]
    pub const fn with_status(mut self, status: Option<OperationStatus>) -> Self {
        self.status = status;
        self
    }

    /// Relate this operation to another one.
    #[must_use]
    pub fn related_to(mut self, index: u64) -> Self {
        self.related_operations.push(OperationIdentifier {
            index,
            network_index: None,
        });
        self
    }

    /// Insert a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    /// The operation index.
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.operation_identifier.index
    }
}

/// Elliptic curves named by the Mesh API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveType {
    /// The only curve VeChainThor accepts.
    Secp256k1,
    /// NIST P-256.
    Secp256r1,
    /// Ed25519.
    Edwards25519,
    /// Tweedle.
    Tweedle,
    /// Pallas.
    Pallas,
}

/// Signature schemes named by the Mesh API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignatureType {
    /// 64-byte `r || s`.
    Ecdsa,
    /// 65-byte `r || s || v`; what VeChainThor uses.
    EcdsaRecovery,
    /// Ed25519.
    Ed25519,
    /// Schnorr over secp256k1.
    #[serde(rename = "schnorr_1")]
    Schnorr1,
    /// Schnorr with Poseidon.
    SchnorrPoseidon,
}

/// A public key as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    /// Hex-encoded key bytes (no `0x` required).
    pub hex_bytes: String,
    /// The key's curve.
    pub curve_type: CurveType,
}

/// Bytes one account must sign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningPayload {
    /// The signer.
    pub account_identifier: AccountIdentifier,
    /// Hex-encoded 32-byte hash to sign.
    pub hex_bytes: String,
    /// Required scheme.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature_type: Option<SignatureType>,
}

/// A signature over a [`SigningPayload`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// The payload that was signed.
    pub signing_payload: SigningPayload,
    /// The signer's public key.
    pub public_key: PublicKey,
    /// Scheme used.
    pub signature_type: SignatureType,
    /// Hex-encoded signature bytes.
    pub hex_bytes: String,
}

/// A transaction hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionIdentifier {
    /// 0x-prefixed transaction id.
    pub hash: String,
}

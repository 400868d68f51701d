//! Transaction builder.
//!
//! Turns construction requests into unsigned native transactions, derives
//! the signing payloads, and attaches signatures.
//!
//! # Signing payloads
//!
//! | Signer | Hash |
//! |--------|------|
//! | origin | `signing_hash` |
//! | delegator | `blake2b256(signing_hash \|\| origin)` |
//!
//! The origin payload always comes first, and `combine` expects signatures
//! in the same order.

use alloy_primitives::{hex, Address, B256, U256};
use serde_json::Value;
use vemesh_core::encoding::{decode_hex, format_address, parse_address};
use vemesh_core::error::{BuildError, BuildResult};
use vemesh_core::types::{
    keys, AccountIdentifier, CurveType, Metadata, Operation, OperationType, PublicKey, Signature,
    SignatureType, SigningPayload,
};
use vemesh_crypto::{recover_address, Secp256k1PublicKey, SIGNATURE_LEN};

use crate::envelope::MeshTransaction;
use crate::parser::build_clauses;
use crate::transaction::{FeeParams, Reserved, Transaction, TxType};

// ============================================================================
// Construction metadata
// ============================================================================

/// Typed view of the construction metadata map.
///
/// Every field is validated by name; nothing is defaulted except the
/// optional `expiration`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructionMetadata {
    /// First 8 bytes of the reference block id.
    pub block_ref: u64,
    /// Last byte of the genesis block id.
    pub chain_tag: u8,
    /// Gas limit.
    pub gas: u64,
    /// Transaction nonce.
    pub nonce: u64,
    /// Pricing; also selects the transaction type.
    pub fee: FeeParams,
    /// Fee payer, for delegated transactions.
    pub fee_delegator: Option<Address>,
    /// Expiration override, in blocks.
    pub expiration: Option<u32>,
}

fn required<'a>(map: &'a Metadata, field: &str) -> BuildResult<&'a Value> {
    map.get(field)
        .filter(|v| !v.is_null())
        .ok_or_else(|| BuildError::missing_metadata(field))
}

fn required_str<'a>(map: &'a Metadata, field: &str) -> BuildResult<&'a str> {
    required(map, field)?
        .as_str()
        .ok_or_else(|| BuildError::invalid_metadata(field, "expected a string"))
}

fn required_u64(map: &Metadata, field: &str) -> BuildResult<u64> {
    required(map, field)?
        .as_u64()
        .ok_or_else(|| BuildError::invalid_metadata(field, "expected a non-negative integer"))
}

fn required_u8(map: &Metadata, field: &str) -> BuildResult<u8> {
    let value = required_u64(map, field)?;
    u8::try_from(value)
        .map_err(|_| BuildError::invalid_metadata(field, format!("{value} exceeds 255")))
}

fn required_u256(map: &Metadata, field: &str) -> BuildResult<U256> {
    let value = required_str(map, field)?;
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BuildError::invalid_metadata(field, "expected a decimal string"));
    }
    U256::from_str_radix(value, 10).map_err(|e| BuildError::invalid_metadata(field, e.to_string()))
}

fn parse_block_ref(map: &Metadata) -> BuildResult<u64> {
    let field = keys::BLOCK_REF;
    let bytes = decode_hex(required_str(map, field)?, field)
        .map_err(|e| BuildError::invalid_metadata(field, e.to_string()))?;
    let bytes: [u8; 8] = bytes.as_slice().try_into().map_err(|_| {
        BuildError::invalid_metadata(field, format!("expected 8 bytes, got {}", bytes.len()))
    })?;
    Ok(u64::from_be_bytes(bytes))
}

fn hex_quantity(map: &Metadata, field: &str) -> BuildResult<u64> {
    let value = required_str(map, field)?;
    let digits = value
        .strip_prefix("0x")
        .ok_or_else(|| BuildError::invalid_metadata(field, "expected 0x-prefixed hex"))?;
    if digits.is_empty() || digits.len() > 16 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(BuildError::invalid_metadata(field, "expected 1 to 16 hex digits"));
    }
    u64::from_str_radix(digits, 16).map_err(|e| BuildError::invalid_metadata(field, e.to_string()))
}

impl ConstructionMetadata {
    /// Read and validate a metadata map.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::MissingMetadata`] or [`BuildError::InvalidMetadata`]
    /// naming the first offending field.
    pub fn from_map(map: &Metadata) -> BuildResult<Self> {
        let type_name = required_str(map, keys::TRANSACTION_TYPE)?;
        let tx_type = TxType::from_name(type_name).ok_or_else(|| {
            BuildError::invalid_metadata(
                keys::TRANSACTION_TYPE,
                format!("unknown transaction type {type_name:?}"),
            )
        })?;

        let block_ref = parse_block_ref(map)?;
        let chain_tag = required_u8(map, keys::CHAIN_TAG)?;
        let gas = required_u64(map, keys::GAS_LIMIT)?;
        let nonce = hex_quantity(map, keys::NONCE)?;

        let fee = match tx_type {
            TxType::Legacy => FeeParams::Legacy {
                gas_price_coef: required_u8(map, keys::GAS_PRICE_COEF)?,
            },
            TxType::DynamicFee => FeeParams::DynamicFee {
                max_priority_fee_per_gas: required_u256(map, keys::MAX_PRIORITY_FEE_PER_GAS)?,
                max_fee_per_gas: required_u256(map, keys::MAX_FEE_PER_GAS)?,
            },
        };

        let fee_delegator = match map.get(keys::FEE_DELEGATOR_ACCOUNT) {
            None | Some(Value::Null) => None,
            Some(_) => {
                let address = required_str(map, keys::FEE_DELEGATOR_ACCOUNT)?;
                Some(parse_address(address).map_err(|e| {
                    BuildError::invalid_metadata(keys::FEE_DELEGATOR_ACCOUNT, e.to_string())
                })?)
            }
        };

        let expiration = match map.get(keys::EXPIRATION) {
            None | Some(Value::Null) => None,
            Some(_) => {
                let value = required_u64(map, keys::EXPIRATION)?;
                Some(u32::try_from(value).map_err(|_| {
                    BuildError::invalid_metadata(keys::EXPIRATION, "exceeds u32")
                })?)
            }
        };

        Ok(Self {
            block_ref,
            chain_tag,
            gas,
            nonce,
            fee,
            fee_delegator,
            expiration,
        })
    }

    /// Render back into a metadata map.
    #[must_use]
    pub fn to_map(&self) -> Metadata {
        let mut map = Metadata::new();
        map.insert(
            keys::TRANSACTION_TYPE.to_string(),
            self.fee.tx_type().as_str().into(),
        );
        map.insert(
            keys::BLOCK_REF.to_string(),
            format!("0x{:016x}", self.block_ref).into(),
        );
        map.insert(keys::CHAIN_TAG.to_string(), self.chain_tag.into());
        map.insert(keys::GAS_LIMIT.to_string(), self.gas.into());
        map.insert(keys::NONCE.to_string(), format!("0x{:x}", self.nonce).into());

        match &self.fee {
            FeeParams::Legacy { gas_price_coef } => {
                map.insert(keys::GAS_PRICE_COEF.to_string(), (*gas_price_coef).into());
            }
            FeeParams::DynamicFee {
                max_priority_fee_per_gas,
                max_fee_per_gas,
            } => {
                map.insert(
                    keys::MAX_PRIORITY_FEE_PER_GAS.to_string(),
                    max_priority_fee_per_gas.to_string().into(),
                );
                map.insert(
                    keys::MAX_FEE_PER_GAS.to_string(),
                    max_fee_per_gas.to_string().into(),
                );
            }
        }

        if let Some(delegator) = &self.fee_delegator {
            map.insert(
                keys::FEE_DELEGATOR_ACCOUNT.to_string(),
                format_address(delegator).into(),
            );
        }
        if let Some(expiration) = self.expiration {
            map.insert(keys::EXPIRATION.to_string(), expiration.into());
        }
        map
    }
}

// ============================================================================
// Building
// ============================================================================

/// Assemble an unsigned transaction from operations and metadata.
///
/// `expiration` is used unless the metadata overrides it. The delegation
/// bit is set iff the metadata names a fee delegator.
///
/// # Errors
///
/// Returns a [`BuildError`] naming the offending metadata field or operation.
pub fn build_from_request(
    operations: &[Operation],
    metadata: &Metadata,
    expiration: u32,
) -> BuildResult<Transaction> {
    let meta = ConstructionMetadata::from_map(metadata)?;
    let clauses = build_clauses(operations)?;

    Ok(Transaction {
        chain_tag: meta.chain_tag,
        block_ref: meta.block_ref,
        expiration: meta.expiration.unwrap_or(expiration),
        clauses,
        fee: meta.fee,
        gas: meta.gas,
        depends_on: None,
        nonce: meta.nonce,
        reserved: if meta.fee_delegator.is_some() {
            Reserved::delegated()
        } else {
            Reserved::default()
        },
        signature: alloy_primitives::Bytes::new(),
    })
}

/// The single account debited by the request's transfers.
///
/// # Errors
///
/// Returns [`BuildError::InvalidRequest`] if nothing is debited and
/// [`BuildError::InvalidOperation`] if an operation debits a second account.
pub fn origin_of(operations: &[Operation]) -> BuildResult<Address> {
    let mut origin: Option<(u64, Address)> = None;

    for op in operations.iter().filter(|op| op.op_type == OperationType::Transfer) {
        let index = op.index();
        let Some(amount) = &op.amount else { continue };
        let value = amount
            .signed_value()
            .map_err(|e| BuildError::invalid_operation(index, e.to_string()))?;
        if !value.negative {
            continue;
        }

        let account = op
            .account
            .as_ref()
            .ok_or_else(|| BuildError::invalid_operation(index, "debit without account"))?;
        let address = parse_address(&account.address)
            .map_err(|e| BuildError::invalid_operation(index, e.to_string()))?;

        match origin {
            None => origin = Some((index, address)),
            Some((first, existing)) if existing != address => {
                return Err(BuildError::invalid_operation(
                    index,
                    format!("debits a different account than operation {first}"),
                ));
            }
            Some(_) => {}
        }
    }

    origin
        .map(|(_, address)| address)
        .ok_or_else(|| BuildError::invalid_request("no operation debits an account"))
}

/// Address of a Mesh public key.
///
/// # Errors
///
/// Returns [`BuildError::InvalidPublicKey`] for curves other than secp256k1
/// and for malformed keys.
pub fn address_from_public_key(key: &PublicKey) -> BuildResult<Address> {
    if key.curve_type != CurveType::Secp256k1 {
        return Err(BuildError::invalid_public_key(format!(
            "unsupported curve {:?}",
            key.curve_type
        )));
    }
    let bytes = decode_hex(&key.hex_bytes, "public key")
        .map_err(|e| BuildError::invalid_public_key(e.to_string()))?;
    let public_key = Secp256k1PublicKey::from_sec1_bytes(&bytes)
        .map_err(|e| BuildError::invalid_public_key(e.to_string()))?;
    Ok(public_key.address())
}

/// Signers and what each must sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningPayloads {
    /// Sender.
    pub origin: Address,
    /// Fee payer, for delegated transactions.
    pub delegator: Option<Address>,
    /// Origin payload first, then the delegator's.
    pub payloads: Vec<SigningPayload>,
}

fn payload(account: &Address, hash: &B256) -> SigningPayload {
    SigningPayload {
        account_identifier: AccountIdentifier::new(format_address(account)),
        hex_bytes: hex::encode(hash),
        signature_type: Some(SignatureType::EcdsaRecovery),
    }
}

/// Derive the signing payloads of an unsigned transaction.
///
/// `public_keys[0]` is the origin; `public_keys[1]` the delegator when the
/// transaction is delegated.
///
/// # Errors
///
/// Returns [`BuildError::InvalidRequest`] if the number of keys does not
/// match the delegation flag, and [`BuildError::InvalidPublicKey`] for bad keys.
pub fn create_signing_payloads(
    tx: &Transaction,
    public_keys: &[PublicKey],
) -> BuildResult<SigningPayloads> {
    let required = tx.required_signatures();
    if public_keys.len() != required {
        return Err(BuildError::invalid_request(format!(
            "expected {required} public key(s), got {}",
            public_keys.len()
        )));
    }

    let origin = match public_keys.first() {
        Some(key) => address_from_public_key(key)?,
        None => return Err(BuildError::invalid_request("missing origin public key")),
    };
    let delegator = public_keys
        .get(1)
        .map(address_from_public_key)
        .transpose()?;

    let mut payloads = vec![payload(&origin, &tx.signing_hash())];
    if let Some(delegator) = &delegator {
        payloads.push(payload(delegator, &tx.delegator_signing_hash(&origin)));
    }

    Ok(SigningPayloads {
        origin,
        delegator,
        payloads,
    })
}

fn signature_bytes(index: usize, signature: &Signature) -> BuildResult<Vec<u8>> {
    let bytes = decode_hex(&signature.hex_bytes, "signature")
        .map_err(|e| BuildError::invalid_signature(format!("signature {index}: {e}")))?;
    if bytes.len() != SIGNATURE_LEN {
        return Err(BuildError::invalid_signature(format!(
            "signature {index}: expected {SIGNATURE_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    Ok(bytes)
}

/// Attach signatures to an unsigned transaction.
///
/// Signatures must be in payload order: origin, then delegator. Each is
/// checked against the signer declared in `unsigned`.
///
/// # Errors
///
/// Returns [`BuildError::SignatureCount`] if the count is not what the
/// delegation flag requires, and [`BuildError::InvalidSignature`] if a
/// signature is malformed or recovers to the wrong signer.
pub fn combine(unsigned: &MeshTransaction, signatures: &[Signature]) -> BuildResult<Transaction> {
    let expected = unsigned.tx.required_signatures();
    if signatures.len() != expected || !(1..=2).contains(&signatures.len()) {
        return Err(BuildError::SignatureCount {
            expected,
            actual: signatures.len(),
        });
    }

    let declared_origin = unsigned
        .origin_address()
        .map_err(|e| BuildError::invalid_request(e.to_string()))?;
    let declared_delegator = unsigned
        .delegator_address()
        .map_err(|e| BuildError::invalid_request(e.to_string()))?;

    let mut combined = Vec::with_capacity(expected * SIGNATURE_LEN);
    let mut origin = None;

    for (i, signature) in signatures.iter().enumerate() {
        let bytes = signature_bytes(i, signature)?;

        let (hash, declared) = match origin {
            None => (unsigned.tx.signing_hash(), declared_origin),
            Some(origin) => (unsigned.tx.delegator_signing_hash(&origin), declared_delegator),
        };
        let recovered = recover_address(&hash, &bytes)
            .map_err(|e| BuildError::invalid_signature(format!("signature {i}: {e}")))?;

        if let Some(declared) = declared {
            if declared != recovered {
                return Err(BuildError::invalid_signature(format!(
                    "signature {i} recovers to {}, expected {}",
                    format_address(&recovered),
                    format_address(&declared)
                )));
            }
        }

        if origin.is_none() {
            origin = Some(recovered);
        }
        combined.extend_from_slice(&bytes);
    }

    Ok(unsigned.tx.clone().with_signature(combined))
}

//! # Construction Service
//!
//! The Mesh construction flow, one method per endpoint:
//!
//! ```text
//! preprocess ──▶ metadata ──▶ payloads ──▶ (offline signing) ──▶ combine ──▶ hash / submit
//!                                 │                                  │
//!                                 └────────────── parse ◀────────────┘
//! ```
//!
//! Only `metadata` and `submit` talk to the node. Everything else is pure
//! and runs offline.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use vemesh::construction::ConstructionService;
//! use vemesh::node::OfflineNode;
//! use vemesh_core::config::Config;
//!
//! let service = ConstructionService::new(Config::default(), Arc::new(OfflineNode)).unwrap();
//! assert_eq!(service.config().network.name, "main");
//! ```

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use vemesh_chain::currency::vtho;
use vemesh_chain::{
    address_from_public_key, build_clauses, build_from_request, create_signing_payloads,
    origin_of, Clause, ClauseParser, ClauseView, ConstructionMetadata, CurrencyRegistry,
    FeeParams, MeshTransaction, NodeClause, ParseContext, Transaction, TxType, WireForm,
};
use vemesh_core::config::Config;
use vemesh_core::encoding::{decode_hex, encode_hex, format_address, parse_address};
use vemesh_core::error::{BuildError, BuildResult, ParseError, ParseResult, Result};
use vemesh_core::types::{
    keys, AccountIdentifier, Amount, Metadata, Operation, PublicKey, Signature, SigningPayload,
    TransactionIdentifier,
};

use crate::node::{DynamicGasPrice, NodeClient, NodeTokenResolver};

/// Percentage applied to the base fee when capping `maxFeePerGas`.
const BASE_FEE_MARGIN_PERCENT: u64 = 112;

// ============================================================================
// Requests and responses
// ============================================================================

/// `/construction/derive` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionDeriveResponse {
    /// The derived account.
    pub account_identifier: AccountIdentifier,
}

/// `/construction/preprocess` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionPreprocessRequest {
    /// Intended operations.
    pub operations: Vec<Operation>,
    /// `transactionType`, `fee_delegator_account`, `gasPriceCoef`, `expiration`.
    #[serde(default)]
    pub metadata: Metadata,
}

/// `/construction/preprocess` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionPreprocessResponse {
    /// Input for `/construction/metadata`.
    pub options: Metadata,
    /// Accounts whose keys `/construction/payloads` needs, origin first.
    pub required_public_keys: Vec<AccountIdentifier>,
}

/// `/construction/metadata` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionMetadataRequest {
    /// Options returned by preprocess.
    #[serde(default)]
    pub options: Metadata,
}

/// `/construction/metadata` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionMetadataResponse {
    /// Construction metadata for `/construction/payloads`.
    pub metadata: Metadata,
    /// Estimated fee, in VTHO.
    pub suggested_fee: Vec<Amount>,
}

/// `/construction/payloads` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionPayloadsRequest {
    /// Intended operations.
    pub operations: Vec<Operation>,
    /// Metadata returned by `/construction/metadata`.
    pub metadata: Metadata,
    /// Origin key, then the delegator key for delegated transactions.
    #[serde(default)]
    pub public_keys: Vec<PublicKey>,
}

/// `/construction/payloads` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionPayloadsResponse {
    /// Hex of the unsigned wire form.
    pub unsigned_transaction: String,
    /// What each signer must sign.
    pub payloads: Vec<SigningPayload>,
}

/// `/construction/parse` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionParseRequest {
    /// Which wire form `transaction` is in.
    pub signed: bool,
    /// Hex of the transaction.
    pub transaction: String,
}

/// `/construction/parse` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionParseResponse {
    /// Operations the transaction performs, without the fee.
    pub operations: Vec<Operation>,
    /// Recovered signers of a signed transaction, origin first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub account_identifier_signers: Vec<AccountIdentifier>,
}

/// `/construction/combine` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionCombineRequest {
    /// Hex of the unsigned wire form.
    pub unsigned_transaction: String,
    /// Signatures in payload order.
    pub signatures: Vec<Signature>,
}

/// `/construction/combine` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionCombineResponse {
    /// Hex of the signed native transaction.
    pub signed_transaction: String,
}

/// `/construction/hash` and `/construction/submit` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructionHashRequest {
    /// Hex of the signed native transaction.
    pub signed_transaction: String,
}

/// `/construction/hash` and `/construction/submit` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionIdentifierResponse {
    /// The transaction id.
    pub transaction_identifier: TransactionIdentifier,
}

// ============================================================================
// Service
// ============================================================================

/// Runs the construction flow against a node.
pub struct ConstructionService<N> {
    config: Config,
    registry: CurrencyRegistry,
    node: Arc<N>,
}

impl<N> std::fmt::Debug for ConstructionService<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConstructionService")
            .field("network", &self.config.network.name)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl<N: NodeClient + 'static> ConstructionService<N> {
    /// Create a service.
    ///
    /// Tokens from `config` are registered up front; anything else is
    /// resolved through `node`.
    ///
    /// # Errors
    ///
    /// Returns a configuration or parse error if `config` is invalid.
    pub fn new(config: Config, node: Arc<N>) -> Result<Self> {
        config.validate()?;
        let resolver = Arc::new(NodeTokenResolver::new(Arc::clone(&node)));
        let registry = CurrencyRegistry::from_config(&config)?.with_resolver(resolver);

        Ok(Self {
            config,
            registry,
            node,
        })
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The currency registry used for parsing.
    #[must_use]
    pub const fn registry(&self) -> &CurrencyRegistry {
        &self.registry
    }

    /// The node.
    #[must_use]
    pub fn node(&self) -> &N {
        &self.node
    }

    /// Account address of a public key.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::InvalidPublicKey`] for non-secp256k1 or
    /// malformed keys.
    #[allow(clippy::unused_self)]
    pub fn derive(&self, public_key: &PublicKey) -> Result<ConstructionDeriveResponse> {
        debug!(curve = ?public_key.curve_type, "construction derive");

        let address = address_from_public_key(public_key)?;
        Ok(ConstructionDeriveResponse {
            account_identifier: account(&address),
        })
    }

    /// Validate the intent and name the keys and node queries it needs.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if the operations cannot be built into
    /// clauses, debit more than one account, or the metadata is malformed.
    pub fn preprocess(
        &self,
        request: &ConstructionPreprocessRequest,
    ) -> Result<ConstructionPreprocessResponse> {
        debug!(
            operations = request.operations.len(),
            "construction preprocess"
        );

        let clauses = build_clauses(&request.operations)?;
        let origin = origin_of(&request.operations)?;
        let tx_type = transaction_type(&request.metadata)?;

        let mut options = Metadata::new();
        options.insert(
            keys::TRANSACTION_TYPE.to_string(),
            tx_type.as_str().into(),
        );
        options.insert(keys::ORIGIN.to_string(), format_address(&origin).into());
        let node_clauses: Vec<NodeClause> = clauses.iter().map(NodeClause::from).collect();
        options.insert(
            keys::CLAUSES.to_string(),
            serde_json::to_value(node_clauses)
                .map_err(|e| BuildError::invalid_request(e.to_string()))?,
        );

        let mut required_public_keys = vec![account(&origin)];
        if let Some(delegator) = optional_address(&request.metadata, keys::FEE_DELEGATOR_ACCOUNT)? {
            options.insert(
                keys::FEE_DELEGATOR_ACCOUNT.to_string(),
                format_address(&delegator).into(),
            );
            required_public_keys.push(account(&delegator));
        }

        for key in [keys::GAS_PRICE_COEF, keys::EXPIRATION] {
            if let Some(value) = present(&request.metadata, key) {
                options.insert(key.to_string(), value.clone());
            }
        }

        Ok(ConstructionPreprocessResponse {
            options,
            required_public_keys,
        })
    }

    /// Query the node and produce construction metadata and a fee estimate.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] for malformed options and a
    /// [`NodeError`](vemesh_core::error::NodeError) if any node query fails.
    pub fn metadata(
        &self,
        request: &ConstructionMetadataRequest,
    ) -> Result<ConstructionMetadataResponse> {
        let options = &request.options;
        let tx_type = transaction_type(options)?;
        debug!(tx_type = %tx_type, "construction metadata");

        let clauses = option_clauses(options)?;
        let best = self.node.best_block()?;
        let chain_tag = self.node.chain_tag()?;
        let gas = self.node.estimate_intrinsic_gas(&clauses)?;

        let fee = match tx_type {
            TxType::Legacy => FeeParams::Legacy {
                gas_price_coef: optional_u8(options, keys::GAS_PRICE_COEF)?.unwrap_or(0),
            },
            TxType::DynamicFee => dynamic_fee_params(&self.node.dynamic_gas_price()?),
        };
        let suggested = match &fee {
            FeeParams::Legacy { gas_price_coef } => {
                legacy_fee(gas, self.config.network.base_gas_price()?, *gas_price_coef)
            }
            FeeParams::DynamicFee {
                max_fee_per_gas, ..
            } => U256::from(gas).saturating_mul(*max_fee_per_gas),
        };

        let metadata = ConstructionMetadata {
            block_ref: best.block_ref(),
            chain_tag,
            gas,
            nonce: rand::random(),
            fee,
            fee_delegator: optional_address(options, keys::FEE_DELEGATOR_ACCOUNT)?,
            expiration: optional_u32(options, keys::EXPIRATION)?,
        };
        debug!(gas, block = best.number, fee = %suggested, "metadata ready");

        Ok(ConstructionMetadataResponse {
            metadata: metadata.to_map(),
            suggested_fee: vec![Amount::new(suggested.to_string(), vtho())],
        })
    }

    /// Build the unsigned transaction and its signing payloads.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if metadata or operations are malformed, if
    /// the key count does not match delegation, or if a key does not belong
    /// to the declared origin or delegator.
    pub fn payloads(
        &self,
        request: &ConstructionPayloadsRequest,
    ) -> Result<ConstructionPayloadsResponse> {
        debug!(
            operations = request.operations.len(),
            public_keys = request.public_keys.len(),
            "construction payloads"
        );

        let tx = build_from_request(
            &request.operations,
            &request.metadata,
            self.config.network.expiration,
        )?;
        let declared_delegator = ConstructionMetadata::from_map(&request.metadata)?.fee_delegator;
        let signing = create_signing_payloads(&tx, &request.public_keys)?;

        match origin_of(&request.operations) {
            Ok(origin) if origin != signing.origin => {
                return Err(BuildError::invalid_request(format!(
                    "origin key belongs to {}, operations debit {}",
                    format_address(&signing.origin),
                    format_address(&origin)
                ))
                .into());
            }
            Err(e @ BuildError::InvalidOperation { .. }) => return Err(e.into()),
            _ => {}
        }
        if signing.delegator != declared_delegator {
            return Err(BuildError::invalid_request(format!(
                "delegator key does not match {}",
                keys::FEE_DELEGATOR_ACCOUNT
            ))
            .into());
        }

        let unsigned = MeshTransaction::new(tx, signing.origin, signing.delegator).encode_unsigned()?;
        Ok(ConstructionPayloadsResponse {
            unsigned_transaction: encode_hex(unsigned),
            payloads: signing.payloads,
        })
    }

    /// Recover the operations of a transaction in either wire form.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the hex or wire form is malformed, or if
    /// the bytes are in the other form.
    pub fn parse(&self, request: &ConstructionParseRequest) -> Result<ConstructionParseResponse> {
        debug!(signed = request.signed, "construction parse");

        let bytes = decode_hex(&request.transaction, "transaction")?;
        let mesh = MeshTransaction::decode(&bytes, WireForm::from_signed(request.signed))?;
        let origin = mesh
            .origin_address()?
            .ok_or_else(|| ParseError::malformed_transaction("no origin declared"))?;
        let delegator = mesh.delegator_address()?;

        let ctx = ParseContext::new(origin).with_delegator(delegator);
        let operations = ClauseParser::new(&self.registry).parse(&mesh.tx.clauses, &ctx)?;

        let account_identifier_signers = if request.signed {
            std::iter::once(origin)
                .chain(delegator)
                .map(|a| account(&a))
                .collect()
        } else {
            Vec::new()
        };

        Ok(ConstructionParseResponse {
            operations,
            account_identifier_signers,
        })
    }

    /// Attach signatures to an unsigned transaction.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] for a malformed unsigned transaction and a
    /// [`BuildError`] for a wrong signature count or signer.
    #[allow(clippy::unused_self)]
    pub fn combine(
        &self,
        request: &ConstructionCombineRequest,
    ) -> Result<ConstructionCombineResponse> {
        debug!(signatures = request.signatures.len(), "construction combine");

        let bytes = decode_hex(&request.unsigned_transaction, "unsigned transaction")?;
        let unsigned = MeshTransaction::decode(&bytes, WireForm::Unsigned)?;
        let signed = vemesh_chain::combine(&unsigned, &request.signatures)?;

        Ok(ConstructionCombineResponse {
            signed_transaction: encode_hex(signed.encode()),
        })
    }

    /// Id of a signed transaction.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the transaction is malformed or unsigned.
    #[allow(clippy::unused_self)]
    pub fn hash(&self, request: &ConstructionHashRequest) -> Result<TransactionIdentifierResponse> {
        debug!("construction hash");

        let (tx, _) = decode_signed(&request.signed_transaction)?;
        identifier(&tx)
    }

    /// Broadcast a signed transaction.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the transaction is malformed or unsigned,
    /// and a [`NodeError`](vemesh_core::error::NodeError) if the node
    /// rejects it or cannot be reached.
    pub fn submit(
        &self,
        request: &ConstructionHashRequest,
    ) -> Result<TransactionIdentifierResponse> {
        debug!("construction submit");

        let (tx, bytes) = decode_signed(&request.signed_transaction)?;
        let id = self.node.submit(&bytes)?;
        let hash = encode_hex(id);
        info!(
            id = %hash,
            origin = %tx.origin().map(|o| format_address(&o)).unwrap_or_default(),
            clauses = tx.clauses.len(),
            "submitted transaction"
        );

        Ok(TransactionIdentifierResponse {
            transaction_identifier: TransactionIdentifier { hash },
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn account(address: &Address) -> AccountIdentifier {
    AccountIdentifier::new(format_address(address))
}

fn identifier(tx: &Transaction) -> Result<TransactionIdentifierResponse> {
    Ok(TransactionIdentifierResponse {
        transaction_identifier: TransactionIdentifier {
            hash: encode_hex(tx.id()?),
        },
    })
}

fn decode_signed(hex: &str) -> ParseResult<(Transaction, Vec<u8>)> {
    let bytes = decode_hex(hex, "signed transaction")?;
    let mesh = MeshTransaction::decode(&bytes, WireForm::Signed)?;
    Ok((mesh.tx, bytes))
}

fn present<'a>(map: &'a Metadata, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

/// `transactionType`, defaulting to dynamic fee.
fn transaction_type(map: &Metadata) -> BuildResult<TxType> {
    let Some(value) = present(map, keys::TRANSACTION_TYPE) else {
        return Ok(TxType::DynamicFee);
    };
    let name = value
        .as_str()
        .ok_or_else(|| BuildError::invalid_metadata(keys::TRANSACTION_TYPE, "expected a string"))?;
    TxType::from_name(name).ok_or_else(|| {
        BuildError::invalid_metadata(
            keys::TRANSACTION_TYPE,
            format!("unknown transaction type {name:?}"),
        )
    })
}

fn optional_address(map: &Metadata, key: &str) -> BuildResult<Option<Address>> {
    present(map, key)
        .map(|value| {
            let text = value
                .as_str()
                .ok_or_else(|| BuildError::invalid_metadata(key, "expected an address string"))?;
            parse_address(text).map_err(|e| BuildError::invalid_metadata(key, e.to_string()))
        })
        .transpose()
}

fn optional_u64(map: &Metadata, key: &str) -> BuildResult<Option<u64>> {
    present(map, key)
        .map(|value| {
            value
                .as_u64()
                .ok_or_else(|| BuildError::invalid_metadata(key, "expected a non-negative integer"))
        })
        .transpose()
}

fn optional_u8(map: &Metadata, key: &str) -> BuildResult<Option<u8>> {
    optional_u64(map, key)?
        .map(|v| u8::try_from(v).map_err(|_| BuildError::invalid_metadata(key, format!("{v} exceeds 255"))))
        .transpose()
}

fn optional_u32(map: &Metadata, key: &str) -> BuildResult<Option<u32>> {
    optional_u64(map, key)?
        .map(|v| u32::try_from(v).map_err(|_| BuildError::invalid_metadata(key, "exceeds u32")))
        .transpose()
}

/// Native clauses carried in preprocess options.
fn option_clauses(options: &Metadata) -> Result<Vec<Clause>> {
    let Some(value) = present(options, keys::CLAUSES) else {
        return Ok(Vec::new());
    };
    let node_clauses: Vec<NodeClause> = serde_json::from_value(value.clone())
        .map_err(|e| BuildError::invalid_metadata(keys::CLAUSES, e.to_string()))?;

    node_clauses
        .iter()
        .map(|c| {
            Ok(Clause {
                to: c.destination(),
                value: c.value()?,
                data: c.raw_data().into_owned().into(),
            })
        })
        .collect::<ParseResult<Vec<_>>>()
        .map_err(Into::into)
}

/// `gas × base × (255 + coef) / 255`.
#[must_use]
pub fn legacy_fee(gas: u64, base_gas_price: U256, gas_price_coef: u8) -> U256 {
    U256::from(gas)
        .saturating_mul(base_gas_price)
        .saturating_mul(U256::from(255 + u64::from(gas_price_coef)))
        / U256::from(255u64)
}

/// Tip the suggested reward and cap at `base × 112% + reward`.
#[must_use]
pub fn dynamic_fee_params(price: &DynamicGasPrice) -> FeeParams {
    let max_fee_per_gas = price
        .base_fee
        .saturating_mul(U256::from(BASE_FEE_MARGIN_PERCENT))
        / U256::from(100u64);
    FeeParams::DynamicFee {
        max_priority_fee_per_gas: price.reward,
        max_fee_per_gas: max_fee_per_gas.saturating_add(price.reward),
    }
}

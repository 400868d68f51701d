//! The full construction flow against a fixture node.
//!
//! preprocess -> metadata -> payloads -> sign -> combine -> parse -> hash -> submit

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::indexing_slicing,
    dead_code
)]

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use serde_json::json;
use vemesh::construction::{
    ConstructionCombineRequest, ConstructionHashRequest, ConstructionMetadataRequest,
    ConstructionParseRequest, ConstructionPayloadsRequest, ConstructionPreprocessRequest,
    ConstructionService,
};
use vemesh_chain::currency::{vet, vtho};
use vemesh_chain::{intrinsic_gas, ConstructionMetadata, FeeParams, MeshTransaction, WireForm};
use vemesh_core::config::{Config, TokenEntry};
use vemesh_core::encoding::{decode_hex, format_address};
use vemesh_core::error::{BuildError, MeshError};
use vemesh_core::types::{keys, AccountIdentifier, Amount, Currency, Metadata, Operation, OperationType};

use crate::common::{
    account_of, address_of, keypair, public_key, sign, FixtureNode, BASE_FEE, CHAIN_TAG, REWARD,
};

// ============================================================================
// Helpers
// ============================================================================

const RECIPIENT: Address = Address::repeat_byte(0x77);

fn service() -> (ConstructionService<FixtureNode>, Arc<FixtureNode>) {
    let node = Arc::new(FixtureNode::new());
    let service = ConstructionService::new(Config::default(), Arc::clone(&node)).unwrap();
    (service, node)
}

fn transfer(index: u64, account: AccountIdentifier, amount: Amount) -> Operation {
    Operation::new(index, OperationType::Transfer)
        .with_account(account)
        .with_amount(amount)
}

/// One VET transfer and one VTHO transfer from `from` to [`RECIPIENT`].
fn intent(from: &AccountIdentifier) -> Vec<Operation> {
    let to = AccountIdentifier::new(format_address(&RECIPIENT));
    vec![
        transfer(0, from.clone(), Amount::debit(U256::from(1_000u64), vet())),
        transfer(1, to.clone(), Amount::credit(U256::from(1_000u64), vet())).related_to(0),
        transfer(2, from.clone(), Amount::debit(U256::from(50u64), vtho())),
        transfer(3, to, Amount::credit(U256::from(50u64), vtho())).related_to(2),
    ]
}

fn amounts(ops: &[Operation]) -> Vec<(String, String)> {
    ops.iter()
        .map(|op| {
            let amount = op.amount.as_ref().unwrap();
            (amount.value.clone(), amount.currency.symbol.clone())
        })
        .collect()
}

// ============================================================================
// Flows
// ============================================================================

#[test]
fn test_delegated_dynamic_fee_flow() {
    let (service, node) = service();
    let origin = keypair(0x11);
    let delegator = keypair(0x22);
    let ops = intent(&account_of(&origin));

    // preprocess
    let mut request_meta = Metadata::new();
    request_meta.insert(
        keys::FEE_DELEGATOR_ACCOUNT.to_string(),
        json!(address_of(&delegator)),
    );
    let pre = service
        .preprocess(&ConstructionPreprocessRequest {
            operations: ops.clone(),
            metadata: request_meta,
        })
        .unwrap();
    assert_eq!(
        pre.required_public_keys,
        vec![account_of(&origin), account_of(&delegator)]
    );

    // metadata
    let meta = service
        .metadata(&ConstructionMetadataRequest {
            options: pre.options,
        })
        .unwrap();
    let construction = ConstructionMetadata::from_map(&meta.metadata).unwrap();
    let max_fee = U256::from(BASE_FEE) * U256::from(112u64) / U256::from(100u64)
        + U256::from(REWARD);
    assert_eq!(construction.chain_tag, CHAIN_TAG);
    assert_eq!(construction.block_ref, FixtureNode::best().block_ref());
    assert_eq!(
        construction.fee,
        FeeParams::DynamicFee {
            max_priority_fee_per_gas: U256::from(REWARD),
            max_fee_per_gas: max_fee,
        }
    );
    assert_eq!(
        construction.fee_delegator.map(|a| format_address(&a)),
        Some(address_of(&delegator))
    );
    assert_eq!(
        meta.suggested_fee[0].value,
        (U256::from(construction.gas) * max_fee).to_string()
    );

    // payloads
    let payloads = service
        .payloads(&ConstructionPayloadsRequest {
            operations: ops,
            metadata: meta.metadata,
            public_keys: vec![public_key(&origin), public_key(&delegator)],
        })
        .unwrap();
    assert_eq!(payloads.payloads.len(), 2);
    assert_eq!(payloads.payloads[0].account_identifier, account_of(&origin));
    assert_eq!(payloads.payloads[1].account_identifier, account_of(&delegator));

    // unsigned parse shows the intent without signers
    let unsigned = service
        .parse(&ConstructionParseRequest {
            signed: false,
            transaction: payloads.unsigned_transaction.clone(),
        })
        .unwrap();
    assert!(unsigned.account_identifier_signers.is_empty());
    assert_eq!(
        amounts(&unsigned.operations),
        vec![
            ("-1000".to_string(), "VET".to_string()),
            ("1000".to_string(), "VET".to_string()),
            ("-50".to_string(), "VTHO".to_string()),
            ("50".to_string(), "VTHO".to_string()),
        ]
    );

    // sign and combine
    let signatures = vec![
        sign(&origin, &payloads.payloads[0]),
        sign(&delegator, &payloads.payloads[1]),
    ];
    let combined = service
        .combine(&ConstructionCombineRequest {
            unsigned_transaction: payloads.unsigned_transaction,
            signatures,
        })
        .unwrap();

    // signed parse recovers both signers
    let signed = service
        .parse(&ConstructionParseRequest {
            signed: true,
            transaction: combined.signed_transaction.clone(),
        })
        .unwrap();
    assert_eq!(
        signed.account_identifier_signers,
        vec![account_of(&origin), account_of(&delegator)]
    );
    assert_eq!(signed.operations, unsigned.operations);

    // hash and submit agree
    let hash_request = ConstructionHashRequest {
        signed_transaction: combined.signed_transaction.clone(),
    };
    let hashed = service.hash(&hash_request).unwrap();
    let submitted = service.submit(&hash_request).unwrap();
    assert_eq!(hashed, submitted);

    let accepted = node.submitted();
    assert_eq!(accepted.len(), 1);
    assert!(accepted[0].is_delegated());
    assert_eq!(accepted[0].clauses.len(), 2);
    assert_eq!(accepted[0].gas, intrinsic_gas(&accepted[0].clauses));
    assert_eq!(
        format_address(&accepted[0].origin().unwrap()),
        address_of(&origin)
    );
}

#[test]
fn test_legacy_flow_without_delegation() {
    let (service, node) = service();
    let origin = keypair(0x33);
    let ops = intent(&account_of(&origin));

    let mut request_meta = Metadata::new();
    request_meta.insert(keys::TRANSACTION_TYPE.to_string(), json!("legacy"));
    request_meta.insert(keys::GAS_PRICE_COEF.to_string(), json!(0));
    request_meta.insert(keys::EXPIRATION.to_string(), json!(32));

    let pre = service
        .preprocess(&ConstructionPreprocessRequest {
            operations: ops.clone(),
            metadata: request_meta,
        })
        .unwrap();
    assert_eq!(pre.required_public_keys, vec![account_of(&origin)]);

    let meta = service
        .metadata(&ConstructionMetadataRequest {
            options: pre.options,
        })
        .unwrap();
    let construction = ConstructionMetadata::from_map(&meta.metadata).unwrap();
    assert_eq!(construction.fee, FeeParams::Legacy { gas_price_coef: 0 });
    assert_eq!(construction.expiration, Some(32));
    assert_eq!(
        meta.suggested_fee[0].value,
        (U256::from(construction.gas) * U256::from(BASE_FEE)).to_string()
    );

    let payloads = service
        .payloads(&ConstructionPayloadsRequest {
            operations: ops,
            metadata: meta.metadata,
            public_keys: vec![public_key(&origin)],
        })
        .unwrap();
    assert_eq!(payloads.payloads.len(), 1);

    let combined = service
        .combine(&ConstructionCombineRequest {
            unsigned_transaction: payloads.unsigned_transaction,
            signatures: vec![sign(&origin, &payloads.payloads[0])],
        })
        .unwrap();

    let bytes = decode_hex(&combined.signed_transaction, "signed").unwrap();
    let mesh = MeshTransaction::decode(&bytes, WireForm::Signed).unwrap();
    assert!(!mesh.tx.is_delegated());
    assert_eq!(mesh.tx.expiration, 32);

    service
        .submit(&ConstructionHashRequest {
            signed_transaction: combined.signed_transaction,
        })
        .unwrap();
    assert_eq!(node.submitted().len(), 1);
}

// ============================================================================
// Failure paths
// ============================================================================

#[test]
fn test_combine_rejects_swapped_signatures() {
    let (service, _node) = service();
    let origin = keypair(0x11);
    let delegator = keypair(0x22);
    let ops = intent(&account_of(&origin));

    let mut request_meta = Metadata::new();
    request_meta.insert(
        keys::FEE_DELEGATOR_ACCOUNT.to_string(),
        json!(address_of(&delegator)),
    );
    let pre = service
        .preprocess(&ConstructionPreprocessRequest {
            operations: ops.clone(),
            metadata: request_meta,
        })
        .unwrap();
    let meta = service
        .metadata(&ConstructionMetadataRequest {
            options: pre.options,
        })
        .unwrap();
    let payloads = service
        .payloads(&ConstructionPayloadsRequest {
            operations: ops,
            metadata: meta.metadata,
            public_keys: vec![public_key(&origin), public_key(&delegator)],
        })
        .unwrap();

    let result = service.combine(&ConstructionCombineRequest {
        unsigned_transaction: payloads.unsigned_transaction.clone(),
        signatures: vec![
            sign(&delegator, &payloads.payloads[1]),
            sign(&origin, &payloads.payloads[0]),
        ],
    });
    assert!(result.is_err());

    let result = service.combine(&ConstructionCombineRequest {
        unsigned_transaction: payloads.unsigned_transaction,
        signatures: vec![sign(&origin, &payloads.payloads[0])],
    });
    assert!(matches!(result, Err(MeshError::Build(_))));
}

#[test]
fn test_payloads_rejects_key_of_other_account() {
    let (service, _node) = service();
    let origin = keypair(0x11);
    let stranger = keypair(0x44);
    let ops = intent(&account_of(&origin));

    let pre = service
        .preprocess(&ConstructionPreprocessRequest {
            operations: ops.clone(),
            metadata: Metadata::new(),
        })
        .unwrap();
    let meta = service
        .metadata(&ConstructionMetadataRequest {
            options: pre.options,
        })
        .unwrap();

    let err = service
        .payloads(&ConstructionPayloadsRequest {
            operations: ops,
            metadata: meta.metadata,
            public_keys: vec![public_key(&stranger)],
        })
        .unwrap_err();
    assert!(matches!(
        err,
        MeshError::Build(BuildError::InvalidRequest { .. })
    ));
}

// ============================================================================
// Currencies
// ============================================================================

#[test]
fn test_parse_names_tokens_from_config_and_node() {
    let configured = Address::repeat_byte(0xc1);
    let resolved = Address::repeat_byte(0xc2);
    let config = Config::builder()
        .token(TokenEntry::new(format_address(&configured), "CFG", 6))
        .build();
    let node = Arc::new(FixtureNode::new().with_token(resolved, "NODE", 8));
    let service = ConstructionService::new(config, node).unwrap();

    let origin = keypair(0x55);
    let from = account_of(&origin);
    let to = AccountIdentifier::new(format_address(&RECIPIENT));
    let token = |symbol: &str, decimals: u32, contract: &Address| {
        Currency::new(symbol, decimals).with_contract(format_address(contract))
    };
    let ops = vec![
        transfer(0, from.clone(), Amount::debit(U256::from(5u64), token("CFG", 6, &configured))),
        transfer(1, to.clone(), Amount::credit(U256::from(5u64), token("CFG", 6, &configured)))
            .related_to(0),
        transfer(2, from.clone(), Amount::debit(U256::from(7u64), token("NODE", 8, &resolved))),
        transfer(3, to.clone(), Amount::credit(U256::from(7u64), token("NODE", 8, &resolved)))
            .related_to(2),
        transfer(4, from, Amount::debit(U256::from(9u64), token("X", 18, &Address::repeat_byte(0xc3)))),
        transfer(5, to, Amount::credit(U256::from(9u64), token("X", 18, &Address::repeat_byte(0xc3))))
            .related_to(4),
    ];

    let pre = service
        .preprocess(&ConstructionPreprocessRequest {
            operations: ops.clone(),
            metadata: Metadata::new(),
        })
        .unwrap();
    let meta = service
        .metadata(&ConstructionMetadataRequest {
            options: pre.options,
        })
        .unwrap();
    let payloads = service
        .payloads(&ConstructionPayloadsRequest {
            operations: ops,
            metadata: meta.metadata,
            public_keys: vec![public_key(&origin)],
        })
        .unwrap();
    let parsed = service
        .parse(&ConstructionParseRequest {
            signed: false,
            transaction: payloads.unsigned_transaction,
        })
        .unwrap();

    let symbols: Vec<_> = parsed
        .operations
        .iter()
        .map(|op| {
            let currency = &op.amount.as_ref().unwrap().currency;
            (currency.symbol.clone(), currency.decimals)
        })
        .collect();
    assert_eq!(
        symbols,
        vec![
            ("CFG".to_string(), 6),
            ("CFG".to_string(), 6),
            ("NODE".to_string(), 8),
            ("NODE".to_string(), 8),
            ("UNKNOWN".to_string(), 18),
            ("UNKNOWN".to_string(), 18),
        ]
    );
    assert_eq!(
        parsed.operations[2].amount.as_ref().unwrap().currency.contract_address(),
        Some(format_address(&resolved).as_str())
    );
}

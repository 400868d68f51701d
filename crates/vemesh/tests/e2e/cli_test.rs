//! Command handlers driven through request files, fully offline.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    dead_code
)]

use alloy_primitives::{hex, Address, U256};
use vemesh::cli::commands::exit_codes::{EXIT_ERROR, EXIT_INVALID_REQUEST};
use vemesh::cli::commands::{
    CombineCommand, CommandError, DeriveCommand, HashCommand, ParseCommand, PayloadsCommand,
    PreprocessCommand, SignCommand,
};
use vemesh::cli::CurveArg;
use vemesh::construction::{
    ConstructionCombineRequest, ConstructionPayloadsRequest, ConstructionPreprocessRequest,
};
use vemesh_chain::currency::vet;
use vemesh_chain::{intrinsic_gas, Clause, ConstructionMetadata, FeeParams};
use vemesh_core::encoding::format_address;
use vemesh_core::types::{AccountIdentifier, Amount, Metadata, Operation, OperationType};

use crate::common::{account_of, address_of, keypair, public_key, temp_config, write_json};

// ============================================================================
// Helpers
// ============================================================================

fn transfer_ops(from: &AccountIdentifier, value: u64) -> Vec<Operation> {
    let to = AccountIdentifier::new(format_address(&Address::repeat_byte(0x99)));
    vec![
        Operation::new(0, OperationType::Transfer)
            .with_account(from.clone())
            .with_amount(Amount::debit(U256::from(value), vet())),
        Operation::new(1, OperationType::Transfer)
            .with_account(to)
            .with_amount(Amount::credit(U256::from(value), vet()))
            .related_to(0),
    ]
}

/// Metadata a node would have answered for a single VET transfer.
fn offline_metadata() -> Metadata {
    let clause = Clause::transfer(Address::repeat_byte(0x99), U256::from(1u64));
    ConstructionMetadata {
        block_ref: 0x0000_1234_abcd_ef00,
        chain_tag: 0x27,
        gas: intrinsic_gas(&[clause]),
        nonce: 7,
        fee: FeeParams::Legacy { gas_price_coef: 0 },
        fee_delegator: None,
        expiration: None,
    }
    .to_map()
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_derive_command() {
    let (_dir, config) = temp_config();
    let key = keypair(0x11);
    let response = DeriveCommand::new(
        hex::encode(key.public_key().compressed()),
        CurveArg::Secp256k1,
        Some(config),
    )
    .execute()
    .unwrap();
    assert_eq!(response.account_identifier, account_of(&key));
}

#[test]
fn test_offline_round_trip_through_files() {
    let (dir, config) = temp_config();
    let key = keypair(0x11);
    let ops = transfer_ops(&account_of(&key), 1);

    let pre_file = write_json(
        dir.path(),
        "preprocess.json",
        &ConstructionPreprocessRequest {
            operations: ops.clone(),
            metadata: Metadata::new(),
        },
    );
    let pre = PreprocessCommand::new(pre_file, Some(config.clone()))
        .execute()
        .unwrap();
    assert_eq!(pre.required_public_keys, vec![account_of(&key)]);

    let payloads_file = write_json(
        dir.path(),
        "payloads.json",
        &ConstructionPayloadsRequest {
            operations: ops,
            metadata: offline_metadata(),
            public_keys: vec![public_key(&key)],
        },
    );
    let payloads = PayloadsCommand::new(payloads_file, Some(config.clone()))
        .execute()
        .unwrap();
    assert_eq!(payloads.payloads.len(), 1);

    let secret = hex::encode([0x11u8; 32]);
    let signature = SignCommand::new(payloads.payloads[0].hex_bytes.clone(), secret)
        .execute()
        .unwrap();
    assert_eq!(
        signature.signing_payload.account_identifier.address,
        address_of(&key)
    );

    let combine_file = write_json(
        dir.path(),
        "combine.json",
        &ConstructionCombineRequest {
            unsigned_transaction: payloads.unsigned_transaction.clone(),
            signatures: vec![signature],
        },
    );
    let combined = CombineCommand::new(combine_file, Some(config.clone()))
        .execute()
        .unwrap();

    let parsed = ParseCommand::new(combined.signed_transaction.clone(), true, Some(config.clone()))
        .execute()
        .unwrap();
    assert_eq!(parsed.account_identifier_signers, vec![account_of(&key)]);
    assert_eq!(parsed.operations.len(), 2);

    let unsigned = ParseCommand::new(payloads.unsigned_transaction, false, Some(config.clone()))
        .execute()
        .unwrap();
    assert_eq!(unsigned.operations, parsed.operations);

    let hash = HashCommand::new(combined.signed_transaction, Some(config))
        .execute()
        .unwrap();
    assert!(hash.transaction_identifier.hash.starts_with("0x"));
    assert_eq!(hash.transaction_identifier.hash.len(), 66);
}

#[test]
fn test_exit_codes() {
    let (dir, config) = temp_config();

    let missing = PreprocessCommand::new(dir.path().join("missing.json"), Some(config.clone()))
        .execute()
        .unwrap_err();
    assert!(matches!(missing, CommandError::ReadFailed { .. }));
    assert_eq!(missing.exit_code(), EXIT_ERROR);

    let garbage = dir.path().join("garbage.json");
    std::fs::write(&garbage, "{ not json").unwrap();
    let invalid = PreprocessCommand::new(garbage, Some(config.clone()))
        .execute()
        .unwrap_err();
    assert_eq!(invalid.exit_code(), EXIT_INVALID_REQUEST);

    let bad_hex = HashCommand::new("0xzz", Some(config.clone()))
        .execute()
        .unwrap_err();
    assert_eq!(bad_hex.exit_code(), EXIT_INVALID_REQUEST);

    let no_config = HashCommand::new("0x", Some(dir.path().join("other").join("config.toml")))
        .execute()
        .unwrap_err();
    assert!(matches!(no_config, CommandError::Config(_)));
    assert_eq!(no_config.exit_code(), EXIT_ERROR);
}

//! Committed and pending transactions read from node JSON.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::indexing_slicing,
    dead_code
)]

use std::sync::Arc;

use serde_json::json;
use vemesh::construction::ConstructionService;
use vemesh::reader::{transaction_operations, NodeReceipt, NodeTransaction};
use vemesh_core::config::Config;
use vemesh_core::types::{keys, OperationStatus, OperationType};

use crate::common::FixtureNode;

const ORIGIN: &str = "0x7567d83b7b8d80addcb281a71d54fc7b3364ffed";
const RECIPIENT: &str = "0x0000000000000000000000000000000000000001";
const ENERGY: &str = "0x0000000000000000000000000000456e65726779";

/// A VTHO `transfer(RECIPIENT, 16)` followed by a call with other data.
fn multi_clause_tx() -> NodeTransaction {
    let transfer = format!(
        "0xa9059cbb{:0>64}{:0>64}",
        RECIPIENT.trim_start_matches("0x"),
        "10"
    );
    serde_json::from_value(json!({
        "id": "0x4de71e2d0a9ed3a9c29b3e7c7fa0c7c9bb6c2bd1eb5d5d3b1c6d2f0a5a8c9e0f",
        "origin": ORIGIN,
        "delegator": null,
        "clauses": [
            { "to": ENERGY, "value": "0x0", "data": transfer },
            { "to": RECIPIENT, "value": "0x0", "data": "0xdeadbeef" }
        ],
        "gas": 80000
    }))
    .unwrap()
}

#[test]
fn test_committed_multi_clause_transaction() {
    let service =
        ConstructionService::new(Config::default(), Arc::new(FixtureNode::new())).unwrap();
    let receipt: NodeReceipt = serde_json::from_value(json!({
        "gasUsed": 52000,
        "gasPayer": ORIGIN,
        "paid": "0x2c68af0bb140000",
        "reverted": false
    }))
    .unwrap();

    let ops =
        transaction_operations(service.registry(), &multi_clause_tx(), Some(&receipt)).unwrap();

    let types: Vec<_> = ops.iter().map(|op| op.op_type).collect();
    assert_eq!(
        types,
        vec![
            OperationType::Transfer,
            OperationType::Transfer,
            OperationType::ContractCall,
            OperationType::Fee,
        ]
    );
    assert_eq!(ops[0].amount.as_ref().unwrap().value, "-16");
    assert_eq!(ops[0].amount.as_ref().unwrap().currency.symbol, "VTHO");
    assert_eq!(ops[2].amount.as_ref().unwrap().value, "0");
    assert_eq!(ops[2].metadata[keys::DATA], "0xdeadbeef");
    assert_eq!(ops[3].amount.as_ref().unwrap().value, "-200000000000000000");
    assert!(ops.iter().all(|op| op.status == Some(OperationStatus::Succeeded)));

    for (i, op) in ops.iter().enumerate() {
        assert_eq!(op.index(), i as u64);
    }
}

#[test]
fn test_pending_transaction_has_no_status() {
    let registry = vemesh_chain::CurrencyRegistry::new();
    let ops = transaction_operations(&registry, &multi_clause_tx(), None).unwrap();
    assert!(ops.iter().all(|op| op.status.is_none()));
    assert_eq!(ops.last().unwrap().metadata[keys::GAS], 80000);
}

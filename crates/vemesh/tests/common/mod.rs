//! # Test Utilities for vemesh
//!
//! - [`FixtureNode`] - Deterministic in-process node
//! - [`keypair`] / [`public_key`] / [`sign`] - Offline signing helpers
//! - [`temp_config`] - Isolated configuration directory
//! - [`write_json`] - Request files for CLI commands

#![allow(dead_code)]
#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use alloy_primitives::{hex, Address, B256, U256};
use serde::Serialize;
use tempfile::TempDir;
use vemesh::node::{BestBlock, DynamicGasPrice, NodeClient, NodeResult};
use vemesh_chain::{TokenInfo, Transaction};
use vemesh_core::config::Config;
use vemesh_core::encoding::format_address;
use vemesh_core::error::NodeError;
use vemesh_core::types::{AccountIdentifier, CurveType, PublicKey, Signature, SignatureType, SigningPayload};
use vemesh_crypto::{Secp256k1KeyPair, SecretKey};

/// Testnet chain tag.
pub const CHAIN_TAG: u8 = 0x27;

/// Base fee the fixture node reports, 10^13 wei per gas.
pub const BASE_FEE: u64 = 10_000_000_000_000;

/// Priority fee the fixture node suggests.
pub const REWARD: u64 = 1_000_000_000;

// ============================================================================
// FixtureNode
// ============================================================================

/// A node with fixed answers that records what it is sent.
#[derive(Debug, Default)]
pub struct FixtureNode {
    tokens: Vec<(Address, TokenInfo)>,
    submitted: Mutex<Vec<Transaction>>,
}

impl FixtureNode {
    /// A node that knows no tokens.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer token lookups for `contract`.
    pub fn with_token(mut self, contract: Address, symbol: &str, decimals: u32) -> Self {
        self.tokens.push((contract, TokenInfo::new(symbol, decimals)));
        self
    }

    /// Transactions accepted so far.
    pub fn submitted(&self) -> Vec<Transaction> {
        self.submitted.lock().unwrap().clone()
    }

    /// The best block this node reports.
    pub fn best() -> BestBlock {
        let mut id = [0x5au8; 32];
        id[..8].copy_from_slice(&[0x00, 0x01, 0x02, 0x03, 0xde, 0xad, 0xbe, 0xef]);
        BestBlock {
            id: B256::from(id),
            number: 0x0001_0203,
        }
    }
}

impl NodeClient for FixtureNode {
    fn resolve_token_currency(&self, contract: &Address) -> NodeResult<TokenInfo> {
        self.tokens
            .iter()
            .find(|(c, _)| c == contract)
            .map(|(_, info)| info.clone())
            .ok_or_else(|| NodeError::unavailable("resolve_token_currency", "execution reverted"))
    }

    fn best_block(&self) -> NodeResult<BestBlock> {
        Ok(Self::best())
    }

    fn chain_tag(&self) -> NodeResult<u8> {
        Ok(CHAIN_TAG)
    }

    fn dynamic_gas_price(&self) -> NodeResult<DynamicGasPrice> {
        Ok(DynamicGasPrice {
            base_fee: U256::from(BASE_FEE),
            reward: U256::from(REWARD),
        })
    }

    fn submit(&self, signed: &[u8]) -> NodeResult<B256> {
        let tx = Transaction::decode(signed).map_err(|e| NodeError::rejected(e.to_string()))?;
        let id = tx.id().map_err(|e| NodeError::rejected(e.to_string()))?;
        self.submitted.lock().unwrap().push(tx);
        Ok(id)
    }
}

// ============================================================================
// Keys and signatures
// ============================================================================

/// A deterministic key pair whose secret is `byte` repeated.
pub fn keypair(byte: u8) -> Secp256k1KeyPair {
    Secp256k1KeyPair::from_secret_key(&SecretKey::new([byte; 32])).expect("valid secret")
}

/// Checksummed address of a key pair.
pub fn address_of(keypair: &Secp256k1KeyPair) -> String {
    format_address(&keypair.public_key().address())
}

/// Account identifier of a key pair.
pub fn account_of(keypair: &Secp256k1KeyPair) -> AccountIdentifier {
    AccountIdentifier::new(address_of(keypair))
}

/// Mesh public key of a key pair.
pub fn public_key(keypair: &Secp256k1KeyPair) -> PublicKey {
    PublicKey {
        hex_bytes: hex::encode(keypair.public_key().compressed()),
        curve_type: CurveType::Secp256k1,
    }
}

/// Sign a payload the way a wallet would.
pub fn sign(keypair: &Secp256k1KeyPair, payload: &SigningPayload) -> Signature {
    let hash = B256::from_slice(&hex::decode(&payload.hex_bytes).expect("payload hex"));
    Signature {
        signing_payload: payload.clone(),
        public_key: public_key(keypair),
        signature_type: SignatureType::EcdsaRecovery,
        hex_bytes: hex::encode(keypair.sign(&hash).expect("sign").to_bytes()),
    }
}

// ============================================================================
// Files
// ============================================================================

/// A temporary directory holding a default `config.toml`.
///
/// Returns the directory guard and the configuration path.
pub fn temp_config() -> (TempDir, PathBuf) {
    let dir = tempfile::Builder::new()
        .prefix("vemesh-test-")
        .tempdir()
        .expect("temp dir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, Config::default_toml()).expect("write config");
    (dir, path)
}

/// Write `value` as JSON to `dir/name` and return the path.
pub fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, serde_json::to_vec_pretty(value).expect("json")).expect("write json");
    path
}

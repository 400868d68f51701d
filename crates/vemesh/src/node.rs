//! Chain node access.
//!
//! The construction service only needs a handful of node queries, all
//! behind [`NodeClient`]. Transport is left to the implementor; this crate
//! ships an [`OfflineNode`] for offline flows and, with the `mock` feature,
//! an in-memory [`MockNode`].

use std::sync::Arc;

use alloy_primitives::{Address, B256, U256};
use vemesh_chain::{intrinsic_gas, Clause, TokenInfo, TokenResolver};
use vemesh_core::error::NodeError;

/// Result type for node calls.
pub type NodeResult<T> = Result<T, NodeError>;

/// Head of the chain as seen by the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BestBlock {
    /// Block id; its first 8 bytes are the `blockRef`.
    pub id: B256,
    /// Block number.
    pub number: u32,
}

impl BestBlock {
    /// The `blockRef` of this block.
    #[must_use]
    pub fn block_ref(&self) -> u64 {
        let [b0, b1, b2, b3, b4, b5, b6, b7, ..] = self.id.0;
        u64::from_be_bytes([b0, b1, b2, b3, b4, b5, b6, b7])
    }
}

/// Current dynamic-fee pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DynamicGasPrice {
    /// Base fee per gas of the next block.
    pub base_fee: U256,
    /// Suggested priority fee per gas.
    pub reward: U256,
}

/// Queries the construction flow makes against a Thor node.
pub trait NodeClient: Send + Sync {
    /// Symbol and decimals of a token contract.
    ///
    /// # Errors
    ///
    /// Returns a [`NodeError`] if the node cannot be reached or the contract
    /// does not answer.
    fn resolve_token_currency(&self, contract: &Address) -> NodeResult<TokenInfo>;

    /// The best block.
    ///
    /// # Errors
    ///
    /// Returns a [`NodeError`] if the node cannot be reached.
    fn best_block(&self) -> NodeResult<BestBlock>;

    /// Last byte of the genesis block id.
    ///
    /// # Errors
    ///
    /// Returns a [`NodeError`] if the node cannot be reached.
    fn chain_tag(&self) -> NodeResult<u8>;

    /// Base fee and priority fee suggestion.
    ///
    /// # Errors
    ///
    /// Returns a [`NodeError`] if the node cannot be reached.
    fn dynamic_gas_price(&self) -> NodeResult<DynamicGasPrice>;

    /// Gas required by `clauses` before execution.
    ///
    /// Defaults to the local intrinsic gas rule.
    ///
    /// # Errors
    ///
    /// Implementations that ask the node return a [`NodeError`] on failure.
    fn estimate_intrinsic_gas(&self, clauses: &[Clause]) -> NodeResult<u64> {
        Ok(intrinsic_gas(clauses))
    }

    /// Broadcast a signed transaction, returning its id.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::Rejected`] if the node refuses the transaction.
    fn submit(&self, signed: &[u8]) -> NodeResult<B256>;
}

/// Adapts a [`NodeClient`] into the currency registry's resolver.
pub struct NodeTokenResolver<N> {
    node: Arc<N>,
}

impl<N> NodeTokenResolver<N> {
    /// Wrap a shared node.
    #[must_use]
    pub const fn new(node: Arc<N>) -> Self {
        Self { node }
    }
}

impl<N: NodeClient> TokenResolver for NodeTokenResolver<N> {
    fn resolve_token(&self, contract: &Address) -> Result<TokenInfo, NodeError> {
        self.node.resolve_token_currency(contract)
    }
}

/// A node that refuses every online call.
///
/// Intrinsic gas still works since it needs no node.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineNode;

impl NodeClient for OfflineNode {
    fn resolve_token_currency(&self, _contract: &Address) -> NodeResult<TokenInfo> {
        Err(NodeError::offline("resolve_token_currency"))
    }

    fn best_block(&self) -> NodeResult<BestBlock> {
        Err(NodeError::offline("best_block"))
    }

    fn chain_tag(&self) -> NodeResult<u8> {
        Err(NodeError::offline("chain_tag"))
    }

    fn dynamic_gas_price(&self) -> NodeResult<DynamicGasPrice> {
        Err(NodeError::offline("dynamic_gas_price"))
    }

    fn submit(&self, _signed: &[u8]) -> NodeResult<B256> {
        Err(NodeError::offline("submit"))
    }
}

#[cfg(any(test, feature = "mock"))]
pub use mock::MockNode;

#[cfg(any(test, feature = "mock"))]
mod mock {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use alloy_primitives::{Address, B256, U256};
    use vemesh_chain::{TokenInfo, Transaction};
    use vemesh_core::error::NodeError;

    use super::{BestBlock, DynamicGasPrice, NodeClient, NodeResult};

    /// In-memory node with fixed answers.
    ///
    /// Submitted transactions are decoded, recorded, and answered with
    /// their id unless a rejection reason is set.
    #[derive(Debug)]
    pub struct MockNode {
        best_block: BestBlock,
        chain_tag: u8,
        gas_price: DynamicGasPrice,
        tokens: HashMap<Address, TokenInfo>,
        reject: Option<String>,
        unavailable: bool,
        submitted: Mutex<Vec<Vec<u8>>>,
    }

    impl Default for MockNode {
        fn default() -> Self {
            Self {
                best_block: BestBlock {
                    id: B256::repeat_byte(0x42),
                    number: 1,
                },
                chain_tag: 0xf6,
                gas_price: DynamicGasPrice {
                    base_fee: U256::from(10_000_000_000_000u64),
                    reward: U256::from(1_000_000_000u64),
                },
                tokens: HashMap::new(),
                reject: None,
                unavailable: false,
                submitted: Mutex::new(Vec::new()),
            }
        }
    }

    impl MockNode {
        /// A node with default answers.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Set the best block.
        #[must_use]
        pub fn with_best_block(mut self, best_block: BestBlock) -> Self {
            self.best_block = best_block;
            self
        }

        /// Set the chain tag.
        #[must_use]
        pub fn with_chain_tag(mut self, chain_tag: u8) -> Self {
            self.chain_tag = chain_tag;
            self
        }

        /// Set the dynamic gas price.
        #[must_use]
        pub fn with_gas_price(mut self, gas_price: DynamicGasPrice) -> Self {
            self.gas_price = gas_price;
            self
        }

        /// Answer token lookups for `contract`.
        #[must_use]
        pub fn with_token(mut self, contract: Address, info: TokenInfo) -> Self {
            self.tokens.insert(contract, info);
            self
        }

        /// Reject every submission with `reason`.
        #[must_use]
        pub fn rejecting(mut self, reason: impl Into<String>) -> Self {
            self.reject = Some(reason.into());
            self
        }

        /// Fail every call as unreachable.
        #[must_use]
        pub fn unavailable(mut self) -> Self {
            self.unavailable = true;
            self
        }

        /// Raw bytes of every accepted submission.
        #[must_use]
        pub fn submitted(&self) -> Vec<Vec<u8>> {
            self.submitted
                .lock()
                .map(|s| s.clone())
                .unwrap_or_default()
        }

        fn check(&self, method: &str) -> NodeResult<()> {
            if self.unavailable {
                return Err(NodeError::unavailable(method, "connection refused"));
            }
            Ok(())
        }
    }

    impl NodeClient for MockNode {
        fn resolve_token_currency(&self, contract: &Address) -> NodeResult<TokenInfo> {
            self.check("resolve_token_currency")?;
            self.tokens.get(contract).cloned().ok_or_else(|| {
                NodeError::unavailable("resolve_token_currency", "contract did not answer")
            })
        }

        fn best_block(&self) -> NodeResult<BestBlock> {
            self.check("best_block")?;
            Ok(self.best_block)
        }

        fn chain_tag(&self) -> NodeResult<u8> {
            self.check("chain_tag")?;
            Ok(self.chain_tag)
        }

        fn dynamic_gas_price(&self) -> NodeResult<DynamicGasPrice> {
            self.check("dynamic_gas_price")?;
            Ok(self.gas_price)
        }

        fn submit(&self, signed: &[u8]) -> NodeResult<B256> {
            self.check("submit")?;
            if let Some(reason) = &self.reject {
                return Err(NodeError::rejected(reason.clone()));
            }

            let id = Transaction::decode(signed)
                .map_err(|e| NodeError::rejected(e.to_string()))?
                .id()
                .map_err(|e| NodeError::rejected(e.to_string()))?;
            if let Ok(mut submitted) = self.submitted.lock() {
                submitted.push(signed.to_vec());
            }
            Ok(id)
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]

    use super::*;

    #[test]
    fn test_block_ref_is_id_prefix() {
        let mut id = [0u8; 32];
        id[..8].copy_from_slice(&[0, 0, 0x01, 0x02, 0xaa, 0xbb, 0xcc, 0xdd]);
        id[8] = 0xff;
        let block = BestBlock {
            id: B256::from(id),
            number: 258,
        };
        assert_eq!(block.block_ref(), 0x0000_0102_aabb_ccdd);
    }

    #[test]
    fn test_offline_node_refuses_online_calls() {
        let node = OfflineNode;
        assert!(matches!(node.best_block(), Err(NodeError::Offline { .. })));
        assert!(matches!(node.chain_tag(), Err(NodeError::Offline { .. })));
        assert!(matches!(
            node.dynamic_gas_price(),
            Err(NodeError::Offline { .. })
        ));
        assert!(matches!(node.submit(&[0xc0]), Err(NodeError::Offline { .. })));
        assert!(matches!(
            node.resolve_token_currency(&Address::ZERO),
            Err(NodeError::Offline { .. })
        ));
    }

    #[test]
    fn test_offline_node_estimates_locally() {
        let clauses = vec![Clause::transfer(Address::repeat_byte(1), U256::from(1u64))];
        assert_eq!(
            OfflineNode.estimate_intrinsic_gas(&clauses).unwrap(),
            intrinsic_gas(&clauses)
        );
    }

    #[test]
    fn test_token_resolver_delegates_to_node() {
        let contract = Address::repeat_byte(0xcc);
        let node = Arc::new(MockNode::new().with_token(contract, TokenInfo::new("TKN", 6)));
        let resolver = NodeTokenResolver::new(node);

        let info = resolver.resolve_token(&contract).unwrap();
        assert_eq!(info.symbol, "TKN");
        assert_eq!(info.decimals, 6);
        assert!(resolver.resolve_token(&Address::repeat_byte(0xdd)).is_err());
    }

    #[test]
    fn test_mock_node_rejection() {
        let node = MockNode::new().rejecting("insufficient energy");
        assert!(matches!(node.submit(&[0xc0]), Err(NodeError::Rejected { .. })));
        assert!(node.submitted().is_empty());
    }

    #[test]
    fn test_mock_node_unavailable() {
        let node = MockNode::new().unavailable();
        assert!(matches!(
            node.best_block(),
            Err(NodeError::Unavailable { .. })
        ));
    }
}

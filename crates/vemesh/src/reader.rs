//! Read path: committed and pending transactions to operations.
//!
//! The node reports transactions and receipts as JSON. Only the fields the
//! parser needs are modeled; everything else is ignored.

use serde::{Deserialize, Serialize};
use vemesh_chain::{ClauseParser, CurrencyRegistry, FeeCharge, NodeClause, ParseContext};
use vemesh_core::encoding::{parse_address, parse_quantity};
use vemesh_core::error::ParseResult;
use vemesh_core::types::{Operation, OperationStatus};
use vemesh_core::U256;

/// A transaction as returned by `GET /transactions/{id}` or a block expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTransaction {
    /// Transaction id.
    pub id: String,
    /// Sender.
    pub origin: String,
    /// Fee payer, `null` unless delegated.
    #[serde(default)]
    pub delegator: Option<String>,
    /// Clauses in execution order.
    #[serde(default)]
    pub clauses: Vec<NodeClause>,
    /// Gas limit.
    pub gas: u64,
}

/// A receipt as returned by `GET /transactions/{id}/receipt`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeReceipt {
    /// Gas consumed.
    pub gas_used: u64,
    /// Account that paid the fee.
    #[serde(default)]
    pub gas_payer: Option<String>,
    /// Energy paid, `0x`-hex.
    pub paid: String,
    /// Whether execution reverted.
    pub reverted: bool,
}

impl NodeReceipt {
    /// The paid amount.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidAmount`](vemesh_core::error::ParseError::InvalidAmount)
    /// if `paid` is not a quantity.
    pub fn paid_amount(&self) -> ParseResult<U256> {
        parse_quantity(&self.paid)
    }

    /// Execution status.
    #[must_use]
    pub const fn status(&self) -> OperationStatus {
        if self.reverted {
            OperationStatus::Reverted
        } else {
            OperationStatus::Succeeded
        }
    }
}

/// Operations of a transaction.
///
/// With a receipt, every operation carries the execution status and the fee
/// records what was paid. Without one the transaction is pending: there is
/// no status and the fee records the gas limit.
///
/// # Errors
///
/// Returns a [`ParseError`](vemesh_core::error::ParseError) for a malformed
/// origin, delegator, clause value, or paid amount.
pub fn transaction_operations(
    registry: &CurrencyRegistry,
    tx: &NodeTransaction,
    receipt: Option<&NodeReceipt>,
) -> ParseResult<Vec<Operation>> {
    let origin = parse_address(&tx.origin)?;
    let delegator = tx.delegator.as_deref().map(parse_address).transpose()?;

    let mut ctx = ParseContext::new(origin).with_delegator(delegator);
    ctx = match receipt {
        Some(receipt) => ctx
            .with_fee(FeeCharge {
                gas: receipt.gas_used,
                amount: receipt.paid_amount()?,
            })
            .with_status(receipt.status()),
        None => ctx.with_fee(FeeCharge::raw(tx.gas)),
    };

    tracing::debug!(
        id = %tx.id,
        clauses = tx.clauses.len(),
        committed = receipt.is_some(),
        "reading transaction"
    );
    ClauseParser::new(registry).parse(&tx.clauses, &ctx)
}

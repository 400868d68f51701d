//! Intrinsic gas.
//!
//! The gas a transaction consumes before any contract code runs. Computed
//! locally so that offline metadata and the node client default agree.

use crate::clause::ClauseView;

/// Base cost of every transaction.
pub const TX_GAS: u64 = 5_000;

/// Cost of a clause with a destination.
pub const CLAUSE_GAS: u64 = 16_000;

/// Cost of a contract-creating clause.
pub const CLAUSE_GAS_CONTRACT_CREATION: u64 = 48_000;

/// Cost per zero byte of call data.
pub const ZERO_BYTE_GAS: u64 = 4;

/// Cost per non-zero byte of call data.
pub const NON_ZERO_BYTE_GAS: u64 = 68;

/// Intrinsic gas of a clause list.
///
/// An empty list is charged as a single clause with a destination.
/// Saturates instead of overflowing.
///
/// ```
/// use alloy_primitives::{Address, U256};
/// use vemesh_chain::clause::Clause;
/// use vemesh_chain::gas::intrinsic_gas;
///
/// let clause = Clause::transfer(Address::repeat_byte(1), U256::from(1u64));
/// assert_eq!(intrinsic_gas(&[clause]), 21_000);
/// assert_eq!(intrinsic_gas::<Clause>(&[]), 21_000);
/// ```
#[must_use]
pub fn intrinsic_gas<C: ClauseView>(clauses: &[C]) -> u64 {
    if clauses.is_empty() {
        return TX_GAS + CLAUSE_GAS;
    }

    clauses.iter().fold(TX_GAS, |total, clause| {
        let base = if clause.destination().is_some() {
            CLAUSE_GAS
        } else {
            CLAUSE_GAS_CONTRACT_CREATION
        };
        total
            .saturating_add(base)
            .saturating_add(data_gas(&clause.raw_data()))
    })
}

/// Gas charged for call data.
#[must_use]
pub fn data_gas(data: &[u8]) -> u64 {
    data.iter().fold(0u64, |gas, &b| {
        gas.saturating_add(if b == 0 {
            ZERO_BYTE_GAS
        } else {
            NON_ZERO_BYTE_GAS
        })
    })
}

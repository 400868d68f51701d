//! Clause parser.
//!
//! Forward: clauses plus transaction context become Mesh operations.
//! Reverse: the positive `Transfer` operations of a request become clauses.
//!
//! Classification precedence per clause:
//!
//! 1. Token transfer (zero value, destination present, call data decodes as
//!    `transfer(address,uint256)`): debit origin, credit recipient, in the
//!    token's currency.
//! 2. Value transfer (value > 0): debit origin, and credit the destination
//!    unless it is absent or the zero address.
//! 3. Contract call (any remaining data): a zero-amount `ContractCall` on
//!    origin. May follow a value transfer from the same clause.
//!
//! The fee operation, if any, is always last. Indices count from zero in
//! emission order.

use alloy_primitives::{Address, U256};
use vemesh_core::encoding::{encode_hex, format_address, parse_address};
use vemesh_core::error::{BuildError, BuildResult, ParseResult};
use vemesh_core::types::{
    keys, AccountIdentifier, Amount, Currency, Operation, OperationStatus, OperationType,
};

use crate::abi::{decode_transfer, encode_transfer};
use crate::clause::{Clause, ClauseView};
use crate::currency::{vet, vtho, CurrencyRegistry};

/// Gas charged to a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeCharge {
    /// Gas used, or the gas limit when unknown.
    pub gas: u64,
    /// Amount recorded on the fee operation, verbatim.
    pub amount: U256,
}

impl FeeCharge {
    /// A fee whose amount is the raw gas count.
    #[must_use]
    pub fn raw(gas: u64) -> Self {
        Self {
            gas,
            amount: U256::from(gas),
        }
    }
}

/// Transaction-level context for [`ClauseParser::parse`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseContext {
    /// Sender.
    pub origin: Address,
    /// Fee payer, for delegated transactions.
    pub delegator: Option<Address>,
    /// Fee to record; `None` or zero gas emits no fee operation.
    pub fee: Option<FeeCharge>,
    /// Execution outcome; `None` while constructing or pending.
    pub status: Option<OperationStatus>,
}

impl ParseContext {
    /// Context with only an origin.
    #[must_use]
    pub const fn new(origin: Address) -> Self {
        Self {
            origin,
            delegator: None,
            fee: None,
            status: None,
        }
    }

    /// Set the delegator.
    #[must_use]
    pub const fn with_delegator(mut self, delegator: Option<Address>) -> Self {
        self.delegator = delegator;
        self
    }

    /// Set the fee.
    #[must_use]
    pub const fn with_fee(mut self, fee: FeeCharge) -> Self {
        self.fee = Some(fee);
        self
    }

    /// Set the status.
    #[must_use]
    pub const fn with_status(mut self, status: OperationStatus) -> Self {
        self.status = Some(status);
        self
    }

    fn charged_fee(&self) -> Option<FeeCharge> {
        self.fee.filter(|fee| fee.gas > 0)
    }
}

/// Derives operations from clauses.
#[derive(Debug, Clone, Copy)]
pub struct ClauseParser<'a> {
    registry: &'a CurrencyRegistry,
}

/// Appends operations with running indices.
struct Emitter {
    ops: Vec<Operation>,
    status: Option<OperationStatus>,
}

impl Emitter {
    fn next_index(&self) -> u64 {
        self.ops.len() as u64
    }

    fn push(&mut self, op_type: OperationType, account: &Address, amount: Amount) -> u64 {
        let index = self.next_index();
        self.ops.push(
            Operation::new(index, op_type)
                .with_status(self.status)
                .with_account(AccountIdentifier::new(format_address(account)))
                .with_amount(amount),
        );
        index
    }

    fn last_mut(&mut self) -> Option<&mut Operation> {
        self.ops.last_mut()
    }

    fn annotate(&mut self, clause_index: u64, f: impl FnOnce(Operation) -> Operation) {
        if let Some(op) = self.ops.pop() {
            let op = op
                .with_network_index(clause_index)
                .with_metadata(keys::CLAUSE_INDEX, clause_index);
            self.ops.push(f(op));
        }
    }

    /// A debit on `from` and, if `to` is given, the matching credit.
    fn transfer(
        &mut self,
        clause_index: u64,
        from: &Address,
        to: Option<&Address>,
        value: U256,
        currency: &Currency,
    ) {
        let debit = self.push(
            OperationType::Transfer,
            from,
            Amount::debit(value, currency.clone()),
        );
        self.annotate(clause_index, |op| op);

        if let Some(to) = to {
            self.push(
                OperationType::Transfer,
                to,
                Amount::credit(value, currency.clone()),
            );
            self.annotate(clause_index, |op| op.related_to(debit));
        }
    }
}

impl<'a> ClauseParser<'a> {
    /// Create a parser resolving tokens through `registry`.
    #[must_use]
    pub const fn new(registry: &'a CurrencyRegistry) -> Self {
        Self { registry }
    }

    /// Derive the operations of a clause list.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::InvalidAmount`](vemesh_core::error::ParseError::InvalidAmount)
    /// if a clause's value is malformed. Nothing else fails; unresolvable
    /// token currencies fall back to a placeholder.
    pub fn parse<C: ClauseView>(
        &self,
        clauses: &[C],
        ctx: &ParseContext,
    ) -> ParseResult<Vec<Operation>> {
        let values = clauses
            .iter()
            .map(ClauseView::value)
            .collect::<ParseResult<Vec<_>>>()?;

        let has_value = values.iter().any(|v| !v.is_zero());
        let has_data = clauses.iter().any(|c| !c.raw_data().is_empty());
        let fee = ctx.charged_fee();
        if !has_value && !has_data && fee.is_none() {
            return Ok(Vec::new());
        }

        let mut emitter = Emitter {
            ops: Vec::with_capacity(clauses.len() * 2 + 1),
            status: ctx.status,
        };

        for (i, (clause, value)) in clauses.iter().zip(values).enumerate() {
            self.parse_clause(&mut emitter, i as u64, clause, value, &ctx.origin);
        }

        if let Some(fee) = fee {
            let op_type = if ctx.delegator.is_some() {
                OperationType::FeeDelegation
            } else {
                OperationType::Fee
            };
            let fee_status = ctx.status.map(|_| OperationStatus::Succeeded);

            emitter.push(op_type, &ctx.origin, Amount::debit(fee.amount, vtho()));
            if let Some(op) = emitter.last_mut() {
                op.status = fee_status;
                op.metadata
                    .insert(keys::GAS.to_string(), serde_json::Value::from(fee.gas));
                if let Some(delegator) = &ctx.delegator {
                    op.metadata.insert(
                        keys::DELEGATOR_ADDRESS.to_string(),
                        serde_json::Value::from(format_address(delegator)),
                    );
                }
            }
        }

        tracing::debug!(
            clauses = clauses.len(),
            operations = emitter.ops.len(),
            "parsed clauses"
        );

        Ok(emitter.ops)
    }

    fn parse_clause<C: ClauseView>(
        &self,
        emitter: &mut Emitter,
        clause_index: u64,
        clause: &C,
        value: U256,
        origin: &Address,
    ) {
        let data = clause.raw_data();
        let destination = clause.destination();

        if value.is_zero() {
            if let Some(contract) = &destination {
                if let Some(transfer) = decode_transfer(&data) {
                    let currency = self.registry.currency_for(contract);
                    emitter.transfer(
                        clause_index,
                        origin,
                        Some(&transfer.recipient),
                        transfer.amount,
                        &currency,
                    );
                    return;
                }
            }
        }

        if !value.is_zero() {
            let credited = destination.as_ref().filter(|to| !to.is_zero());
            emitter.transfer(clause_index, origin, credited, value, &vet());
        }

        if !data.is_empty() {
            emitter.push(
                OperationType::ContractCall,
                origin,
                Amount::credit(U256::ZERO, vet()),
            );
            emitter.annotate(clause_index, |op| {
                let op = op.with_metadata(keys::DATA, encode_hex(&data));
                match &destination {
                    Some(to) => op.with_metadata(keys::TO, format_address(to)),
                    None => op,
                }
            });
        }
    }
}

/// Build clauses from the positive `Transfer` operations of a request.
///
/// Operations are processed in index order. Debits, fees, and contract
/// calls produce nothing.
///
/// # Errors
///
/// Returns [`BuildError::InvalidOperation`] naming the operation index if a
/// transfer's amount, account, or currency contract is malformed.
pub fn build_clauses(operations: &[Operation]) -> BuildResult<Vec<Clause>> {
    let mut sorted: Vec<&Operation> = operations.iter().collect();
    sorted.sort_by_key(|op| op.index());

    let mut clauses = Vec::new();
    for op in sorted {
        if op.op_type != OperationType::Transfer {
            continue;
        }
        let index = op.index();

        let amount = op
            .amount
            .as_ref()
            .ok_or_else(|| BuildError::invalid_operation(index, "transfer without amount"))?;
        let value = amount
            .signed_value()
            .map_err(|e| BuildError::invalid_operation(index, e.to_string()))?;
        if !value.is_positive() {
            continue;
        }

        let account = op
            .account
            .as_ref()
            .ok_or_else(|| BuildError::invalid_operation(index, "transfer without account"))?;
        let clause = match amount.currency.contract_address() {
            Some(contract) => {
                let contract = parse_address(contract)
                    .map_err(|e| BuildError::invalid_operation(index, e.to_string()))?;
                let data = encode_transfer(&account.address, &amount.value)
                    .map_err(|e| BuildError::invalid_operation(index, e.to_string()))?;
                Clause::call(contract, data)
            }
            None => {
                let to = parse_address(&account.address)
                    .map_err(|e| BuildError::invalid_operation(index, e.to_string()))?;
                Clause::transfer(to, value.magnitude)
            }
        };
        clauses.push(clause);
    }

    Ok(clauses)
}

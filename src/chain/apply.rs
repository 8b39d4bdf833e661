//! Applying transactions to a peer's ledger and pool
//!
//! Transactions run strictly in order. One whose checks fail is skipped
//! with no effect and the rest of the block still applies.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::chain::transaction::{AddLiquidity, Swap, Transaction, Transfer};
use crate::simulation::{ledger::Ledger, pool_state::PoolReserves};
use crate::utils::amm_math::SwapOutcome;

/// Why a transaction had no effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SkipReason {
    InsufficientFunds { participant: String, token: String },
    EmptyOutputReserve { token: String },
    /// Both legs name the same token
    SameToken { token: String },
    /// Negative, NaN or infinite amount
    InvalidAmount { amount: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApplyOutcome {
    Applied(Option<SwapOutcome>),
    Skipped(SkipReason),
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ApplyOutcome::Applied(_))
    }
}

/// Counts from applying one block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockReceipt {
    pub block_index: u64,
    pub applied: usize,
    pub skipped: usize,
}

fn insufficient(participant: &str, token: &str) -> ApplyOutcome {
    ApplyOutcome::Skipped(SkipReason::InsufficientFunds {
        participant: participant.to_string(),
        token: token.to_string(),
    })
}

fn invalid_amount(amounts: &[f64]) -> Option<ApplyOutcome> {
    amounts
        .iter()
        .find(|amount| !amount.is_finite() || **amount < 0.0)
        .map(|amount| ApplyOutcome::Skipped(SkipReason::InvalidAmount { amount: *amount }))
}

fn same_token(a: &str, b: &str) -> Option<ApplyOutcome> {
    (a == b).then(|| ApplyOutcome::Skipped(SkipReason::SameToken { token: a.to_string() }))
}

fn apply_transfer(ledger: &mut Ledger, tx: &Transfer) -> ApplyOutcome {
    if let Some(skip) = invalid_amount(&[tx.amount]) {
        return skip;
    }
    if !ledger.debit(&tx.sender, &tx.token, tx.amount) {
        return insufficient(&tx.sender, &tx.token);
    }
    ledger.credit(&tx.recipient, &tx.token, tx.amount);
    ApplyOutcome::Applied(None)
}

fn apply_add_liquidity(ledger: &mut Ledger, pool: &mut PoolReserves, tx: &AddLiquidity) -> ApplyOutcome {
    if let Some(skip) = invalid_amount(&[tx.amount_a, tx.amount_b]) {
        return skip;
    }
    if let Some(skip) = same_token(&tx.token_a, &tx.token_b) {
        return skip;
    }
    // Both legs are checked before either is debited.
    if !ledger.has_at_least(&tx.provider, &tx.token_a, tx.amount_a) {
        return insufficient(&tx.provider, &tx.token_a);
    }
    if !ledger.has_at_least(&tx.provider, &tx.token_b, tx.amount_b) {
        return insufficient(&tx.provider, &tx.token_b);
    }

    if !ledger.debit(&tx.provider, &tx.token_a, tx.amount_a) {
        return insufficient(&tx.provider, &tx.token_a);
    }
    if !ledger.debit(&tx.provider, &tx.token_b, tx.amount_b) {
        // Distinct tokens, so the first leg can be handed back unchanged.
        ledger.credit(&tx.provider, &tx.token_a, tx.amount_a);
        return insufficient(&tx.provider, &tx.token_b);
    }
    pool.add_reserve(&tx.token_a, tx.amount_a);
    pool.add_reserve(&tx.token_b, tx.amount_b);
    ApplyOutcome::Applied(None)
}

fn apply_swap(ledger: &mut Ledger, pool: &mut PoolReserves, tx: &Swap, fee: f64) -> ApplyOutcome {
    if let Some(skip) = invalid_amount(&[tx.amount_in]) {
        return skip;
    }
    if let Some(skip) = same_token(&tx.from_token, &tx.to_token) {
        return skip;
    }
    if !ledger.has_at_least(&tx.trader, &tx.from_token, tx.amount_in) {
        return insufficient(&tx.trader, &tx.from_token);
    }
    if pool.reserve(&tx.to_token) <= 0.0 {
        return ApplyOutcome::Skipped(SkipReason::EmptyOutputReserve {
            token: tx.to_token.clone(),
        });
    }

    if !ledger.debit(&tx.trader, &tx.from_token, tx.amount_in) {
        return insufficient(&tx.trader, &tx.from_token);
    }
    let outcome = pool.apply_swap(&tx.from_token, &tx.to_token, tx.amount_in, fee);
    ledger.credit(&tx.trader, &tx.to_token, outcome.amount_out());
    ApplyOutcome::Applied(Some(outcome))
}

/// Apply a single transaction
pub fn apply_transaction(ledger: &mut Ledger, pool: &mut PoolReserves, tx: &Transaction, fee: f64) -> ApplyOutcome {
    match tx {
        Transaction::Transfer(transfer) => apply_transfer(ledger, transfer),
        Transaction::AddLiquidity(liquidity) => apply_add_liquidity(ledger, pool, liquidity),
        Transaction::Swap(swap) => apply_swap(ledger, pool, swap, fee),
    }
}

/// Apply a block's transactions in order
pub fn apply_block_transactions(
    ledger: &mut Ledger,
    pool: &mut PoolReserves,
    block_index: u64,
    txs: &[Transaction],
    fee: f64,
) -> BlockReceipt {
    let mut receipt = BlockReceipt {
        block_index,
        ..Default::default()
    };

    for tx in txs {
        match apply_transaction(ledger, pool, tx, fee) {
            ApplyOutcome::Applied(_) => receipt.applied += 1,
            ApplyOutcome::Skipped(reason) => {
                debug!("Skipped {} by {}: {:?}", tx.kind(), tx.actor(), reason);
                receipt.skipped += 1;
            }
        }
    }

    pool.snapshot(block_index);
    receipt
}

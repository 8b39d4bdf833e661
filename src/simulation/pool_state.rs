//! Pool Reserve Management
//!
//! Tracks the AMM reserves one peer believes the pool holds, with a
//! snapshot taken at every block boundary.

use crate::utils::amm_math::{reserves_after, swap_outcome, SwapOutcome};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Pool reserves with history tracking
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolReserves {
    /// token -> reserve
    reserves: BTreeMap<String, f64>,
    /// Fees retained in each input reserve
    fees_collected: BTreeMap<String, f64>,
    /// Reserves at each block boundary (for analysis)
    pub history: Vec<PoolSnapshot>,
}

/// Snapshot of pool state after a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub block_index: u64,
    pub reserves: BTreeMap<String, f64>,
}

impl PoolReserves {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pool from seed reserves
    pub fn from_seed(seed: &BTreeMap<String, f64>) -> Self {
        Self {
            reserves: seed.clone(),
            fees_collected: BTreeMap::new(),
            history: vec![PoolSnapshot {
                block_index: 0,
                reserves: seed.clone(),
            }],
        }
    }

    pub fn reserve(&self, token: &str) -> f64 {
        self.reserves.get(token).copied().unwrap_or(0.0)
    }

    pub fn set_reserve(&mut self, token: &str, amount: f64) {
        self.reserves.insert(token.to_string(), amount);
    }

    pub fn add_reserve(&mut self, token: &str, amount: f64) {
        *self.reserves.entry(token.to_string()).or_insert(0.0) += amount;
    }

    /// Execute a swap and move the reserves
    pub fn apply_swap(&mut self, from_token: &str, to_token: &str, amount_in: f64, fee: f64) -> SwapOutcome {
        let (reserve_in, reserve_out) = (self.reserve(from_token), self.reserve(to_token));
        let outcome = swap_outcome(reserve_in, reserve_out, amount_in, fee);
        let (new_in, new_out) = reserves_after(reserve_in, reserve_out, amount_in, &outcome);

        self.set_reserve(from_token, new_in);
        self.set_reserve(to_token, new_out);
        if let SwapOutcome::Quoted(quote) = &outcome {
            *self.fees_collected.entry(from_token.to_string()).or_insert(0.0) +=
                amount_in - quote.amount_in_effective;
        }

        outcome
    }

    /// Price of `base` in units of `quote`
    pub fn price(&self, base: &str, quote: &str) -> f64 {
        let base_reserve = self.reserve(base);
        if base_reserve == 0.0 {
            return 0.0;
        }
        self.reserve(quote) / base_reserve
    }

    /// Constant product of a pair
    pub fn k(&self, token_a: &str, token_b: &str) -> f64 {
        self.reserve(token_a) * self.reserve(token_b)
    }

    pub fn fees_collected(&self, token: &str) -> f64 {
        self.fees_collected.get(token).copied().unwrap_or(0.0)
    }

    /// Record a snapshot
    pub fn snapshot(&mut self, block_index: u64) {
        self.history.push(PoolSnapshot {
            block_index,
            reserves: self.reserves.clone(),
        });
    }

    pub fn reserves(&self) -> &BTreeMap<String, f64> {
        &self.reserves
    }
}

//! Everything one peer owns

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::chain::{apply::BlockReceipt, block::Chain, mempool::Mempool};
use crate::simulation::{
    ledger::{Balances, Ledger},
    pool_state::PoolReserves,
};

/// A peer's ledger, pool view, mempool and chain
///
/// Only the owning peer's handlers and scheduled actions touch it.
#[derive(Debug, Clone, Default)]
pub struct PeerState {
    pub ledger: Ledger,
    pub pool: PoolReserves,
    pub mempool: Mempool,
    pub chain: Chain,
    /// One entry per block applied, own or remote
    pub receipts: Vec<BlockReceipt>,
    /// Pool fee as a fraction
    pub fee: f64,
}

impl PeerState {
    pub fn new(seed_balances: &Balances, seed_reserves: &BTreeMap<String, f64>, fee: f64) -> Self {
        Self {
            ledger: Ledger::from_seed(seed_balances),
            pool: PoolReserves::from_seed(seed_reserves),
            mempool: Mempool::new(),
            chain: Chain::new(),
            receipts: Vec::new(),
            fee,
        }
    }

    pub fn summary(&self) -> StateSummary {
        StateSummary {
            height: self.chain.height(),
            tip_hash: self.chain.tip().hash.clone(),
            mempool_len: self.mempool.len(),
            balances: self.ledger.snapshot(),
            reserves: self.pool.reserves().clone(),
            receipts: self.receipts.clone(),
        }
    }
}

/// Serializable view of a peer's state at the end of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSummary {
    pub height: u64,
    pub tip_hash: String,
    pub mempool_len: usize,
    pub balances: Balances,
    pub reserves: BTreeMap<String, f64>,
    pub receipts: Vec<BlockReceipt>,
}

//! Blocks and the append-only local chain

use serde::{Deserialize, Serialize};

use crate::chain::transaction::Transaction;
use crate::error::BlockRejection;
use crate::utils::hash::hash_block;

/// prev_hash of the genesis block
pub const GENESIS_PREV_HASH: &str = "0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub prev_hash: String,
    /// Producer-local clock in seconds; not synchronized across peers
    pub timestamp: f64,
    pub transactions: Vec<Transaction>,
    pub hash: String,
}

impl Block {
    /// Build a block and compute its hash
    pub fn new(index: u64, prev_hash: String, timestamp: f64, transactions: Vec<Transaction>) -> Self {
        let hash = hash_block(index, &prev_hash, timestamp, &transactions);
        Self {
            index,
            prev_hash,
            timestamp,
            transactions,
            hash,
        }
    }

    /// Identical on every peer: fixed timestamp, no transactions
    pub fn genesis() -> Self {
        Self::new(0, GENESIS_PREV_HASH.to_string(), 0.0, Vec::new())
    }

    pub fn compute_hash(&self) -> String {
        hash_block(self.index, &self.prev_hash, self.timestamp, &self.transactions)
    }
}

/// Blocks accepted by one peer, oldest first. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chain {
    blocks: Vec<Block>,
}

impl Default for Chain {
    fn default() -> Self {
        Self::new()
    }
}

impl Chain {
    /// Start a chain at the genesis block
    pub fn new() -> Self {
        Self {
            blocks: vec![Block::genesis()],
        }
    }

    pub fn tip(&self) -> &Block {
        // The genesis block is never removed.
        &self.blocks[self.blocks.len() - 1]
    }

    /// Index of the tip block
    pub fn height(&self) -> u64 {
        self.tip().index
    }

    /// Check that a block with `prev_hash` would extend the tip
    pub fn check_extends(&self, prev_hash: &str) -> Result<(), BlockRejection> {
        let tip = self.tip();
        if prev_hash != tip.hash {
            return Err(BlockRejection::PrevHashMismatch {
                expected: tip.hash.clone(),
                got: prev_hash.to_string(),
            });
        }
        Ok(())
    }

    /// Append a block that links to the tip
    pub fn append(&mut self, block: Block) -> Result<&Block, BlockRejection> {
        self.check_extends(&block.prev_hash)?;
        self.blocks.push(block);
        Ok(self.tip())
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

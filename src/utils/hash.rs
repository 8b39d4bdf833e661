//! Hash Utilities for Block Digests
//!
//! Blocks are hashed with SHA256 over a JSON rendering of their header
//! fields and transactions. Field order is fixed by the preimage struct,
//! so every peer derives the same digest for the same block.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::chain::transaction::Transaction;

/// Fields covered by a block hash, serialized in declaration order
#[derive(Serialize)]
struct BlockPreimage<'a> {
    index: u64,
    prev_hash: &'a str,
    timestamp: f64,
    transactions: &'a [Transaction],
}

/// Serialize the hashed fields of a block
///
/// Layout: `{"index":..,"prev_hash":..,"timestamp":..,"transactions":[..]}`
pub fn block_preimage(
    index: u64,
    prev_hash: &str,
    timestamp: f64,
    transactions: &[Transaction],
) -> Vec<u8> {
    let preimage = BlockPreimage {
        index,
        prev_hash,
        timestamp,
        transactions,
    };
    // Plain structs, strings and finite floats always serialize.
    serde_json::to_vec(&preimage).unwrap_or_default()
}

/// Hash raw bytes using SHA256
pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();

    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Hex-encoded SHA256 digest of a block's contents
pub fn hash_block(index: u64, prev_hash: &str, timestamp: f64, transactions: &[Transaction]) -> String {
    hash_to_hex(&sha256(&block_preimage(index, prev_hash, timestamp, transactions)))
}

/// Convert hash to hex string for display
pub fn hash_to_hex(hash: &[u8; 32]) -> String {
    hex::encode(hash)
}

/// First eight hex characters, for log lines
pub fn short_hash(hash: &str) -> &str {
    hash.get(..8).unwrap_or(hash)
}

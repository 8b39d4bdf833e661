//! Block production on the miner

use tracing::{info, warn};

use crate::chain::{apply::apply_block_transactions, block::Block};
use crate::node::state::PeerState;
use crate::utils::hash::short_hash;

/// Turn the mempool into the next block
///
/// Returns `None` when nothing is pending; empty blocks are never produced.
/// Otherwise drains the mempool in inclusion order, appends the block, applies
/// it to the local ledger and pool and clears the mempool. If the append is
/// refused nothing is applied and the drained transactions go back.
pub fn produce_block(state: &mut PeerState, now: f64) -> Option<Block> {
    if state.mempool.is_empty() {
        return None;
    }

    let txs = state.mempool.drain_ordered();
    let tip = state.chain.tip();
    let produced = Block::new(tip.index + 1, tip.hash.clone(), now, txs);

    // Append before touching the ledger so a failure leaves the state as it was.
    if let Err(e) = state.chain.append(produced.clone()) {
        warn!("Produced block does not extend own tip: {}", e);
        for tx in produced.transactions {
            state.mempool.insert(tx);
        }
        return None;
    }

    let receipt = apply_block_transactions(
        &mut state.ledger,
        &mut state.pool,
        produced.index,
        &produced.transactions,
        state.fee,
    );
    state.mempool.clear();

    info!(
        "Mined block #{} {} ({} applied, {} skipped)",
        produced.index,
        short_hash(&produced.hash),
        receipt.applied,
        receipt.skipped
    );
    state.receipts.push(receipt);

    Some(produced)
}

//! Accepting blocks announced by other peers

use tracing::info;

use crate::chain::{apply::apply_block_transactions, block::Block, codec::BlockMessage};
use crate::error::BlockRejection;
use crate::node::state::PeerState;
use crate::utils::hash::short_hash;

/// Validate a block announcement against the local tip and apply it
///
/// A block that does not extend the tip, or whose contents do not match its
/// advertised hash, leaves the peer untouched. An accepted block clears the
/// whole mempool, including transactions the block did not contain.
pub fn accept_block(state: &mut PeerState, msg: &BlockMessage) -> Result<Block, BlockRejection> {
    state.chain.check_extends(&msg.prev_hash)?;
    let block = msg.to_block()?;

    let receipt = apply_block_transactions(
        &mut state.ledger,
        &mut state.pool,
        block.index,
        &block.transactions,
        state.fee,
    );
    let accepted = state.chain.append(block)?.clone();
    state.mempool.clear();

    info!(
        "Accepted block #{} {} ({} applied, {} skipped)",
        accepted.index,
        short_hash(&accepted.hash),
        receipt.applied,
        receipt.skipped
    );
    state.receipts.push(receipt);

    Ok(accepted)
}

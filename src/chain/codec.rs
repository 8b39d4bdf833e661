//! Wire messages exchanged between peers
//!
//! Four message types: one per transaction variant plus the block
//! announcement. A block carries its transactions as a JSON array of
//! `kind`-tagged entries in `tx_data`.

use serde::{Deserialize, Serialize};

use crate::chain::block::Block;
use crate::chain::transaction::{AddLiquidity, Swap, Transaction, Transfer};
use crate::error::{BlockRejection, SimResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockMessage {
    pub index: u64,
    pub prev_hash: String,
    pub timestamp: f64,
    pub block_hash: String,
    pub tx_data: String,
}

impl BlockMessage {
    pub fn from_block(block: &Block) -> SimResult<Self> {
        Ok(Self {
            index: block.index,
            prev_hash: block.prev_hash.clone(),
            timestamp: block.timestamp,
            block_hash: block.hash.clone(),
            tx_data: encode_transactions(&block.transactions)?,
        })
    }

    /// Rebuild the block, recomputing its hash from the decoded contents
    ///
    /// Fails when `tx_data` does not decode or the advertised hash does
    /// not match the contents.
    pub fn to_block(&self) -> Result<Block, BlockRejection> {
        let transactions = decode_transactions(&self.tx_data)
            .map_err(|e| BlockRejection::MalformedPayload(e.to_string()))?;
        let block = Block::new(self.index, self.prev_hash.clone(), self.timestamp, transactions);

        if block.hash != self.block_hash {
            return Err(BlockRejection::HashMismatch {
                advertised: self.block_hash.clone(),
                computed: block.hash,
            });
        }
        Ok(block)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum NetworkMessage {
    TransferTx(Transfer),
    AddLiquidityTx(AddLiquidity),
    SwapTx(Swap),
    BlockMessage(BlockMessage),
}

impl NetworkMessage {
    pub fn from_transaction(tx: Transaction) -> Self {
        match tx {
            Transaction::Transfer(t) => NetworkMessage::TransferTx(t),
            Transaction::AddLiquidity(t) => NetworkMessage::AddLiquidityTx(t),
            Transaction::Swap(t) => NetworkMessage::SwapTx(t),
        }
    }

    /// The carried transaction, if this is not a block announcement
    pub fn into_transaction(self) -> Option<Transaction> {
        match self {
            NetworkMessage::TransferTx(t) => Some(Transaction::Transfer(t)),
            NetworkMessage::AddLiquidityTx(t) => Some(Transaction::AddLiquidity(t)),
            NetworkMessage::SwapTx(t) => Some(Transaction::Swap(t)),
            NetworkMessage::BlockMessage(_) => None,
        }
    }

    pub fn message_type(&self) -> &'static str {
        match self {
            NetworkMessage::TransferTx(_) => "TransferTx",
            NetworkMessage::AddLiquidityTx(_) => "AddLiquidityTx",
            NetworkMessage::SwapTx(_) => "SwapTx",
            NetworkMessage::BlockMessage(_) => "BlockMessage",
        }
    }
}

pub fn encode_transactions(txs: &[Transaction]) -> SimResult<String> {
    Ok(serde_json::to_string(txs)?)
}

pub fn decode_transactions(data: &str) -> SimResult<Vec<Transaction>> {
    Ok(serde_json::from_str(data)?)
}

/// Serialize a message into a wire frame
pub fn encode(msg: &NetworkMessage) -> SimResult<Vec<u8>> {
    Ok(serde_json::to_vec(msg)?)
}

/// Parse a wire frame
pub fn decode(bytes: &[u8]) -> SimResult<NetworkMessage> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_block() -> Block {
        Block::new(
            1,
            Block::genesis().hash,
            3.0,
            vec![
                Transaction::add_liquidity("user", "TokenA", 500.0, "TokenB", 500.0),
                Transaction::swap("sniper", "TokenA", "TokenB", 10.0),
                Transaction::transfer("miner", "user", "TokenA", 1.5),
            ],
        )
    }

    #[test]
    fn test_block_message_rebuilds_block() {
        let block = sample_block();
        let msg = BlockMessage::from_block(&block).unwrap();

        assert_eq!(msg.block_hash, block.hash);
        assert_eq!(msg.to_block().unwrap(), block);
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let mut msg = BlockMessage::from_block(&sample_block()).unwrap();
        msg.tx_data = msg.tx_data.replace("10.0", "20.0");

        assert!(matches!(msg.to_block(), Err(BlockRejection::HashMismatch { .. })));
    }

    #[test]
    fn test_malformed_payload_rejected() {
        let mut msg = BlockMessage::from_block(&sample_block()).unwrap();
        msg.tx_data = "[{\"kind\":\"swap\"}]".to_string();

        assert!(matches!(msg.to_block(), Err(BlockRejection::MalformedPayload(_))));
    }

    #[test]
    fn test_wire_frame_is_tagged() {
        let msg = NetworkMessage::from_transaction(Transaction::swap("whale", "TokenA", "TokenB", 100.0));
        let frame = encode(&msg).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&frame).unwrap();

        assert_eq!(value["type"], "SwapTx");
        assert_eq!(decode(&frame).unwrap(), msg);
        assert_eq!(msg.message_type(), "SwapTx");
    }

    #[test]
    fn test_garbage_frame_is_an_error() {
        assert!(decode(b"not json").is_err());
        assert!(decode(br#"{"type":"Gossip"}"#).is_err());
    }

    #[test]
    fn test_block_message_carries_no_transaction() {
        let msg = NetworkMessage::BlockMessage(BlockMessage::from_block(&sample_block()).unwrap());
        assert!(msg.into_transaction().is_none());
    }
}

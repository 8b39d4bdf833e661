//! Transactions, blocks and the rules for producing and accepting them

pub mod apply;
pub mod block;
pub mod codec;
pub mod mempool;
pub mod producer;
pub mod transaction;
pub mod validator;

pub use apply::{apply_transaction, ApplyOutcome, BlockReceipt, SkipReason};
pub use block::{Block, Chain};
pub use codec::{BlockMessage, NetworkMessage};
pub use mempool::Mempool;
pub use transaction::Transaction;

//! Pending-transaction pool
//!
//! Insertion-ordered. Ordering for block inclusion is decided at drain time:
//! liquidity additions first, then sniper-authored transactions, then the
//! rest, each group keeping insertion order.

use crate::chain::transaction::Transaction;

#[derive(Debug, Clone, Default)]
pub struct Mempool {
    txs: Vec<Transaction>,
}

/// Sort key for block inclusion; lower sorts first
fn inclusion_rank(tx: &Transaction) -> (u8, u8) {
    if tx.is_add_liquidity() {
        return (0, 0);
    }
    let sniper_rank = if tx.is_sniper_authored() { 0 } else { 1 };
    (1, sniper_rank)
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tx: Transaction) {
        self.txs.push(tx);
    }

    /// Remove every pending transaction, in inclusion order
    pub fn drain_ordered(&mut self) -> Vec<Transaction> {
        let mut txs = std::mem::take(&mut self.txs);
        // sort_by_key is stable: ties keep insertion order
        txs.sort_by_key(inclusion_rank);
        txs
    }

    /// Drop all pending transactions
    pub fn clear(&mut self) {
        self.txs.clear();
    }

    pub fn len(&self) -> usize {
        self.txs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.txs.is_empty()
    }

    /// Pending transactions in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.txs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_order() {
        let mut mempool = Mempool::new();
        mempool.insert(Transaction::swap("whale", "A", "B", 100.0));
        mempool.insert(Transaction::transfer("user", "miner", "A", 1.0));
        mempool.insert(Transaction::add_liquidity("user", "A", 5.0, "B", 5.0));
        mempool.insert(Transaction::swap("sniper", "A", "B", 10.0));
        mempool.insert(Transaction::add_liquidity("miner", "A", 1.0, "B", 1.0));
        mempool.insert(Transaction::swap("sniper", "A", "B", 11.0));

        let drained = mempool.drain_ordered();
        let order: Vec<(&str, &str)> = drained.iter().map(|tx| (tx.kind(), tx.actor())).collect();

        assert_eq!(
            order,
            vec![
                ("add_liquidity", "user"),
                ("add_liquidity", "miner"),
                ("swap", "sniper"),
                ("swap", "sniper"),
                ("swap", "whale"),
                ("transfer", "user"),
            ]
        );
        // Stable among sniper transactions
        assert_eq!(drained[2], Transaction::swap("sniper", "A", "B", 10.0));
        assert_eq!(drained[3], Transaction::swap("sniper", "A", "B", 11.0));
        assert!(mempool.is_empty());
    }

    #[test]
    fn test_sniper_liquidity_stays_with_liquidity() {
        let mut mempool = Mempool::new();
        mempool.insert(Transaction::swap("sniper", "A", "B", 10.0));
        mempool.insert(Transaction::add_liquidity("sniper", "A", 5.0, "B", 5.0));

        let drained = mempool.drain_ordered();
        assert!(drained[0].is_add_liquidity());
        assert!(!drained[1].is_add_liquidity());
    }

    #[test]
    fn test_clear() {
        let mut mempool = Mempool::new();
        mempool.insert(Transaction::transfer("a", "b", "A", 1.0));
        assert_eq!(mempool.len(), 1);

        mempool.clear();
        assert!(mempool.is_empty());
        assert!(mempool.drain_ordered().is_empty());
    }
}

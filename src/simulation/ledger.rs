//! Per-peer token balances

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// participant -> token -> balance
pub type Balances = BTreeMap<String, BTreeMap<String, f64>>;

/// Token balances as seen by one peer
///
/// Missing participants or tokens read as zero. Crediting an unknown
/// participant creates its entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    balances: Balances,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a ledger from a seed table
    pub fn from_seed(seed: &Balances) -> Self {
        Self {
            balances: seed.clone(),
        }
    }

    pub fn balance(&self, participant: &str, token: &str) -> f64 {
        self.balances
            .get(participant)
            .and_then(|tokens| tokens.get(token))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn has_at_least(&self, participant: &str, token: &str, amount: f64) -> bool {
        self.balance(participant, token) >= amount
    }

    /// Subtract `amount`, or return false and leave the ledger untouched
    pub fn debit(&mut self, participant: &str, token: &str, amount: f64) -> bool {
        if !self.has_at_least(participant, token, amount) {
            return false;
        }
        *self.entry(participant, token) -= amount;
        true
    }

    pub fn credit(&mut self, participant: &str, token: &str, amount: f64) {
        *self.entry(participant, token) += amount;
    }

    /// Sum of one token across all participants
    pub fn total(&self, token: &str) -> f64 {
        self.balances
            .values()
            .filter_map(|tokens| tokens.get(token))
            .sum()
    }

    pub fn participants(&self) -> impl Iterator<Item = &str> {
        self.balances.keys().map(String::as_str)
    }

    /// Every token symbol held by anyone
    pub fn tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = self
            .balances
            .values()
            .flat_map(|t| t.keys().cloned())
            .collect();
        tokens.sort();
        tokens.dedup();
        tokens
    }

    pub fn snapshot(&self) -> Balances {
        self.balances.clone()
    }

    fn entry(&mut self, participant: &str, token: &str) -> &mut f64 {
        self.balances
            .entry(participant.to_string())
            .or_default()
            .entry(token.to_string())
            .or_insert(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.credit("A", "X", 100.0);
        ledger
    }

    #[test]
    fn test_debit_checks_balance() {
        let mut ledger = seeded();

        assert!(!ledger.debit("A", "X", 100.5));
        assert_eq!(ledger.balance("A", "X"), 100.0);

        assert!(ledger.debit("A", "X", 40.0));
        assert_eq!(ledger.balance("A", "X"), 60.0);
    }

    #[test]
    fn test_unknown_entries_read_zero() {
        let mut ledger = seeded();

        assert_eq!(ledger.balance("B", "X"), 0.0);
        assert_eq!(ledger.balance("A", "Y"), 0.0);
        assert!(!ledger.debit("B", "X", 1.0));
        // A failed debit never creates an entry
        assert_eq!(ledger.participants().count(), 1);
    }

    #[test]
    fn test_credit_creates_participant() {
        let mut ledger = seeded();
        ledger.credit("B", "X", 40.0);

        assert_eq!(ledger.balance("B", "X"), 40.0);
        assert_eq!(ledger.total("X"), 140.0);
        assert_eq!(ledger.tokens(), vec!["X".to_string()]);
    }
}

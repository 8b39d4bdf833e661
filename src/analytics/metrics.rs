//! Metrics calculation for simulation analysis

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::bots::Role;
use crate::node::peer::PeerReport;
use crate::simulation::ledger::Balances;

/// Allowed floating drift when comparing token totals
pub const SUPPLY_TOLERANCE: f64 = 1e-6;

/// Calculator for simulation metrics
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Per-token total held by participants plus the pool
    pub fn total_supply(balances: &Balances, reserves: &BTreeMap<String, f64>) -> BTreeMap<String, f64> {
        let mut totals: BTreeMap<String, f64> = BTreeMap::new();
        for tokens in balances.values() {
            for (token, amount) in tokens {
                *totals.entry(token.clone()).or_insert(0.0) += amount;
            }
        }
        for (token, amount) in reserves {
            *totals.entry(token.clone()).or_insert(0.0) += amount;
        }
        totals
    }

    /// Whether every token total matches the seed within tolerance
    pub fn supply_conserved(seed: &BTreeMap<String, f64>, current: &BTreeMap<String, f64>) -> bool {
        let tokens = seed.keys().chain(current.keys());
        tokens.into_iter().all(|token| {
            let before = seed.get(token).copied().unwrap_or(0.0);
            let after = current.get(token).copied().unwrap_or(0.0);
            (before - after).abs() <= SUPPLY_TOLERANCE
        })
    }

    /// Whether every peer ended on the same tip
    pub fn chains_converged(peers: &[PeerReport]) -> bool {
        let mut tips = peers.iter().map(|p| p.state.tip_hash.as_str());
        match tips.next() {
            Some(first) => tips.all(|tip| tip == first),
            None => true,
        }
    }

    /// Names of peers whose tip differs from the longest chain's tip
    pub fn diverged_peers(peers: &[PeerReport]) -> Vec<String> {
        let Some(leader) = peers.iter().max_by_key(|p| p.state.height) else {
            return Vec::new();
        };
        peers
            .iter()
            .filter(|p| p.state.tip_hash != leader.state.tip_hash)
            .map(|p| p.name.clone())
            .collect()
    }

    /// Change in a participant's holdings, valued in `token_a` at the final pool price
    pub fn holdings_pnl(
        participant: &str,
        seed: &Balances,
        report: &PeerReport,
        token_a: &str,
        token_b: &str,
    ) -> f64 {
        let reserves = &report.state.reserves;
        let reserve_a = reserves.get(token_a).copied().unwrap_or(0.0);
        let reserve_b = reserves.get(token_b).copied().unwrap_or(0.0);
        // Token A per token B
        let price_b = if reserve_b > 0.0 { reserve_a / reserve_b } else { 0.0 };

        let value = |balances: &Balances| {
            let held = |token: &str| {
                balances
                    .get(participant)
                    .and_then(|t| t.get(token))
                    .copied()
                    .unwrap_or(0.0)
            };
            held(token_a) + held(token_b) * price_b
        };

        value(&report.state.balances) - value(seed)
    }

    pub fn compute(
        peers: &[PeerReport],
        seed_balances: &Balances,
        seed_reserves: &BTreeMap<String, f64>,
        token_a: &str,
        token_b: &str,
    ) -> RunMetrics {
        let seed_supply = Self::total_supply(seed_balances, seed_reserves);
        let supply_conserved = peers.iter().all(|p| {
            let current = Self::total_supply(&p.state.balances, &p.state.reserves);
            Self::supply_conserved(&seed_supply, &current)
        });

        let sniper_pnl = peers
            .iter()
            .find(|p| p.role == Role::Sniper)
            .map(|sniper| Self::holdings_pnl(&sniper.name, seed_balances, sniper, token_a, token_b));

        RunMetrics {
            converged: Self::chains_converged(peers),
            diverged_peers: Self::diverged_peers(peers),
            max_height: peers.iter().map(|p| p.state.height).max().unwrap_or(0),
            supply_conserved,
            seed_supply,
            sniper_pnl,
        }
    }
}

/// Cross-peer metrics for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub converged: bool,
    pub diverged_peers: Vec<String>,
    pub max_height: u64,
    pub supply_conserved: bool,
    pub seed_supply: BTreeMap<String, f64>,
    /// In token A; `None` without a sniper
    pub sniper_pnl: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::state::StateSummary;

    fn balances(entries: &[(&str, &str, f64)]) -> Balances {
        let mut balances = Balances::new();
        for (who, token, amount) in entries {
            balances
                .entry(who.to_string())
                .or_default()
                .insert(token.to_string(), *amount);
        }
        balances
    }

    fn report(name: &str, role: Role, height: u64, tip: &str, bal: Balances, reserves: &[(&str, f64)]) -> PeerReport {
        PeerReport {
            id: 0,
            name: name.to_string(),
            role,
            state: StateSummary {
                height,
                tip_hash: tip.to_string(),
                mempool_len: 0,
                balances: bal,
                reserves: reserves.iter().map(|(t, a)| (t.to_string(), *a)).collect(),
                receipts: Vec::new(),
            },
            blocks_mined: None,
            sniper: None,
        }
    }

    #[test]
    fn test_total_supply_counts_pool() {
        let bal = balances(&[("a", "X", 10.0), ("b", "X", 5.0), ("b", "Y", 1.0)]);
        let mut reserves = BTreeMap::new();
        reserves.insert("X".to_string(), 100.0);

        let totals = MetricsCalculator::total_supply(&bal, &reserves);
        assert_eq!(totals["X"], 115.0);
        assert_eq!(totals["Y"], 1.0);
    }

    #[test]
    fn test_convergence() {
        let a = report("a", Role::Miner, 2, "tip2", Balances::new(), &[]);
        let b = report("b", Role::Whale, 2, "tip2", Balances::new(), &[]);
        let c = report("c", Role::Sniper, 1, "tip1", Balances::new(), &[]);

        assert!(MetricsCalculator::chains_converged(&[a.clone(), b.clone()]));
        assert!(!MetricsCalculator::chains_converged(&[a.clone(), b.clone(), c.clone()]));
        assert_eq!(MetricsCalculator::diverged_peers(&[a, b, c]), vec!["c".to_string()]);
    }

    #[test]
    fn test_sniper_pnl_uses_final_price() {
        let seed = balances(&[("sniper", "A", 100.0), ("sniper", "B", 0.0)]);
        let after = balances(&[("sniper", "A", 90.0), ("sniper", "B", 12.0)]);
        let sniper = report("sniper", Role::Sniper, 1, "t", after, &[("A", 200.0), ("B", 100.0)]);

        // 90 + 12 * 2 - 100
        let pnl = MetricsCalculator::holdings_pnl("sniper", &seed, &sniper, "A", "B");
        assert!((pnl - 14.0).abs() < 1e-9);
    }
}

//! Sniper Bot
//!
//! Watches transactions arriving in the mempool and answers two patterns:
//! - a liquidity deposit into a pool with an empty leg (a new listing) is
//!   met with an immediate small buy of the listed token;
//! - a large token A -> token B swap is front-run with a smaller swap in the
//!   same direction, which the miner's ordering puts ahead of it. The size is
//!   capped so the front-run alone stays within the slippage tolerance.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::chain::transaction::Transaction;
use crate::config::SimulationConfig;
use crate::simulation::pool_state::PoolReserves;
use crate::utils::amm_math::{front_run_profit, max_input_for_slippage};

/// Reactions emitted so far
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SniperStats {
    pub listings_sniped: u32,
    pub frontruns: u32,
    /// Token A committed across all reactions
    pub committed: f64,
    /// Expected front-run gain in token A, priced against the local pool
    pub estimated_profit: f64,
}

#[derive(Debug, Clone)]
pub struct Sniper {
    token_a: String,
    token_b: String,
    listing_buy: f64,
    frontrun_amount: f64,
    whale_threshold: f64,
    slippage_tolerance: f64,
    fee: f64,
    stats: SniperStats,
}

impl Sniper {
    pub fn new(config: &SimulationConfig) -> Self {
        let settings = &config.roles.sniper;
        Self {
            token_a: config.token_a.clone(),
            token_b: config.token_b.clone(),
            listing_buy: settings.listing_buy,
            frontrun_amount: settings.frontrun_amount,
            whale_threshold: settings.whale_threshold,
            slippage_tolerance: settings.slippage_tolerance,
            fee: config.fee(),
            stats: SniperStats::default(),
        }
    }

    pub fn stats(&self) -> &SniperStats {
        &self.stats
    }

    /// Decide whether an observed pending transaction is worth answering
    ///
    /// `pool` is this peer's current view of the reserves; pending
    /// transactions have not touched it yet.
    pub fn react(&mut self, me: &str, observed: &Transaction, pool: &PoolReserves) -> Option<Transaction> {
        if observed.actor() == me {
            return None;
        }

        match observed {
            Transaction::AddLiquidity(tx) if pool.reserve(&tx.token_a) == 0.0 || pool.reserve(&tx.token_b) == 0.0 => {
                info!(
                    "New listing {}/{} by {}, buying with {} {}",
                    tx.token_a, tx.token_b, tx.provider, self.listing_buy, tx.token_a
                );
                self.stats.listings_sniped += 1;
                self.stats.committed += self.listing_buy;
                Some(Transaction::swap(me, &tx.token_a, &tx.token_b, self.listing_buy))
            }
            Transaction::Swap(tx)
                if tx.from_token == self.token_a
                    && tx.to_token == self.token_b
                    && tx.amount_in >= self.whale_threshold =>
            {
                let reserve_a = pool.reserve(&self.token_a);
                let reserve_b = pool.reserve(&self.token_b);
                let cap = max_input_for_slippage(reserve_a, reserve_b, self.slippage_tolerance, self.fee);
                let amount = self.frontrun_amount.min(cap);
                if amount <= 0.0 {
                    debug!("No room to front-run {} {} by {}", tx.amount_in, tx.from_token, tx.trader);
                    return None;
                }

                let profit = front_run_profit(reserve_a, reserve_b, tx.amount_in, amount, self.fee).unwrap_or(0.0);
                info!(
                    "Large swap of {} {} by {}, front-running with {} (expected gain {:.4})",
                    tx.amount_in, tx.from_token, tx.trader, amount, profit
                );
                self.stats.frontruns += 1;
                self.stats.committed += amount;
                self.stats.estimated_profit += profit;
                Some(Transaction::swap(me, &self.token_a, &self.token_b, amount))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::amm_math::{quote_swap, DEFAULT_FEE};

    fn sniper() -> Sniper {
        Sniper::new(&SimulationConfig::default())
    }

    fn listed_pool() -> PoolReserves {
        let mut pool = PoolReserves::new();
        pool.set_reserve("TokenA", 500.0);
        pool.set_reserve("TokenB", 500.0);
        pool
    }

    #[test]
    fn test_snipes_new_listing() {
        let mut sniper = sniper();
        let pool = PoolReserves::new();
        let listing = Transaction::add_liquidity("user", "TokenA", 500.0, "TokenB", 500.0);

        let reaction = sniper.react("sniper", &listing, &pool);

        assert_eq!(reaction, Some(Transaction::swap("sniper", "TokenA", "TokenB", 10.0)));
        assert_eq!(sniper.stats().listings_sniped, 1);
    }

    #[test]
    fn test_ignores_liquidity_on_listed_pool() {
        let mut sniper = sniper();
        let listing = Transaction::add_liquidity("user", "TokenA", 5.0, "TokenB", 5.0);

        assert!(sniper.react("sniper", &listing, &listed_pool()).is_none());
    }

    #[test]
    fn test_frontruns_large_swap() {
        let mut sniper = sniper();
        let whale = Transaction::swap("whale", "TokenA", "TokenB", 30.0);

        let reaction = sniper.react("sniper", &whale, &listed_pool()).unwrap();

        match reaction {
            Transaction::Swap(swap) => {
                assert_eq!(swap.trader, "sniper");
                assert!(swap.amount_in < 30.0);
            }
            other => panic!("expected a swap, got {:?}", other),
        }
        assert_eq!(sniper.stats().frontruns, 1);
    }

    #[test]
    fn test_ignores_small_or_reverse_swaps() {
        let mut sniper = sniper();
        let pool = listed_pool();

        assert!(sniper.react("sniper", &Transaction::swap("whale", "TokenA", "TokenB", 29.9), &pool).is_none());
        assert!(sniper.react("sniper", &Transaction::swap("whale", "TokenB", "TokenA", 100.0), &pool).is_none());
        assert!(sniper.react("sniper", &Transaction::transfer("whale", "x", "TokenA", 100.0), &pool).is_none());
        assert_eq!(sniper.stats(), &SniperStats::default());
    }

    #[test]
    fn test_never_reacts_to_itself() {
        let mut sniper = sniper();
        let own = Transaction::swap("sniper", "TokenA", "TokenB", 100.0);

        assert!(sniper.react("sniper", &own, &listed_pool()).is_none());
    }

    #[test]
    fn test_frontrun_capped_by_slippage() {
        let mut config = SimulationConfig::default();
        config.roles.sniper.slippage_tolerance = 0.005;
        let mut sniper = Sniper::new(&config);
        let whale = Transaction::swap("whale", "TokenA", "TokenB", 100.0);

        let Some(Transaction::Swap(swap)) = sniper.react("sniper", &whale, &listed_pool()) else {
            panic!("expected a front-run swap");
        };

        assert!(swap.amount_in < 10.0);
        let impact = quote_swap(500.0, 500.0, swap.amount_in, config.fee()).unwrap().price_impact;
        assert!(impact <= 0.005);
        assert_eq!(sniper.stats().committed, swap.amount_in);
    }

    #[test]
    fn test_frontrun_records_expected_gain() {
        let mut sniper = sniper();
        let whale = Transaction::swap("whale", "TokenA", "TokenB", 100.0);

        sniper.react("sniper", &whale, &listed_pool()).unwrap();

        let expected = front_run_profit(500.0, 500.0, 100.0, 10.0, DEFAULT_FEE).unwrap();
        assert!(expected > 0.0);
        assert!((sniper.stats().estimated_profit - expected).abs() < 1e-12);
    }

    #[test]
    fn test_no_frontrun_into_empty_pool() {
        let mut sniper = sniper();
        let whale = Transaction::swap("whale", "TokenA", "TokenB", 100.0);

        assert!(sniper.react("sniper", &whale, &PoolReserves::new()).is_none());
        assert_eq!(sniper.stats().frontruns, 0);
    }
}

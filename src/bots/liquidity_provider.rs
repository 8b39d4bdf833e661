//! Liquidity Provider Bot
//!
//! Lists the pair by depositing both tokens once, shortly after start.

use std::time::Duration;

use crate::chain::transaction::Transaction;
use crate::config::{duration_from_secs, SimulationConfig};
use crate::node::transport::{RoleAction, ScheduledTask};

#[derive(Debug, Clone)]
pub struct LiquidityProvider {
    token_a: String,
    token_b: String,
    amount_a: f64,
    amount_b: f64,
    delay: Duration,
}

impl LiquidityProvider {
    pub fn new(config: &SimulationConfig) -> Self {
        let settings = &config.roles.liquidity;
        Self {
            token_a: config.token_a.clone(),
            token_b: config.token_b.clone(),
            amount_a: settings.amount_a,
            amount_b: settings.amount_b,
            delay: duration_from_secs(settings.delay_secs),
        }
    }

    pub fn startup_task(&self) -> ScheduledTask {
        ScheduledTask::once("add_liquidity", RoleAction::ProvideLiquidity, self.delay)
    }

    pub fn build_transaction(&self, provider: &str) -> Transaction {
        Transaction::add_liquidity(provider, &self.token_a, self.amount_a, &self.token_b, self.amount_b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_configured_deposit() {
        let lp = LiquidityProvider::new(&SimulationConfig::default());

        assert_eq!(
            lp.build_transaction("user"),
            Transaction::add_liquidity("user", "TokenA", 500.0, "TokenB", 500.0)
        );
        assert_eq!(lp.startup_task().delay, Duration::from_secs(2));
    }
}

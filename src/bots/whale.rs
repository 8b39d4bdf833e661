//! Whale Bot
//!
//! Makes one large token A -> token B swap. Large enough to be front-run.

use std::time::Duration;

use crate::chain::transaction::Transaction;
use crate::config::{duration_from_secs, SimulationConfig};
use crate::node::transport::{RoleAction, ScheduledTask};

#[derive(Debug, Clone)]
pub struct Whale {
    from_token: String,
    to_token: String,
    amount_in: f64,
    delay: Duration,
}

impl Whale {
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            from_token: config.token_a.clone(),
            to_token: config.token_b.clone(),
            amount_in: config.roles.whale.amount_in,
            delay: duration_from_secs(config.roles.whale.delay_secs),
        }
    }

    pub fn startup_task(&self) -> ScheduledTask {
        ScheduledTask::once("whale_swap", RoleAction::WhaleSwap, self.delay)
    }

    pub fn build_transaction(&self, trader: &str) -> Transaction {
        Transaction::swap(trader, &self.from_token, &self.to_token, self.amount_in)
    }
}

//! Role behaviours for simulated peers

pub mod liquidity_provider;
pub mod miner;
pub mod sniper;
pub mod whale;

pub use liquidity_provider::LiquidityProvider;
pub use miner::Miner;
pub use sniper::{Sniper, SniperStats};
pub use whale::Whale;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::SimulationConfig;
use crate::node::transport::ScheduledTask;

/// Fixed for a peer's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Miner,
    #[serde(rename = "user")]
    LiquidityProvider,
    Whale,
    Sniper,
}

impl Role {
    /// Ledger name used when the config does not give one
    pub fn default_name(&self) -> &'static str {
        match self {
            Role::Miner => "miner",
            Role::LiquidityProvider => "user",
            Role::Whale => "whale",
            Role::Sniper => "sniper",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_name())
    }
}

/// A role together with its per-role state
#[derive(Debug, Clone)]
pub enum Behavior {
    Miner(Miner),
    LiquidityProvider(LiquidityProvider),
    Whale(Whale),
    Sniper(Sniper),
}

impl Behavior {
    pub fn for_role(role: Role, config: &SimulationConfig) -> Self {
        match role {
            Role::Miner => Behavior::Miner(Miner::new(&config.roles.miner)),
            Role::LiquidityProvider => Behavior::LiquidityProvider(LiquidityProvider::new(config)),
            Role::Whale => Behavior::Whale(Whale::new(config)),
            Role::Sniper => Behavior::Sniper(Sniper::new(config)),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Behavior::Miner(_) => Role::Miner,
            Behavior::LiquidityProvider(_) => Role::LiquidityProvider,
            Behavior::Whale(_) => Role::Whale,
            Behavior::Sniper(_) => Role::Sniper,
        }
    }

    /// Actions registered with the scheduler when the peer starts
    pub fn startup_tasks(&self) -> Vec<ScheduledTask> {
        match self {
            Behavior::Miner(miner) => miner.startup_tasks(),
            Behavior::LiquidityProvider(lp) => vec![lp.startup_task()],
            Behavior::Whale(whale) => vec![whale.startup_task()],
            // Purely reactive
            Behavior::Sniper(_) => Vec::new(),
        }
    }
}

//! Simulation configuration

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::bots::Role;
use crate::chain::transaction::SNIPER_ACTOR;
use crate::error::{SimError, SimResult};
use crate::simulation::ledger::Balances;
use crate::utils::amm_math::fee_from_bps;

/// Upper bound for the horizon and every role delay (one year)
pub const MAX_TIME_SECS: f64 = 365.0 * 24.0 * 3600.0;

/// Seconds to a `Duration`, clamped to `[0, MAX_TIME_SECS]`; NaN reads as zero
pub fn duration_from_secs(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs.clamp(0.0, MAX_TIME_SECS)).unwrap_or_default()
}

/// One simulated peer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerSpec {
    /// Participant name in the ledger
    pub name: String,
    pub role: Role,
}

impl PeerSpec {
    pub fn new(role: Role) -> Self {
        Self {
            name: role.default_name().to_string(),
            role,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinerSettings {
    /// Seconds after start at which a block is attempted
    pub block_delays_secs: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquiditySettings {
    pub delay_secs: f64,
    pub amount_a: f64,
    pub amount_b: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhaleSettings {
    pub delay_secs: f64,
    /// Token A sold for token B
    pub amount_in: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SniperSettings {
    /// Token A spent on a freshly listed pool
    pub listing_buy: f64,
    /// Token A spent ahead of a detected large swap
    pub frontrun_amount: f64,
    /// Smallest A -> B swap treated as a whale trade
    pub whale_threshold: f64,
    /// Largest price impact the front-run itself may cause
    pub slippage_tolerance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleSettings {
    pub miner: MinerSettings,
    pub liquidity: LiquiditySettings,
    pub whale: WhaleSettings,
    pub sniper: SniperSettings,
}

/// Delivery behaviour of the in-process substrate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Seed for latency and drop decisions
    pub seed: u64,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
    /// Chance that a single delivery is lost (0.0 - 1.0)
    pub drop_probability: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            seed: 7,
            min_latency_ms: 20,
            max_latency_ms: 120,
            drop_probability: 0.0,
        }
    }
}

/// Main simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// The established trading pair
    pub token_a: String,
    pub token_b: String,

    /// Balances every peer starts from
    pub initial_balances: Balances,

    /// Pool reserves every peer starts from
    pub initial_reserves: BTreeMap<String, f64>,

    /// AMM fee in basis points (30 = 0.3%)
    pub fee_bps: u16,

    pub peers: Vec<PeerSpec>,

    pub roles: RoleSettings,

    pub network: NetworkConfig,

    /// How long to run, in seconds
    pub horizon_secs: f64,
}

fn holdings(a: f64, b: f64) -> BTreeMap<String, f64> {
    let mut tokens = BTreeMap::new();
    tokens.insert("TokenA".to_string(), a);
    tokens.insert("TokenB".to_string(), b);
    tokens
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let mut initial_balances = BTreeMap::new();
        initial_balances.insert("miner".to_string(), holdings(1000.0, 1000.0));
        initial_balances.insert("sniper".to_string(), holdings(1000.0, 0.0)); // TokenA only
        initial_balances.insert("user".to_string(), holdings(1000.0, 500.0));
        initial_balances.insert("whale".to_string(), holdings(1000.0, 0.0));

        Self {
            token_a: "TokenA".to_string(),
            token_b: "TokenB".to_string(),
            initial_balances,
            initial_reserves: holdings(0.0, 0.0), // populated by liquidity
            fee_bps: 30,
            peers: vec![
                PeerSpec::new(Role::Miner),
                PeerSpec::new(Role::LiquidityProvider),
                PeerSpec::new(Role::Whale),
                PeerSpec::new(Role::Sniper),
            ],
            roles: RoleSettings {
                miner: MinerSettings {
                    block_delays_secs: vec![3.0, 7.0],
                },
                liquidity: LiquiditySettings {
                    delay_secs: 2.0,
                    amount_a: 500.0,
                    amount_b: 500.0,
                },
                whale: WhaleSettings {
                    delay_secs: 5.0,
                    amount_in: 100.0,
                },
                sniper: SniperSettings {
                    listing_buy: 10.0,
                    frontrun_amount: 10.0,
                    whale_threshold: 30.0,
                    slippage_tolerance: 0.05,
                },
            },
            network: NetworkConfig::default(),
            horizon_secs: 10.0,
        }
    }
}

impl SimulationConfig {
    /// The four-peer listing/front-run demonstration
    pub fn demo() -> Self {
        Self::default()
    }

    /// Demo on a lossless zero-jitter network
    pub fn quick_test() -> Self {
        Self {
            network: NetworkConfig {
                min_latency_ms: 10,
                max_latency_ms: 10,
                ..NetworkConfig::default()
            },
            ..Self::demo()
        }
    }

    /// Pool fee as a fraction
    pub fn fee(&self) -> f64 {
        fee_from_bps(self.fee_bps)
    }

    pub fn horizon(&self) -> Duration {
        duration_from_secs(self.horizon_secs)
    }

    pub fn validate(&self) -> SimResult<()> {
        let invalid = |msg: String| Err(SimError::InvalidConfig(msg));

        if self.fee_bps >= 10_000 {
            return invalid(format!("fee_bps must be below 10000, got {}", self.fee_bps));
        }
        if self.token_a == self.token_b {
            return invalid("token_a and token_b must differ".to_string());
        }
        if self.peers.is_empty() {
            return invalid("at least one peer is required".to_string());
        }

        let mut names: Vec<&str> = self.peers.iter().map(|p| p.name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        if names.len() != self.peers.len() {
            return invalid("peer names must be unique".to_string());
        }
        if let Some(sniper) = self.peers.iter().find(|p| p.role == Role::Sniper) {
            if sniper.name != SNIPER_ACTOR {
                return invalid(format!("the sniper peer must be named '{}'", SNIPER_ACTOR));
            }
        }

        let sniper = &self.roles.sniper;
        if sniper.frontrun_amount >= sniper.whale_threshold {
            return invalid(format!(
                "sniper front-run ({}) must be smaller than the whale threshold ({})",
                sniper.frontrun_amount, sniper.whale_threshold
            ));
        }

        let amounts = [
            sniper.listing_buy,
            sniper.frontrun_amount,
            self.roles.whale.amount_in,
            self.roles.liquidity.amount_a,
            self.roles.liquidity.amount_b,
        ];
        if amounts.iter().any(|a| !a.is_finite() || *a < 0.0) {
            return invalid("role amounts must be finite and non-negative".to_string());
        }
        if !(sniper.slippage_tolerance > 0.0 && sniper.slippage_tolerance <= 1.0) {
            return invalid(format!(
                "slippage_tolerance must be within (0, 1], got {}",
                sniper.slippage_tolerance
            ));
        }

        if !self.horizon_secs.is_finite() || !(0.0..=MAX_TIME_SECS).contains(&self.horizon_secs) {
            return invalid(format!(
                "horizon_secs must be within [0, {}], got {}",
                MAX_TIME_SECS, self.horizon_secs
            ));
        }

        let mut delays = self.roles.miner.block_delays_secs.clone();
        delays.push(self.roles.liquidity.delay_secs);
        delays.push(self.roles.whale.delay_secs);
        for delay in delays {
            if !delay.is_finite() || !(0.0..=MAX_TIME_SECS).contains(&delay) {
                return invalid(format!("delays must be within [0, {}], got {}", MAX_TIME_SECS, delay));
            }
        }

        let net = &self.network;
        if net.min_latency_ms > net.max_latency_ms {
            return invalid("min_latency_ms exceeds max_latency_ms".to_string());
        }
        if !(0.0..=1.0).contains(&net.drop_probability) {
            return invalid(format!("drop_probability must be within [0, 1], got {}", net.drop_probability));
        }

        Ok(())
    }
}

//! Decentralized Token-Exchange Simulator
//!
//! A handful of peers share one token pair. Each keeps its own ledger, AMM
//! pool view, mempool and chain. A liquidity provider lists the pair, a whale
//! swaps into it, a sniper front-runs both and a miner orders everything into
//! blocks that every other peer validates and replays.

pub mod analytics;
pub mod bots;
pub mod chain;
pub mod config;
pub mod error;
pub mod node;
pub mod simulation;
pub mod utils;

pub use config::SimulationConfig;
pub use error::{BlockRejection, SimError, SimResult};
pub use simulation::orchestrator::{Orchestrator, SimulationResults};

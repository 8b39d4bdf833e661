//! Simulation modules

pub mod ledger;
pub mod network;
pub mod orchestrator;
pub mod pool_state;
pub mod runtime;

pub use ledger::Ledger;
pub use network::{NetworkStats, SimNetwork};
pub use orchestrator::{Orchestrator, SimulationResults};
pub use pool_state::PoolReserves;
pub use runtime::LiveNetwork;

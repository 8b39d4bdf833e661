//! Simulation Orchestrator
//!
//! Builds one peer per configured role, wires them to a substrate, runs to
//! the horizon and collects the per-peer outcome.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analytics::metrics::{MetricsCalculator, RunMetrics};
use crate::config::SimulationConfig;
use crate::node::{
    peer::{PeerNode, PeerReport},
    transport::PeerId,
};
use crate::simulation::{
    network::{NetworkStats, SimNetwork},
    runtime::LiveNetwork,
};

/// Results of a complete run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResults {
    pub config: SimulationConfigSummary,
    pub peers: Vec<PeerReport>,
    /// Only the deterministic substrate counts deliveries
    pub network: Option<NetworkStats>,
    pub metrics: RunMetrics,
}

/// Summary of simulation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfigSummary {
    pub token_a: String,
    pub token_b: String,
    pub fee_bps: u16,
    pub peers: usize,
    pub horizon_secs: f64,
    pub seed: u64,
    pub drop_probability: f64,
}

/// Main simulation orchestrator
pub struct Orchestrator {
    config: SimulationConfig,
}

impl Orchestrator {
    /// Create a new orchestrator with the given configuration
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    fn build_peers(&self) -> Vec<PeerNode> {
        self.config
            .peers
            .iter()
            .enumerate()
            .map(|(i, spec)| PeerNode::from_config(i as PeerId, spec, &self.config))
            .collect()
    }

    /// Build the deterministic network without starting it
    pub fn build_network(&self) -> Result<SimNetwork> {
        self.config.validate().context("Invalid simulation config")?;

        let mut network = SimNetwork::new(self.config.network.clone());
        for peer in self.build_peers() {
            network.add_peer(peer).context("Failed to add peer")?;
        }
        Ok(network)
    }

    /// Run on the deterministic in-process network
    pub fn run(&mut self) -> Result<SimulationResults> {
        info!("Starting simulation with {} peers", self.config.peers.len());

        let mut network = self.build_network()?;
        network.start();
        network.run_until(self.config.horizon_secs);

        let reports: Vec<PeerReport> = network.nodes().map(PeerNode::report).collect();
        let results = self.collect(reports, Some(network.stats().clone()));

        info!(
            "Simulation complete at t={:.3}s, height {}, converged: {}",
            network.now(),
            results.metrics.max_height,
            results.metrics.converged
        );
        Ok(results)
    }

    /// Run on the tokio runtime for the configured wall-clock horizon
    pub async fn run_live(&mut self) -> Result<SimulationResults> {
        self.config.validate().context("Invalid simulation config")?;
        info!("Starting live simulation with {} peers", self.config.peers.len());

        let finished = LiveNetwork::new(self.config.horizon())
            .run(self.build_peers())
            .await
            .context("Live network failed")?;

        let reports: Vec<PeerReport> = finished.iter().map(PeerNode::report).collect();
        Ok(self.collect(reports, None))
    }

    fn collect(&self, peers: Vec<PeerReport>, network: Option<NetworkStats>) -> SimulationResults {
        let metrics = MetricsCalculator::compute(
            &peers,
            &self.config.initial_balances,
            &self.config.initial_reserves,
            &self.config.token_a,
            &self.config.token_b,
        );

        SimulationResults {
            config: SimulationConfigSummary {
                token_a: self.config.token_a.clone(),
                token_b: self.config.token_b.clone(),
                fee_bps: self.config.fee_bps,
                peers: self.config.peers.len(),
                horizon_secs: self.config.horizon_secs,
                seed: self.config.network.seed,
                drop_probability: self.config.network.drop_probability,
            },
            peers,
            network,
            metrics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orchestrator_quick_run() {
        let mut orchestrator = Orchestrator::new(SimulationConfig::quick_test());
        let results = orchestrator.run().unwrap();

        assert_eq!(results.peers.len(), 4);
        assert_eq!(results.metrics.max_height, 2);
        assert!(results.metrics.converged);
        assert!(results.metrics.supply_conserved);
        assert!(results.network.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_live_run_matches_deterministic_shape() {
        let mut orchestrator = Orchestrator::new(SimulationConfig::quick_test());
        let results = orchestrator.run_live().await.unwrap();

        assert!(results.network.is_none());
        assert_eq!(results.metrics.max_height, 2);
        assert!(results.metrics.converged);
        assert!(results.metrics.sniper_pnl.is_some());
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = SimulationConfig {
            fee_bps: 20_000,
            ..SimulationConfig::quick_test()
        };
        assert!(Orchestrator::new(config).run().is_err());
    }
}

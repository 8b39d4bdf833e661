//! Structured logging for simulation results

use crate::simulation::SimulationResults;
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Handles logging of simulation results to files
pub struct SimulationLogger {
    output_dir: PathBuf,
}

impl SimulationLogger {
    /// Create a new logger with the specified output directory
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    fn logs_dir(&self) -> Result<PathBuf> {
        let dir = self.output_dir.join("logs");
        fs::create_dir_all(&dir).context("Failed to create logs directory")?;
        Ok(dir)
    }

    /// Save simulation results to a timestamped JSON file
    pub fn save_results(&self, results: &SimulationResults) -> Result<PathBuf> {
        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let path = self.logs_dir()?.join(format!("simulation_{}.json", timestamp));

        let json = serde_json::to_string_pretty(results).context("Failed to serialize results")?;
        let mut file = File::create(&path).context("Failed to create log file")?;
        file.write_all(json.as_bytes())
            .context("Failed to write log file")?;

        info!("Results saved to: {}", path.display());
        Ok(path)
    }

    /// Load results from a JSON file
    pub fn load_results(path: impl AsRef<Path>) -> Result<SimulationResults> {
        let contents = fs::read_to_string(path).context("Failed to read results file")?;
        serde_json::from_str(&contents).context("Failed to parse results file")
    }
}

const WIDTH: usize = 66;

fn rule(out: &mut String, left: char, right: char) {
    let _ = writeln!(out, "{}{}{}", left, "═".repeat(WIDTH), right);
}

fn row(out: &mut String, text: &str) {
    let _ = writeln!(out, "║  {:<width$}║", text, width = WIDTH - 2);
}

/// Format results as a boxed text summary
pub fn format_summary(results: &SimulationResults) -> String {
    let cfg = &results.config;
    let m = &results.metrics;
    let mut out = String::from("\n");

    rule(&mut out, '╔', '╗');
    row(&mut out, "DEX SNIPER SIMULATION RESULTS");
    rule(&mut out, '╠', '╣');
    row(&mut out, "");
    row(&mut out, "CONFIGURATION");
    row(&mut out, "─────────────");
    row(&mut out, &format!("Pair:                  {} / {}", cfg.token_a, cfg.token_b));
    row(&mut out, &format!("Pool Fee:              {:>10.2}%", cfg.fee_bps as f64 / 100.0));
    row(&mut out, &format!("Peers:                 {:>10}", cfg.peers));
    row(&mut out, &format!("Horizon:               {:>10.1} s", cfg.horizon_secs));
    row(&mut out, &format!("Network Seed:          {:>10}", cfg.seed));
    row(&mut out, &format!("Drop Probability:      {:>10.1}%", cfg.drop_probability * 100.0));
    row(&mut out, "");
    rule(&mut out, '╠', '╣');
    row(&mut out, "");
    row(&mut out, "PEERS");
    row(&mut out, "─────");
    for peer in &results.peers {
        let a = peer.state.reserves.get(&cfg.token_a).copied().unwrap_or(0.0);
        let b = peer.state.reserves.get(&cfg.token_b).copied().unwrap_or(0.0);
        row(
            &mut out,
            &format!(
                "{:<8} h={:<3} tip={}  pool {:.2}/{:.2}",
                peer.name,
                peer.state.height,
                crate::utils::short_hash(&peer.state.tip_hash),
                a,
                b
            ),
        );
        if let Some(stats) = &peer.sniper {
            row(
                &mut out,
                &format!(
                    "         listings sniped {}, front-runs {}, expected gain {:.4}",
                    stats.listings_sniped, stats.frontruns, stats.estimated_profit
                ),
            );
        }
    }
    row(&mut out, "");
    rule(&mut out, '╠', '╣');
    row(&mut out, "");
    row(&mut out, "OUTCOME");
    row(&mut out, "───────");
    row(&mut out, &format!("Max Height:            {:>10}", m.max_height));
    row(&mut out, &format!("Chains Converged:      {:>10}", yes_no(m.converged)));
    if !m.diverged_peers.is_empty() {
        row(&mut out, &format!("Diverged:              {}", m.diverged_peers.join(", ")));
    }
    row(&mut out, &format!("Supply Conserved:      {:>10}", yes_no(m.supply_conserved)));
    if let Some(pnl) = m.sniper_pnl {
        row(&mut out, &format!("★ Sniper PnL:          {:>+10.4} {}", pnl, cfg.token_a));
    }
    if let Some(net) = &results.network {
        row(
            &mut out,
            &format!(
                "Messages:              {} sent, {} delivered, {} dropped",
                net.sent, net.delivered, net.dropped
            ),
        );
    }
    row(&mut out, "");
    rule(&mut out, '╚', '╝');

    let _ = writeln!(
        out,
        "\nGenerated: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );
    out
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "NO"
    }
}

/// Print summary to console
pub fn print_summary(results: &SimulationResults) {
    println!("{}", format_summary(results));
}

//! DEX Simulation CLI
//!
//! Command-line interface for the token-exchange sniper simulation.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use dex_sniper_sim::{
    analytics::logger::{print_summary, SimulationLogger},
    config::SimulationConfig,
    simulation::Orchestrator,
};

#[derive(Parser)]
#[command(name = "dex-sim")]
#[command(version = "0.1.0")]
#[command(about = "Decentralized token-exchange simulator with a mempool sniper", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the demo on the deterministic in-process network
    Run {
        /// Seed for latency and drop sampling
        #[arg(short, long, default_value = "7")]
        seed: u64,

        /// Minimum one-way latency in milliseconds
        #[arg(long, default_value = "20")]
        min_latency_ms: u64,

        /// Maximum one-way latency in milliseconds
        #[arg(long, default_value = "120")]
        max_latency_ms: u64,

        /// Probability that a message is lost (0.0 - 1.0)
        #[arg(long, default_value = "0.0")]
        drop_probability: f64,

        /// Simulated run length in seconds
        #[arg(long, default_value = "10.0")]
        horizon: f64,

        /// AMM fee in basis points
        #[arg(long, default_value = "30")]
        fee_bps: u16,

        /// Whale swap size in token A
        #[arg(long, default_value = "100.0")]
        whale_amount: f64,

        /// Largest price impact the sniper accepts on a front-run
        #[arg(long, default_value = "0.05")]
        slippage_tolerance: f64,

        /// Write the full results as JSON under this directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the demo in real time on the tokio runtime
    Live {
        /// Wall-clock run length in seconds
        #[arg(long, default_value = "10.0")]
        horizon: f64,

        /// Write the full results as JSON under this directory
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the demo on a lossless zero-jitter network
    Quick,

    /// Print configuration info
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging; RUST_LOG wins over --verbose
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.as_str().to_lowercase()));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    match cli.command {
        Commands::Run {
            seed,
            min_latency_ms,
            max_latency_ms,
            drop_probability,
            horizon,
            fee_bps,
            whale_amount,
            slippage_tolerance,
            output,
        } => {
            let mut config = SimulationConfig::demo();
            config.network.seed = seed;
            config.network.min_latency_ms = min_latency_ms;
            config.network.max_latency_ms = max_latency_ms;
            config.network.drop_probability = drop_probability;
            config.horizon_secs = horizon;
            config.fee_bps = fee_bps;
            config.roles.whale.amount_in = whale_amount;
            config.roles.sniper.slippage_tolerance = slippage_tolerance;

            print_banner("Deterministic Network");
            log_config(&config);

            let results = Orchestrator::new(config).run()?;
            print_summary(&results);
            save(&results, output)?;
        }

        Commands::Live { horizon, output } => {
            let config = SimulationConfig {
                horizon_secs: horizon,
                ..SimulationConfig::demo()
            };

            print_banner("Live Runtime");
            log_config(&config);

            let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
            let results = runtime.block_on(Orchestrator::new(config).run_live())?;
            print_summary(&results);
            save(&results, output)?;
        }

        Commands::Quick => {
            println!();
            println!("🚀 Running quick simulation...");
            let results = Orchestrator::new(SimulationConfig::quick_test()).run()?;
            print_summary(&results);
        }

        Commands::Info => {
            print_info();
        }
    }

    Ok(())
}

fn print_banner(mode: &str) {
    println!();
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║       DEX Sniper Simulation                              ║");
    println!("║       {:<51}║", mode);
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();
}

fn log_config(config: &SimulationConfig) {
    info!("Configuration:");
    info!("  Pair:              {} / {}", config.token_a, config.token_b);
    info!("  Peers:             {}", config.peers.len());
    info!("  Fee:               {:.2}%", config.fee_bps as f64 / 100.0);
    info!(
        "  Latency:           {}-{} ms, drop {:.0}%",
        config.network.min_latency_ms,
        config.network.max_latency_ms,
        config.network.drop_probability * 100.0
    );
    info!("  Horizon:           {:.1} s", config.horizon_secs);
}

fn save(results: &dex_sniper_sim::SimulationResults, output: Option<PathBuf>) -> Result<()> {
    if let Some(dir) = output {
        let path = SimulationLogger::new(dir).save_results(results)?;
        println!("📁 Results saved to: {}", path.display());
        println!();
    }
    Ok(())
}

fn print_info() {
    let config = SimulationConfig::demo();

    println!();
    println!("╔══════════════════════════════════════════════════════════╗");
    println!("║       DEX Sniper Simulation - Info                       ║");
    println!("╚══════════════════════════════════════════════════════════╝");
    println!();
    println!("Peers share one {}/{} pool and replay each other's blocks.", config.token_a, config.token_b);
    println!();
    println!("ROLES:");
    println!(
        "  • Miner      - Mines blocks at {:?} s",
        config.roles.miner.block_delays_secs
    );
    println!(
        "  • User       - Lists the pair with {}/{} at {} s",
        config.roles.liquidity.amount_a, config.roles.liquidity.amount_b, config.roles.liquidity.delay_secs
    );
    println!(
        "  • Whale      - Swaps {} {} at {} s",
        config.roles.whale.amount_in, config.token_a, config.roles.whale.delay_secs
    );
    println!(
        "  • Sniper     - Buys {} on listing, front-runs swaps of {}+ with up to {} (max impact {:.1}%)",
        config.roles.sniper.listing_buy,
        config.roles.sniper.whale_threshold,
        config.roles.sniper.frontrun_amount,
        config.roles.sniper.slippage_tolerance * 100.0
    );
    println!();
    println!("USAGE:");
    println!("  dex-sim run --seed 42          # Deterministic run");
    println!("  dex-sim live --horizon 10      # Real-time run");
    println!("  dex-sim quick                  # Lossless quick run");
    println!();
}

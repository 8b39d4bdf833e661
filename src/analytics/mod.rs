//! Analytics modules for metrics and result summaries

pub mod logger;
pub mod metrics;

pub use logger::{format_summary, print_summary, SimulationLogger};
pub use metrics::{MetricsCalculator, RunMetrics};

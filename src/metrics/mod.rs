//! Prometheus metrics for QKD runs.
//!
//! # Metrics Exposed
//!
//! ## Simulation Metrics
//! - `bb84_simulations_total` - Simulation runs
//! - `bb84_simulations_failed_total` - Simulation runs that failed
//! - `bb84_secure_runs_total` - Runs with QBER below the threshold
//! - `bb84_last_qber` - QBER of the latest run
//! - `bb84_last_sifted_key_length` - Sifted key length of the latest simulation
//! - `bb84_bit_source_total{tier}` - Bit draws per fallback tier
//!
//! ## Testbed Metrics
//! - `bb84_testbed_analyses_total` - Lab and mobile analyses
//! - `bb84_testbed_failed_total` - Analyses that failed
//! - `bb84_last_suitability_score` - Score of the latest analysis
//!
//! With the `metrics` feature, `MetricsExporter` serves the registry
//! over HTTP.
//!
//! # Example
//!
//! ```no_run
//! use bb84_qkd::metrics::{MetricsRegistry, MetricsSnapshot, RunKind};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//! registry.record(&MetricsSnapshot::failed(RunKind::Simulation));
//! println!("{}", registry.encode().unwrap());
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot, RunKind};
#[cfg(feature = "metrics")]
pub use server::{ExporterConfig, MetricsExporter, ServerError, DEFAULT_EXPORTER_PORT};

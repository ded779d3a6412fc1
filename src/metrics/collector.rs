//! Metrics collection and registry.

use crate::orchestration::{MobileReport, SimulationResult, TestbedReport};
use crate::randomness::Tier;
use prometheus::{Encoder, Gauge, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Which orchestrator produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    Simulation,
    Testbed,
}

/// Outcome of one run, as seen by the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub kind: RunKind,
    pub succeeded: bool,
    pub secure: bool,
    pub qber: Option<f64>,
    pub sifted_length: Option<usize>,
    /// Tier that produced the run's bits, if any were drawn.
    pub bit_source: Option<Tier>,
    pub suitability_score: Option<u32>,
}

impl MetricsSnapshot {
    pub fn from_simulation(result: &SimulationResult) -> Self {
        Self {
            kind: RunKind::Simulation,
            succeeded: true,
            secure: result.is_secure,
            qber: Some(result.qber),
            sifted_length: Some(result.alice_sifted.len()),
            bit_source: result.bit_source,
            suitability_score: None,
        }
    }

    pub fn from_testbed(report: &TestbedReport) -> Self {
        Self {
            kind: RunKind::Testbed,
            succeeded: true,
            secure: report.is_secure,
            qber: Some(report.metrics.qber),
            sifted_length: None,
            bit_source: None,
            suitability_score: Some(report.analysis.suitability_score),
        }
    }

    pub fn from_mobile(report: &MobileReport) -> Self {
        Self {
            kind: RunKind::Testbed,
            succeeded: true,
            secure: report.is_secure,
            qber: Some(report.metrics.qber),
            sifted_length: None,
            bit_source: None,
            suitability_score: Some(report.analysis.suitability_score),
        }
    }

    /// A failed run of `kind`.
    pub fn failed(kind: RunKind) -> Self {
        Self {
            kind,
            succeeded: false,
            secure: false,
            qber: None,
            sifted_length: None,
            bit_source: None,
            suitability_score: None,
        }
    }
}

/// Prometheus metrics registry for QKD runs.
pub struct MetricsRegistry {
    registry: Registry,

    // Simulation metrics
    simulations_total: IntCounter,
    simulations_failed: IntCounter,
    secure_runs: IntCounter,
    last_qber: Gauge,
    last_sifted_length: IntGauge,
    bit_source_total: IntCounterVec,

    // Testbed metrics
    testbed_total: IntCounter,
    testbed_failed: IntCounter,
    last_suitability_score: IntGauge,
}

impl MetricsRegistry {
    /// Creates a new registry with all run metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let simulations_total = IntCounter::new(
            "bb84_simulations_total",
            "Total number of simulation runs",
        )?;
        let simulations_failed = IntCounter::new(
            "bb84_simulations_failed_total",
            "Simulation runs that ended in an error",
        )?;
        let secure_runs = IntCounter::new(
            "bb84_secure_runs_total",
            "Successful runs whose QBER was below the threshold",
        )?;
        let last_qber = Gauge::new("bb84_last_qber", "QBER of the most recent run")?;
        let last_sifted_length = IntGauge::new(
            "bb84_last_sifted_key_length",
            "Sifted key length of the most recent simulation",
        )?;
        let bit_source_total = IntCounterVec::new(
            Opts::new("bb84_bit_source_total", "Bit draws served per tier"),
            &["tier"],
        )?;

        let testbed_total = IntCounter::new(
            "bb84_testbed_analyses_total",
            "Total number of testbed analyses",
        )?;
        let testbed_failed = IntCounter::new(
            "bb84_testbed_failed_total",
            "Testbed analyses that ended in an error",
        )?;
        let last_suitability_score = IntGauge::new(
            "bb84_last_suitability_score",
            "Suitability score of the most recent analysis",
        )?;

        registry.register(Box::new(simulations_total.clone()))?;
        registry.register(Box::new(simulations_failed.clone()))?;
        registry.register(Box::new(secure_runs.clone()))?;
        registry.register(Box::new(last_qber.clone()))?;
        registry.register(Box::new(last_sifted_length.clone()))?;
        registry.register(Box::new(bit_source_total.clone()))?;
        registry.register(Box::new(testbed_total.clone()))?;
        registry.register(Box::new(testbed_failed.clone()))?;
        registry.register(Box::new(last_suitability_score.clone()))?;

        // Touch every tier so the series exist before the first draw.
        for tier in [Tier::Hardware, Tier::Simulator, Tier::Classical] {
            bit_source_total.with_label_values(&[tier_label(tier)]);
        }

        Ok(Self {
            registry,
            simulations_total,
            simulations_failed,
            secure_runs,
            last_qber,
            last_sifted_length,
            bit_source_total,
            testbed_total,
            testbed_failed,
            last_suitability_score,
        })
    }

    /// Records one run.
    pub fn record(&self, snapshot: &MetricsSnapshot) {
        match snapshot.kind {
            RunKind::Simulation => {
                self.simulations_total.inc();
                if !snapshot.succeeded {
                    self.simulations_failed.inc();
                }
            }
            RunKind::Testbed => {
                self.testbed_total.inc();
                if !snapshot.succeeded {
                    self.testbed_failed.inc();
                }
            }
        }
        if !snapshot.succeeded {
            return;
        }

        if snapshot.secure {
            self.secure_runs.inc();
        }
        if let Some(qber) = snapshot.qber {
            self.last_qber.set(qber);
        }
        if let Some(len) = snapshot.sifted_length {
            self.last_sifted_length.set(len as i64);
        }
        if let Some(tier) = snapshot.bit_source {
            self.bit_source_total.with_label_values(&[tier_label(tier)]).inc();
        }
        if let Some(score) = snapshot.suitability_score {
            self.last_suitability_score.set(i64::from(score));
        }
    }

    /// Simulation runs recorded so far, failed ones included.
    pub fn simulations_recorded(&self) -> u64 {
        self.simulations_total.get()
    }

    /// Testbed analyses recorded so far, failed ones included.
    pub fn testbed_analyses_recorded(&self) -> u64 {
        self.testbed_total.get()
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

fn tier_label(tier: Tier) -> &'static str {
    match tier {
        Tier::Hardware => "hardware",
        Tier::Simulator => "simulator",
        Tier::Classical => "classical",
    }
}

impl std::fmt::Debug for MetricsRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRegistry")
            .field("simulations_total", &self.simulations_total.get())
            .field("testbed_total", &self.testbed_total.get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simulation(secure: bool, tier: Tier) -> MetricsSnapshot {
        MetricsSnapshot {
            kind: RunKind::Simulation,
            succeeded: true,
            secure,
            qber: Some(if secure { 0.05 } else { 0.3 }),
            sifted_length: Some(12),
            bit_source: Some(tier),
            suitability_score: None,
        }
    }

    #[test]
    fn test_registry_creation() {
        assert!(MetricsRegistry::new().is_ok());
    }

    #[test]
    fn test_simulation_metrics() {
        let registry = MetricsRegistry::new().unwrap();
        registry.record(&simulation(true, Tier::Classical));
        registry.record(&simulation(false, Tier::Simulator));
        registry.record(&MetricsSnapshot::failed(RunKind::Simulation));

        let output = registry.encode().unwrap();
        assert!(output.contains("bb84_simulations_total 3"));
        assert!(output.contains("bb84_simulations_failed_total 1"));
        assert!(output.contains("bb84_secure_runs_total 1"));
        assert!(output.contains("bb84_last_qber 0.3"));
        assert!(output.contains("bb84_last_sifted_key_length 12"));
        assert!(output.contains(r#"bb84_bit_source_total{tier="simulator"} 1"#));
        assert!(output.contains(r#"bb84_bit_source_total{tier="hardware"} 0"#));
    }

    #[test]
    fn test_testbed_metrics() {
        let registry = MetricsRegistry::new().unwrap();
        registry.record(&MetricsSnapshot {
            kind: RunKind::Testbed,
            succeeded: true,
            secure: true,
            qber: Some(0.01),
            sifted_length: None,
            bit_source: None,
            suitability_score: Some(85),
        });

        let output = registry.encode().unwrap();
        assert!(output.contains("bb84_testbed_analyses_total 1"));
        assert!(output.contains("bb84_last_suitability_score 85"));
        assert!(output.contains("bb84_simulations_total 0"));
        assert_eq!(registry.testbed_analyses_recorded(), 1);
        assert_eq!(registry.simulations_recorded(), 0);
    }
}

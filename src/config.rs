//! File-based configuration.
//!
//! Every request field has a default, so a config file only needs the
//! values it changes. Sections map one-to-one to the orchestrators and
//! the quantum backend.

use crate::backend::{CircuitSimulator, QuantumService};
use crate::channel::AttackKind;
use crate::orchestration::{
    BackendType, GenerationMethod, Scenario, SimulationOrchestrator, SimulationRequest,
    TestbedOrchestrator,
};
use crate::protocol::{
    ErrorCorrection, PrivacyAmplification, SecurityPolicy, DEFAULT_AMPLIFICATION_FACTOR,
    DEFAULT_QBER_THRESHOLD,
};
use crate::randomness::{ClassicalRng, RandomSource, RngMode};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub testbed: TestbedConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

/// Defaults applied to simulation requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub scenario: Scenario,
    pub bits: String,
    pub bases: String,
    pub num_qubits: usize,
    pub rng_type: RngMode,
    /// MHz.
    pub photon_rate: f64,
    pub photon_count: u64,
    pub generation_method: GenerationMethod,
    /// km.
    pub distance: f64,
    pub noise: f64,
    pub eve_attack: AttackKind,
    pub error_correction: ErrorCorrection,
    pub privacy_amplification: PrivacyAmplification,
    pub backend_type: BackendType,
    /// Share of the key kept by privacy amplification.
    pub amplification_factor: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            scenario: Scenario::Manual,
            bits: "0110".to_string(),
            bases: "+x+x".to_string(),
            num_qubits: 4,
            rng_type: RngMode::Classical,
            photon_rate: 100.0,
            photon_count: 50,
            generation_method: GenerationMethod::Standard,
            distance: 10.0,
            noise: 0.1,
            eve_attack: AttackKind::None,
            error_correction: ErrorCorrection::Cascade,
            privacy_amplification: PrivacyAmplification::Standard,
            backend_type: BackendType::Classical,
            amplification_factor: DEFAULT_AMPLIFICATION_FACTOR,
        }
    }
}

impl SimulationConfig {
    /// Builds a request populated with these defaults.
    pub fn request(&self) -> SimulationRequest {
        SimulationRequest {
            scenario: self.scenario,
            bits: self.bits.clone(),
            bases: self.bases.clone(),
            num_qubits: self.num_qubits,
            rng_type: self.rng_type,
            photon_rate: self.photon_rate,
            photon_count: self.photon_count,
            generation_method: self.generation_method,
            distance: self.distance,
            noise: self.noise,
            eve_attack: self.eve_attack,
            error_correction: self.error_correction,
            privacy_amplification: self.privacy_amplification,
            backend_type: self.backend_type,
            api_key: None,
        }
    }
}

/// Testbed analysis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TestbedConfig {
    /// MHz.
    pub photon_rate: f64,
    /// Fiber length used for lab key-rate estimates (km).
    pub distance: f64,
    pub qber_threshold: f64,
}

impl Default for TestbedConfig {
    fn default() -> Self {
        Self {
            photon_rate: 150.0,
            distance: 10.0,
            qber_threshold: DEFAULT_QBER_THRESHOLD,
        }
    }
}

/// Quantum backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Bounded wait for any hardware call, in milliseconds.
    pub timeout_ms: u64,
    /// Environment variable consulted when a request has no credential.
    pub credential_env: String,
    /// Register width of the in-process simulator.
    pub simulator_qubits: usize,
    /// Fixed simulator seed for reproducible runs.
    pub simulator_seed: Option<u64>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            credential_env: "BB84_QUANTUM_API_KEY".to_string(),
            simulator_qubits: 32,
            simulator_seed: None,
        }
    }
}

impl BackendConfig {
    #[inline]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Resolves the credential: explicit value first, then the
    /// configured environment variable.
    pub fn resolve_credential(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .filter(|c| !c.trim().is_empty())
            .map(str::to_string)
            .or_else(|| {
                std::env::var(&self.credential_env)
                    .ok()
                    .filter(|c| !c.trim().is_empty())
            })
    }

    /// Builds a random source around `hardware` with this
    /// configuration's simulator and timeout.
    pub fn random_source(&self, rng: ClassicalRng, hardware: Arc<dyn QuantumService>) -> RandomSource {
        let simulator = match self.simulator_seed {
            Some(seed) => CircuitSimulator::with_seed(self.simulator_qubits, seed),
            None => CircuitSimulator::new(self.simulator_qubits),
        };
        RandomSource::new(rng, hardware, Arc::new(simulator), self.timeout())
    }
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Simulation orchestrator using this configuration. Requests
    /// without a key fall back to the configured environment variable.
    pub fn simulation_orchestrator(&self, rng: ClassicalRng, hardware: Arc<dyn QuantumService>) -> SimulationOrchestrator {
        SimulationOrchestrator::new(self.backend.random_source(rng, hardware))
            .with_policy(SecurityPolicy::new(self.testbed.qber_threshold))
            .with_amplification_factor(self.simulation.amplification_factor)
            .with_default_credential(self.backend.resolve_credential(None))
    }

    /// Testbed orchestrator using this configuration. Lab analyses
    /// without a key fall back to the configured environment variable.
    pub fn testbed_orchestrator(&self, rng: ClassicalRng, hardware: Arc<dyn QuantumService>) -> TestbedOrchestrator {
        TestbedOrchestrator::new(rng, hardware, self.backend.timeout())
            .with_distance(self.testbed.distance)
            .with_policy(SecurityPolicy::new(self.testbed.qber_threshold))
            .with_default_credential(self.backend.resolve_credential(None))
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "backend.timeout_ms",
                reason: "must be positive".to_string(),
            });
        }
        if self.backend.simulator_qubits == 0 {
            return Err(ConfigError::InvalidValue {
                field: "backend.simulator_qubits",
                reason: "must be positive".to_string(),
            });
        }
        let threshold = self.testbed.qber_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "testbed.qber_threshold",
                reason: format!("{} is outside (0, 1]", threshold),
            });
        }
        let factor = self.simulation.amplification_factor;
        if !(factor > 0.0 && factor <= 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "simulation.amplification_factor",
                reason: format!("{} is outside (0, 1]", factor),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.simulation.bits, "0110");
        assert_eq!(config.testbed.photon_rate, 150.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = FileConfig::from_toml(
            r#"
            [simulation]
            scenario = "auto"
            num_qubits = 16
            eve_attack = "intercept_resend"

            [backend]
            timeout_ms = 250
            "#,
        )
        .unwrap();

        assert_eq!(config.simulation.scenario, Scenario::Auto);
        assert_eq!(config.simulation.num_qubits, 16);
        assert_eq!(config.simulation.eve_attack, AttackKind::InterceptResend);
        assert_eq!(config.simulation.noise, 0.1);
        assert_eq!(config.backend.timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_zero_timeout_invalid() {
        let result = FileConfig::from_toml("[backend]\ntimeout_ms = 0\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { field: "backend.timeout_ms", .. })
        ));
    }

    #[test]
    fn test_bad_threshold_invalid() {
        let result = FileConfig::from_toml("[testbed]\nqber_threshold = 1.5\n");
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_unknown_enum_value_is_parse_error() {
        let result = FileConfig::from_toml("[simulation]\neve_attack = \"photon_splitting\"\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_explicit_credential_wins() {
        let backend = BackendConfig {
            credential_env: "BB84_TEST_UNSET_CREDENTIAL_VAR".to_string(),
            ..Default::default()
        };
        assert_eq!(backend.resolve_credential(Some("key")), Some("key".to_string()));
        assert_eq!(backend.resolve_credential(Some("  ")), None);
        assert_eq!(backend.resolve_credential(None), None);
    }

    #[test]
    fn test_configured_orchestrator_runs() {
        let config = FileConfig::from_toml("[backend]\nsimulator_seed = 9\n").unwrap();
        let mut orch = config.simulation_orchestrator(
            ClassicalRng::seed_from_u64(1),
            Arc::new(crate::backend::UnavailableService),
        );
        let result = orch.run(&config.simulation.request()).unwrap();
        assert_eq!(result.alice_bits.to_string(), "0110");
    }

    #[test]
    fn test_orchestrators_read_credential_from_environment() {
        std::env::set_var("BB84_TEST_ORCHESTRATOR_KEY", "env-token");
        let config = FileConfig::from_toml(
            "[backend]\ncredential_env = \"BB84_TEST_ORCHESTRATOR_KEY\"\n",
        )
        .unwrap();
        let hardware: Arc<dyn QuantumService> = Arc::new(crate::backend::MockQuantumDevice::new());

        let mut sim = config.simulation_orchestrator(ClassicalRng::seed_from_u64(1), Arc::clone(&hardware));
        let request = SimulationRequest::auto(4).with_rng(RngMode::Quantum);
        let result = sim.run(&request).unwrap();
        assert_eq!(result.bit_source, Some(crate::randomness::Tier::Hardware));

        let mut testbed = config.testbed_orchestrator(ClassicalRng::seed_from_u64(2), hardware);
        let report = testbed.analyze_lab(150.0, None).unwrap();
        assert!(report.device_info.connected);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bb84.toml");
        std::fs::write(&path, "[testbed]\nphoton_rate = 80.0\n").unwrap();

        let config = FileConfig::from_file(&path).unwrap();
        assert_eq!(config.testbed.photon_rate, 80.0);
        assert!(matches!(
            FileConfig::from_file(dir.path().join("missing.toml")),
            Err(ConfigError::FileReadError(_))
        ));
    }
}

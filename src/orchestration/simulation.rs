//! One BB84 run from preparation to security verdict.

use super::error::{RunError, RunFailure, SIMULATION_FAILED};
use crate::bits::{BasisSequence, Bit, BitSequence, SequenceError};
use crate::channel::{AttackKind, ChannelModel, EavesdropperModel};
use crate::config::SimulationConfig;
use crate::protocol::{
    amplify, apply_error_correction, qber, sift, ErrorCorrection, PrivacyAmplification,
    SecurityPolicy, DEFAULT_AMPLIFICATION_FACTOR,
};
use crate::randomness::{RandomSource, RngMode, Tier};
use crate::runlog::{LogEntry, RunLog};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Smallest and largest qubit count derived from a photon count.
const PHOTON_QUBIT_RANGE: (usize, usize) = (4, 32);

/// Largest register requested from real quantum hardware.
const REAL_QUANTUM_MAX_QUBITS: usize = 4;

/// How Alice's bits are obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    /// Caller supplies bits and bases.
    #[default]
    Manual,
    /// Bits come from the random source.
    Auto,
    /// Qubit count follows from a photon count.
    Photon,
}

/// Generation method reported for photon runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMethod {
    #[default]
    Standard,
    PhotonBased,
}

/// Backend the run is attributed to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendType {
    #[default]
    Classical,
    Qiskit,
    RealQuantum,
}

impl BackendType {
    fn generator_name(self) -> &'static str {
        match self {
            BackendType::Classical => "classical mathematical",
            _ => "qiskit simulator",
        }
    }
}

/// Parameters of a simulation run. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationRequest {
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
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for SimulationRequest {
    fn default() -> Self {
        SimulationConfig::default().request()
    }
}

impl SimulationRequest {
    /// A manual run over the given bit and basis strings.
    pub fn manual(bits: impl Into<String>, bases: impl Into<String>) -> Self {
        Self {
            scenario: Scenario::Manual,
            bits: bits.into(),
            bases: bases.into(),
            ..Default::default()
        }
    }

    /// An auto run over `num_qubits` generated qubits.
    pub fn auto(num_qubits: usize) -> Self {
        Self {
            scenario: Scenario::Auto,
            num_qubits,
            ..Default::default()
        }
    }

    /// A photon-based run over `photon_count` photons.
    pub fn photon(photon_count: u64) -> Self {
        Self {
            scenario: Scenario::Photon,
            photon_count,
            generation_method: GenerationMethod::PhotonBased,
            ..Default::default()
        }
    }

    pub fn with_channel(mut self, distance: f64, noise: f64) -> Self {
        self.distance = distance;
        self.noise = noise;
        self
    }

    pub fn with_attack(mut self, eve_attack: AttackKind) -> Self {
        self.eve_attack = eve_attack;
        self
    }

    pub fn with_backend(mut self, backend_type: BackendType) -> Self {
        self.backend_type = backend_type;
        self
    }

    pub fn with_rng(mut self, rng_type: RngMode) -> Self {
        self.rng_type = rng_type;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_post_processing(
        mut self,
        error_correction: ErrorCorrection,
        privacy_amplification: PrivacyAmplification,
    ) -> Self {
        self.error_correction = error_correction;
        self.privacy_amplification = privacy_amplification;
        self
    }
}

/// Effective qubit count for a photon run: 30% of the photons, kept
/// within [4, 32].
pub fn photon_qubit_count(photon_count: u64) -> usize {
    let detected = usize::try_from(photon_count.saturating_mul(3) / 10).unwrap_or(usize::MAX);
    detected.clamp(PHOTON_QUBIT_RANGE.0, PHOTON_QUBIT_RANGE.1)
}

/// The request's own key, else `fallback`.
fn credential<'a>(request: &'a SimulationRequest, fallback: Option<&'a str>) -> Option<&'a str> {
    request
        .api_key
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .or(fallback)
}

/// Complete record of a successful run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename = "success")]
pub struct SimulationResult {
    pub alice_bits: BitSequence,
    pub alice_bases: BasisSequence,
    pub bob_bits: BitSequence,
    pub bob_bases: BasisSequence,
    /// Empty when there was no attack.
    pub eve_bases: BasisSequence,
    pub alice_sifted: BitSequence,
    pub bob_sifted: BitSequence,
    pub alice_corrected: BitSequence,
    pub bob_corrected: BitSequence,
    pub final_key: BitSequence,
    pub qber: f64,
    pub is_secure: bool,
    /// kbps.
    pub key_generation_rate: f64,
    pub key_accuracy: f64,
    pub errors_corrected: usize,
    pub backend_used: BackendType,
    pub eve_detection_probability: f64,
    pub channel_error_rate: f64,
    pub quantum_bits_generated: bool,
    /// Tier that produced Alice's bits; `None` for manual input.
    pub bit_source: Option<Tier>,
    pub rng_type: RngMode,
    pub generation_method: GenerationMethod,
    pub classical_fidelity: f64,
    pub simulator_fidelity: f64,
    pub device_fidelity: f64,
    pub num_qubits: usize,
    pub logs: Vec<LogEntry>,
}

/// Alice's prepared qubits and how they were made.
struct Preparation {
    bits: BitSequence,
    bases: BasisSequence,
    quantum_used: bool,
    tier: Option<Tier>,
    rng_type: RngMode,
    generation_method: GenerationMethod,
}

/// Runs BB84 simulations.
///
/// Each call to [`run`](Self::run) starts a fresh log and owns every
/// intermediate sequence; nothing carries over between runs except the
/// random source's state. Not meant to be shared across threads.
pub struct SimulationOrchestrator {
    source: RandomSource,
    policy: SecurityPolicy,
    amplification_factor: f64,
    default_credential: Option<String>,
}

impl SimulationOrchestrator {
    pub fn new(source: RandomSource) -> Self {
        Self {
            source,
            policy: SecurityPolicy::default(),
            amplification_factor: DEFAULT_AMPLIFICATION_FACTOR,
            default_credential: None,
        }
    }

    /// Credential used when a request carries no `api_key`.
    pub fn with_default_credential(mut self, credential: Option<String>) -> Self {
        self.default_credential = credential;
        self
    }

    pub fn with_policy(mut self, policy: SecurityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_amplification_factor(mut self, factor: f64) -> Self {
        self.amplification_factor = factor;
        self
    }

    #[inline]
    pub fn policy(&self) -> &SecurityPolicy {
        &self.policy
    }

    /// Executes one run.
    pub fn run(&mut self, request: &SimulationRequest) -> Result<SimulationResult, RunFailure> {
        let mut log = RunLog::new();
        match self.execute(request, &mut log) {
            Ok(mut result) => {
                info!(
                    qber = result.qber,
                    sifted = result.alice_sifted.len(),
                    secure = result.is_secure,
                    "Simulation complete"
                );
                result.logs = log.into_entries();
                Ok(result)
            }
            Err(e) => {
                log.error(format!("Simulation aborted: {}", e));
                Err(RunFailure::new(e, SIMULATION_FAILED, log.into_entries()))
            }
        }
    }

    fn execute(&mut self, request: &SimulationRequest, log: &mut RunLog) -> Result<SimulationResult, RunError> {
        let prepared = match request.scenario {
            Scenario::Manual => self.prepare_manual(request, log)?,
            Scenario::Auto => self.prepare_auto(request, log)?,
            Scenario::Photon => self.prepare_photon(request, log)?,
        };
        let num_qubits = prepared.bits.len();
        log.info(format!("Alice prepares {} qubits", num_qubits));

        let channel = ChannelModel::new(request.distance, request.noise)?;
        let transmission = channel.transmit(&prepared.bits, self.source.rng());
        debug!(
            flips = transmission.flips,
            losses = transmission.losses,
            "Channel transmission"
        );

        let interception = EavesdropperModel::new(request.eve_attack).attack(
            &transmission.received,
            &prepared.bases,
            self.source.rng(),
        )?;
        if request.eve_attack == AttackKind::InterceptResend {
            log.warning("Eve intercepts with intercept_resend attack");
        }

        // Bob's bits are the channel output as-is; only his bases are drawn.
        let bob_bases = self.source.bases(num_qubits);
        let bob_bits = interception.forwarded;
        log.info("Bob measures qubits with random bases");

        let sifted = sift(&prepared.bits, &prepared.bases, &bob_bits, &bob_bases)?;
        log.info(format!("Key sifting: {} bits retained", sifted.len()));

        let qber = qber(&sifted.alice, &sifted.bob);
        let is_secure = match self.policy.check(qber) {
            Ok(()) => {
                log.success(format!(
                    "QBER: {:.3} < threshold {} - Secure",
                    qber, self.policy.threshold
                ));
                true
            }
            Err(violation) => {
                log.error(format!("{} - Not Secure", violation));
                false
            }
        };

        let reconciled = apply_error_correction(request.error_correction, &sifted.alice, &sifted.bob);
        if request.error_correction == ErrorCorrection::Cascade {
            log.info(format!(
                "Error correction: {} errors corrected",
                reconciled.corrected
            ));
        }

        let final_key = match request.privacy_amplification {
            PrivacyAmplification::Standard => {
                let key = amplify(&reconciled.alice, self.amplification_factor);
                log.info(format!(
                    "Privacy amplification: Key reduced to {} bits",
                    key.len()
                ));
                key
            }
            PrivacyAmplification::None => reconciled.alice.clone(),
        };

        let key_generation_rate = final_key.len() as f64 * request.photon_rate / 1000.0;
        let key_accuracy = if qber < 1.0 { 1.0 - qber } else { 0.0 };
        let (classical_fidelity, simulator_fidelity, device_fidelity) = match request.backend_type {
            BackendType::Classical => (1.0, 0.0, 0.0),
            BackendType::Qiskit => (0.0, 0.999, 0.0),
            BackendType::RealQuantum => (0.0, 0.0, 0.95 + self.source.rng().uniform(-0.05, 0.03)),
        };

        Ok(SimulationResult {
            alice_bits: prepared.bits,
            alice_bases: prepared.bases,
            bob_bits,
            bob_bases,
            eve_bases: interception.eve_bases,
            alice_sifted: sifted.alice,
            bob_sifted: sifted.bob,
            alice_corrected: reconciled.alice,
            bob_corrected: reconciled.bob,
            final_key,
            qber,
            is_secure,
            key_generation_rate,
            key_accuracy,
            errors_corrected: reconciled.corrected,
            backend_used: request.backend_type,
            eve_detection_probability: interception.detection_probability,
            channel_error_rate: transmission.error_rate,
            quantum_bits_generated: prepared.quantum_used,
            bit_source: prepared.tier,
            rng_type: prepared.rng_type,
            generation_method: prepared.generation_method,
            classical_fidelity,
            simulator_fidelity,
            device_fidelity,
            num_qubits,
            logs: Vec::new(),
        })
    }

    fn prepare_manual(&mut self, request: &SimulationRequest, log: &mut RunLog) -> Result<Preparation, RunError> {
        log.info("Starting BB84 simulation with manual input");

        if request.bits.chars().count() != request.bases.chars().count() {
            return Err(RunError::Validation(
                "Bits and bases strings must have the same length".to_string(),
            ));
        }
        let bits: BitSequence = request
            .bits
            .parse()
            .map_err(|e: SequenceError| RunError::Validation(e.to_string()))?;
        if bits.iter().any(|b| b == Bit::Lost) {
            return Err(RunError::Validation(
                "Alice's bits must contain only 0 and 1".to_string(),
            ));
        }
        let bases: BasisSequence = request
            .bases
            .parse()
            .map_err(|e: SequenceError| RunError::Validation(e.to_string()))?;

        Ok(Preparation {
            bits,
            bases,
            quantum_used: false,
            tier: None,
            rng_type: RngMode::Classical,
            generation_method: GenerationMethod::Standard,
        })
    }

    fn prepare_auto(&mut self, request: &SimulationRequest, log: &mut RunLog) -> Result<Preparation, RunError> {
        self.prepare_generated(request, request.rng_type, GenerationMethod::Standard, log)
    }

    /// Photon runs request classical bits; a real quantum backend still
    /// routes a standard run through the quantum chain.
    fn prepare_photon(&mut self, request: &SimulationRequest, log: &mut RunLog) -> Result<Preparation, RunError> {
        self.prepare_generated(request, RngMode::Classical, request.generation_method, log)
    }

    fn prepare_generated(
        &mut self,
        request: &SimulationRequest,
        rng_type: RngMode,
        method: GenerationMethod,
        log: &mut RunLog,
    ) -> Result<Preparation, RunError> {
        let mode_name = match rng_type {
            RngMode::Classical => "classical",
            RngMode::Quantum => "quantum",
        };
        log.info(format!("Starting BB84 simulation with {} RNG", mode_name));

        let requested = match method {
            GenerationMethod::PhotonBased => photon_qubit_count(request.photon_count),
            GenerationMethod::Standard => request.num_qubits,
        };
        if requested == 0 {
            return Err(RunError::Validation(
                "Number of qubits must be positive".to_string(),
            ));
        }

        let quantum_route = rng_type == RngMode::Quantum || request.backend_type == BackendType::RealQuantum;
        let draw = if method == GenerationMethod::PhotonBased {
            let draw = self.source.bits(requested, RngMode::Classical, None, log);
            log.info(format!(
                "Generated {} qubits from {} photons",
                draw.bits.len(),
                request.photon_count
            ));
            draw
        } else if quantum_route {
            let mut n = requested;
            if request.backend_type == BackendType::RealQuantum {
                n = n.min(REAL_QUANTUM_MAX_QUBITS);
                log.warning(format!("Limited to {} qubits for real quantum device", n));
            }
            let draw = self
                .source
                .bits(n, RngMode::Quantum, credential(request, self.default_credential.as_deref()), log);
            if draw.quantum_used {
                log.success("Using real quantum device for bit generation");
            } else {
                log.info("Using quantum simulator for bit generation");
            }
            draw
        } else {
            let draw = self.source.bits(requested, RngMode::Classical, None, log);
            log.info(format!(
                "Using {} for bit generation",
                request.backend_type.generator_name()
            ));
            draw
        };

        let bases = self.source.bases(draw.bits.len());
        Ok(Preparation {
            bits: draw.bits,
            bases,
            quantum_used: draw.quantum_used,
            tier: Some(draw.tier),
            rng_type,
            generation_method: method,
        })
    }
}

impl std::fmt::Debug for SimulationOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationOrchestrator")
            .field("source", &self.source)
            .field("policy", &self.policy)
            .field("amplification_factor", &self.amplification_factor)
            .field("default_credential", &self.default_credential.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{CircuitSimulator, MockQuantumDevice, QuantumService, UnavailableService};
    use crate::randomness::ClassicalRng;
    use crate::runlog::Severity;
    use std::sync::Arc;
    use std::time::Duration;

    fn orchestrator(hardware: Arc<dyn QuantumService>) -> SimulationOrchestrator {
        SimulationOrchestrator::new(RandomSource::new(
            ClassicalRng::seed_from_u64(7),
            hardware,
            Arc::new(CircuitSimulator::with_seed(16, 3)),
            Duration::from_millis(500),
        ))
    }

    #[test]
    fn test_default_request_matches_documented_defaults() {
        let request: SimulationRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.scenario, Scenario::Manual);
        assert_eq!(request.bits, "0110");
        assert_eq!(request.bases, "+x+x");
        assert_eq!(request.num_qubits, 4);
        assert_eq!(request.photon_count, 50);
        assert_eq!(request.noise, 0.1);
        assert_eq!(request.error_correction, ErrorCorrection::Cascade);
        assert_eq!(request.backend_type, BackendType::Classical);
        assert!(request.api_key.is_none());
    }

    #[test]
    fn test_request_enum_wire_names() {
        let request: SimulationRequest = serde_json::from_str(
            r#"{"scenario": "photon", "generation_method": "photon_based",
                "eve_attack": "intercept_resend", "backend_type": "real_quantum",
                "rng_type": "quantum", "error_correction": "none"}"#,
        )
        .unwrap();
        assert_eq!(request.scenario, Scenario::Photon);
        assert_eq!(request.generation_method, GenerationMethod::PhotonBased);
        assert_eq!(request.backend_type, BackendType::RealQuantum);
        assert_eq!(request.error_correction, ErrorCorrection::None);
    }

    #[test]
    fn test_photon_qubit_count_bounds() {
        assert_eq!(photon_qubit_count(0), 4);
        assert_eq!(photon_qubit_count(50), 15);
        assert_eq!(photon_qubit_count(1000), 32);
        assert_eq!(photon_qubit_count(u64::MAX), 32);
    }

    #[test]
    fn test_manual_length_mismatch_is_validation_error() {
        let mut orch = orchestrator(Arc::new(UnavailableService));
        let failure = orch.run(&SimulationRequest::manual("0110", "+x+")).unwrap_err();

        assert!(failure.is_client_error());
        assert_eq!(failure.message, "Bits and bases strings must have the same length");
        assert!(!failure.logs.is_empty());
    }

    #[test]
    fn test_manual_bad_symbol_is_validation_error() {
        let mut orch = orchestrator(Arc::new(UnavailableService));
        assert!(orch.run(&SimulationRequest::manual("01?0", "+x+x")).unwrap_err().is_client_error());
        assert!(orch.run(&SimulationRequest::manual("0120", "+x+x")).unwrap_err().is_client_error());
        assert!(orch.run(&SimulationRequest::manual("0110", "+y+x")).unwrap_err().is_client_error());
    }

    #[test]
    fn test_non_finite_channel_is_runtime_error() {
        let mut orch = orchestrator(Arc::new(UnavailableService));
        let request = SimulationRequest::manual("0110", "+x+x").with_channel(f64::NAN, 0.0);
        let failure = orch.run(&request).unwrap_err();

        assert!(!failure.is_client_error());
        assert_eq!(failure.message, SIMULATION_FAILED);
    }

    #[test]
    fn test_clean_channel_keeps_sifted_keys_equal() {
        let mut orch = orchestrator(Arc::new(UnavailableService));
        let request = SimulationRequest::manual("0110", "+x+x").with_channel(0.0, 0.0);
        let result = orch.run(&request).unwrap();

        assert_eq!(result.bob_bits, result.alice_bits);
        assert_eq!(result.alice_sifted, result.bob_sifted);
        assert_eq!(result.channel_error_rate, 0.0);
        assert_eq!(result.classical_fidelity, 1.0);
        assert!(result.bit_source.is_none());
        assert!(result.eve_bases.is_empty());
    }

    #[test]
    fn test_empty_manual_input_is_insecure() {
        let mut orch = orchestrator(Arc::new(UnavailableService));
        let result = orch.run(&SimulationRequest::manual("", "")).unwrap();

        assert_eq!(result.qber, 1.0);
        assert!(!result.is_secure);
        assert!(result.final_key.is_empty());
        assert_eq!(result.key_generation_rate, 0.0);
        assert_eq!(result.key_accuracy, 0.0);
    }

    #[test]
    fn test_auto_run_lengths() {
        let mut orch = orchestrator(Arc::new(UnavailableService));
        let result = orch.run(&SimulationRequest::auto(24)).unwrap();

        assert_eq!(result.num_qubits, 24);
        assert_eq!(result.alice_bases.len(), 24);
        assert_eq!(result.bob_bases.len(), 24);
        assert!(result.alice_sifted.len() <= 24);
        assert_eq!(result.bit_source, Some(Tier::Classical));
    }

    #[test]
    fn test_auto_zero_qubits_rejected() {
        let mut orch = orchestrator(Arc::new(UnavailableService));
        assert!(orch.run(&SimulationRequest::auto(0)).unwrap_err().is_client_error());
    }

    #[test]
    fn test_real_quantum_caps_qubits() {
        let mut orch = orchestrator(Arc::new(MockQuantumDevice::new()));
        let request = SimulationRequest::auto(20)
            .with_backend(BackendType::RealQuantum)
            .with_api_key("token");
        let result = orch.run(&request).unwrap();

        assert_eq!(result.num_qubits, 4);
        assert!(result.quantum_bits_generated);
        assert_eq!(result.bit_source, Some(Tier::Hardware));
        assert!((0.9..0.98).contains(&result.device_fidelity));
        assert_eq!(result.classical_fidelity, 0.0);
    }

    #[test]
    fn test_quantum_without_key_uses_simulator() {
        let mut orch = orchestrator(Arc::new(MockQuantumDevice::new()));
        let request = SimulationRequest::auto(10).with_rng(RngMode::Quantum);
        let result = orch.run(&request).unwrap();

        assert_eq!(result.num_qubits, 10);
        assert!(!result.quantum_bits_generated);
        assert_eq!(result.bit_source, Some(Tier::Simulator));
        assert!(result.logs.iter().any(|e| e.severity == Severity::Warning));
    }

    #[test]
    fn test_photon_scenario_derives_qubits() {
        let mut orch = orchestrator(Arc::new(UnavailableService));
        let result = orch.run(&SimulationRequest::photon(50)).unwrap();

        assert_eq!(result.num_qubits, 15);
        assert_eq!(result.generation_method, GenerationMethod::PhotonBased);
        assert_eq!(result.rng_type, RngMode::Classical);
        assert!(!result.quantum_bits_generated);
    }

    #[test]
    fn test_standard_photon_run_on_real_quantum_uses_hardware() {
        let mut orch = orchestrator(Arc::new(MockQuantumDevice::new()));
        let mut request = SimulationRequest::photon(50)
            .with_backend(BackendType::RealQuantum)
            .with_api_key("token");
        request.generation_method = GenerationMethod::Standard;
        request.num_qubits = 20;
        let result = orch.run(&request).unwrap();

        assert_eq!(result.num_qubits, 4);
        assert_eq!(result.bit_source, Some(Tier::Hardware));
        assert!(result.quantum_bits_generated);
        assert_eq!(result.rng_type, RngMode::Classical);
        assert!(result.logs.iter().any(|e| e.severity == Severity::Warning));
    }

    #[test]
    fn test_photon_based_run_ignores_real_quantum_backend() {
        let mut orch = orchestrator(Arc::new(MockQuantumDevice::new()));
        let request = SimulationRequest::photon(50)
            .with_backend(BackendType::RealQuantum)
            .with_api_key("token");
        let result = orch.run(&request).unwrap();

        assert_eq!(result.num_qubits, 15);
        assert_eq!(result.bit_source, Some(Tier::Classical));
        assert!(!result.quantum_bits_generated);
    }

    #[test]
    fn test_intercept_resend_reports_fixed_probability() {
        let mut orch = orchestrator(Arc::new(UnavailableService));
        let request = SimulationRequest::auto(16).with_attack(AttackKind::InterceptResend);
        let result = orch.run(&request).unwrap();

        assert_eq!(result.eve_detection_probability, 0.25);
        assert_eq!(result.eve_bases.len(), 16);
    }

    #[test]
    fn test_post_processing_can_be_disabled() {
        let mut orch = orchestrator(Arc::new(UnavailableService));
        let request = SimulationRequest::auto(32)
            .with_channel(0.0, 0.0)
            .with_post_processing(ErrorCorrection::None, PrivacyAmplification::None);
        let result = orch.run(&request).unwrap();

        assert_eq!(result.errors_corrected, 0);
        assert_eq!(result.final_key, result.alice_sifted);
    }

    #[test]
    fn test_each_run_starts_a_fresh_log() {
        let mut orch = orchestrator(Arc::new(UnavailableService));
        let first = orch.run(&SimulationRequest::default()).unwrap();
        let second = orch.run(&SimulationRequest::default()).unwrap();
        assert_eq!(first.logs.len(), second.logs.len());
    }

    #[test]
    fn test_result_serializes_flat_with_status() {
        let mut orch = orchestrator(Arc::new(UnavailableService));
        let result = orch.run(&SimulationRequest::default()).unwrap();
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["status"], "success");
        assert_eq!(json["alice_bits"], "0110");
        assert_eq!(json["alice_bases"], "+x+x");
        assert_eq!(json["backend_used"], "classical");
        assert!(json["logs"].is_array());
    }
}

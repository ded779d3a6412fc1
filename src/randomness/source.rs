//! Bit and basis source with a hardware → simulator → classical chain.

use super::ClassicalRng;
use crate::backend::{call_with_deadline, CircuitSimulator, QuantumService, ServiceError, ServiceKind};
use crate::bits::{BasisSequence, Bit, BitSequence};
use crate::runlog::RunLog;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// How a caller wants bits generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RngMode {
    #[default]
    Classical,
    Quantum,
}

/// The tier that actually served a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Hardware,
    Simulator,
    Classical,
}

/// Result of a bit draw.
#[derive(Debug, Clone)]
pub struct Draw {
    pub bits: BitSequence,
    /// True only if a hardware-connected service produced the bits.
    pub quantum_used: bool,
    pub tier: Tier,
}

/// Produces bit and basis sequences for a run.
///
/// Quantum draws walk an ordered list of tiers; each attempt runs inside
/// its own failure boundary and a failure moves on to the next tier with
/// a log entry. The classical tier cannot fail, so a draw never fails.
pub struct RandomSource {
    rng: ClassicalRng,
    hardware: Arc<dyn QuantumService>,
    simulator: Arc<CircuitSimulator>,
    timeout: Duration,
}

impl RandomSource {
    /// Creates a source with the given hardware service and simulator.
    pub fn new(
        rng: ClassicalRng,
        hardware: Arc<dyn QuantumService>,
        simulator: Arc<CircuitSimulator>,
        timeout: Duration,
    ) -> Self {
        Self {
            rng,
            hardware,
            simulator,
            timeout,
        }
    }

    /// Returns the classical generator shared by every stage of a run.
    #[inline]
    pub fn rng(&mut self) -> &mut ClassicalRng {
        &mut self.rng
    }

    /// Independent random bases. Always classical.
    pub fn bases(&mut self, n: usize) -> BasisSequence {
        self.rng.bases(n)
    }

    /// Draws `n` bits using `mode`.
    ///
    /// `credential` is only consulted by the hardware tier.
    pub fn bits(
        &mut self,
        n: usize,
        mode: RngMode,
        credential: Option<&str>,
        log: &mut RunLog,
    ) -> Draw {
        if mode == RngMode::Classical {
            return self.classical(n);
        }

        for tier in [Tier::Hardware, Tier::Simulator] {
            let attempt = match tier {
                Tier::Hardware => self.try_hardware(n, credential),
                _ => self.simulator.draw(n),
            };
            match attempt {
                Ok(raw) => {
                    let quantum_used =
                        tier == Tier::Hardware && self.hardware.kind() == ServiceKind::HardwareConnected;
                    match tier {
                        Tier::Hardware => log.success(format!(
                            "Generated {} quantum random bits on {}",
                            raw.len(),
                            self.hardware.name()
                        )),
                        _ => log.info(format!(
                            "Generated {} bits using quantum simulator",
                            raw.len()
                        )),
                    }
                    return Draw {
                        bits: raw.into_iter().map(Bit::from_bool).collect(),
                        quantum_used,
                        tier,
                    };
                }
                Err(e) if tier == Tier::Hardware => {
                    log.warning(format!("Quantum RNG failed: {}, falling back to simulator", e));
                }
                Err(e) => {
                    log.error(format!("Quantum simulator failed: {}, using classical RNG", e));
                }
            }
        }

        self.classical(n)
    }

    fn classical(&mut self, n: usize) -> Draw {
        Draw {
            bits: self.rng.bits(n),
            quantum_used: false,
            tier: Tier::Classical,
        }
    }

    /// Connects and collects `n` bits in register-sized shots, all under
    /// a single deadline.
    fn try_hardware(&self, n: usize, credential: Option<&str>) -> Result<Vec<bool>, ServiceError> {
        let credential = credential
            .filter(|c| !c.trim().is_empty())
            .ok_or(ServiceError::MissingCredential)?
            .to_string();
        let service = Arc::clone(&self.hardware);

        call_with_deadline(self.timeout, move || {
            let config = service.connect(&credential)?;
            if config.num_qubits == 0 {
                return Err(ServiceError::NoBackend);
            }
            tracing::info!(backend = %config.name, qubits = config.num_qubits, "Using quantum backend");

            let mut bits = Vec::with_capacity(n);
            while bits.len() < n {
                let width = config.num_qubits.min(n - bits.len());
                let shot = service.measure_superposition(&credential, width)?;
                if shot.len() != width {
                    return Err(ServiceError::Transport(format!(
                        "shot returned {} bits, expected {}",
                        shot.len(),
                        width
                    )));
                }
                bits.extend(shot);
            }
            Ok(bits)
        })
    }
}

impl std::fmt::Debug for RandomSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomSource")
            .field("hardware", &self.hardware.name())
            .field("simulator_capacity", &self.simulator.capacity())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendConfiguration, MockQuantumDevice, UnavailableService};
    use crate::runlog::Severity;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn source(hardware: Arc<dyn QuantumService>, sim_capacity: usize) -> RandomSource {
        RandomSource::new(
            ClassicalRng::seed_from_u64(11),
            hardware,
            Arc::new(CircuitSimulator::with_seed(sim_capacity, 123)),
            Duration::from_millis(200),
        )
    }

    #[test]
    fn test_classical_mode_never_touches_services() {
        let mut src = source(Arc::new(MockQuantumDevice::new()), 8);
        let mut log = RunLog::new();
        let draw = src.bits(12, RngMode::Classical, Some("token"), &mut log);

        assert_eq!(draw.tier, Tier::Classical);
        assert!(!draw.quantum_used);
        assert_eq!(draw.bits.len(), 12);
        assert!(log.is_empty());
    }

    #[test]
    fn test_hardware_tier_serves_with_credential() {
        let mut src = source(Arc::new(MockQuantumDevice::new()), 8);
        let mut log = RunLog::new();
        let draw = src.bits(12, RngMode::Quantum, Some("token"), &mut log);

        assert_eq!(draw.tier, Tier::Hardware);
        assert!(draw.quantum_used);
        assert_eq!(draw.bits.len(), 12);
        assert!(log.contains_severity(Severity::Success));
    }

    #[test]
    fn test_missing_credential_falls_back_to_simulator() {
        let mut src = source(Arc::new(MockQuantumDevice::new()), 8);
        let mut log = RunLog::new();
        let draw = src.bits(6, RngMode::Quantum, None, &mut log);

        assert_eq!(draw.tier, Tier::Simulator);
        assert!(!draw.quantum_used);
        assert_eq!(draw.bits.len(), 6);
        assert!(log.contains_severity(Severity::Warning));
    }

    #[test]
    fn test_unavailable_and_broken_simulator_fall_back_to_classical() {
        let mut src = source(Arc::new(UnavailableService), 0);
        let mut log = RunLog::new();
        let draw = src.bits(6, RngMode::Quantum, Some("token"), &mut log);

        assert_eq!(draw.tier, Tier::Classical);
        assert_eq!(draw.bits.len(), 6);
        assert!(log.contains_severity(Severity::Warning));
        assert!(log.contains_severity(Severity::Error));
    }

    #[test]
    fn test_slow_hardware_times_out_into_simulator() {
        let slow = MockQuantumDevice::new().with_latency(Duration::from_secs(2));
        let mut src = source(Arc::new(slow), 8);
        let mut log = RunLog::new();
        let draw = src.bits(4, RngMode::Quantum, Some("token"), &mut log);

        assert_eq!(draw.tier, Tier::Simulator);
        assert!(log.entries()[0].message.contains("did not answer"));
    }

    /// Answers every shot with an empty register.
    struct EmptyRegister {
        shots: AtomicUsize,
    }

    impl QuantumService for EmptyRegister {
        fn name(&self) -> &str {
            "empty_register"
        }

        fn kind(&self) -> ServiceKind {
            ServiceKind::HardwareConnected
        }

        fn connect(&self, _credential: &str) -> Result<BackendConfiguration, ServiceError> {
            Ok(BackendConfiguration {
                name: "empty_register".to_string(),
                num_qubits: 4,
                basis_gates: Vec::new(),
                coupling_map: String::new(),
                quantum_volume: None,
            })
        }

        fn measure_superposition(&self, _credential: &str, _qubits: usize) -> Result<Vec<bool>, ServiceError> {
            self.shots.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_short_shot_fails_hardware_tier_at_once() {
        let device = Arc::new(EmptyRegister {
            shots: AtomicUsize::new(0),
        });
        let mut src = source(device.clone(), 8);
        let mut log = RunLog::new();
        let draw = src.bits(8, RngMode::Quantum, Some("token"), &mut log);

        assert_eq!(draw.tier, Tier::Simulator);
        assert_eq!(draw.bits.len(), 8);
        assert!(log.entries()[0].message.contains("expected 4"));

        // The worker stopped after the first short shot.
        std::thread::sleep(Duration::from_millis(50));
        assert_eq!(device.shots.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_simulated_service_in_hardware_slot_is_not_quantum_hardware() {
        let mut src = source(Arc::new(CircuitSimulator::with_seed(4, 1)), 8);
        let mut log = RunLog::new();
        let draw = src.bits(6, RngMode::Quantum, Some("token"), &mut log);

        assert_eq!(draw.tier, Tier::Hardware);
        assert!(!draw.quantum_used);
    }
}

//! In-process quantum circuit simulator.
//!
//! Simulates the only circuit the random source needs: every qubit of a
//! register starts in |0⟩, receives a Hadamard gate and is measured in
//! the computational basis. The state after the Hadamard layer is a
//! product state, so each qubit is tracked as its own amplitude pair
//! instead of a 2^n state vector.

use super::{BackendConfiguration, QuantumService, ServiceError, ServiceKind};
use rand::Rng;
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;
use std::f64::consts::FRAC_1_SQRT_2;
use std::sync::Mutex;

/// Single-qubit amplitudes (real-valued; the circuit never adds phase).
#[derive(Debug, Clone, Copy)]
struct Amplitudes {
    zero: f64,
    one: f64,
}

impl Amplitudes {
    const GROUND: Self = Self { zero: 1.0, one: 0.0 };

    fn hadamard(self) -> Self {
        Self {
            zero: FRAC_1_SQRT_2 * (self.zero + self.one),
            one: FRAC_1_SQRT_2 * (self.zero - self.one),
        }
    }

    /// Probability of measuring |1⟩.
    fn p_one(self) -> f64 {
        let norm = self.zero * self.zero + self.one * self.one;
        self.one * self.one / norm
    }
}

/// Local simulator backend.
#[derive(Debug)]
pub struct CircuitSimulator {
    capacity: usize,
    rng: Mutex<ChaCha20Rng>,
}

impl CircuitSimulator {
    /// Name reported by the simulator backend.
    pub const BACKEND_NAME: &'static str = "qiskit_aer_simulator";

    /// Creates a simulator with the given register width, seeded from
    /// OS entropy.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            rng: Mutex::new(ChaCha20Rng::from_entropy()),
        }
    }

    /// Creates a simulator with a fixed seed (reproducible shots).
    pub fn with_seed(capacity: usize, seed: u64) -> Self {
        Self {
            capacity,
            rng: Mutex::new(ChaCha20Rng::seed_from_u64(seed)),
        }
    }

    /// Returns the register width.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Draws `n` bits, running as many register-wide shots as needed.
    pub fn draw(&self, n: usize) -> Result<Vec<bool>, ServiceError> {
        if self.capacity == 0 {
            return Err(ServiceError::Unsupported(
                "simulator register width is zero".to_string(),
            ));
        }
        let mut bits = Vec::with_capacity(n);
        while bits.len() < n {
            let width = self.capacity.min(n - bits.len());
            let shot = self.shot(width)?;
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
    }

    fn shot(&self, width: usize) -> Result<Vec<bool>, ServiceError> {
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| ServiceError::Transport("simulator state poisoned".to_string()))?;
        Ok((0..width)
            .map(|_| {
                let p_one = Amplitudes::GROUND.hadamard().p_one();
                rng.gen::<f64>() < p_one
            })
            .collect())
    }
}

impl QuantumService for CircuitSimulator {
    fn name(&self) -> &str {
        Self::BACKEND_NAME
    }

    fn kind(&self) -> ServiceKind {
        ServiceKind::Simulated
    }

    fn connect(&self, _credential: &str) -> Result<BackendConfiguration, ServiceError> {
        Ok(BackendConfiguration {
            name: Self::BACKEND_NAME.to_string(),
            num_qubits: self.capacity,
            basis_gates: ["h", "measure"].map(String::from).to_vec(),
            coupling_map: "All-to-all".to_string(),
            quantum_volume: None,
        })
    }

    fn measure_superposition(
        &self,
        _credential: &str,
        qubits: usize,
    ) -> Result<Vec<bool>, ServiceError> {
        if qubits > self.capacity {
            return Err(ServiceError::Unsupported(format!(
                "{} qubits requested, simulator register has {}",
                qubits, self.capacity
            )));
        }
        self.shot(qubits)
    }
}

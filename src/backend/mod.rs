//! Quantum measurement services.
//!
//! This module abstracts the external quantum hardware behind the
//! [`QuantumService`] trait, so the protocol core never talks to a
//! transport directly. Every call into a service goes through
//! [`call_with_deadline`], which turns a hang into a
//! [`ServiceError::Timeout`] that callers handle as "try the next tier".

mod deadline;
mod mock;
mod simulator;

pub use deadline::call_with_deadline;
pub use mock::MockQuantumDevice;
pub use simulator::CircuitSimulator;

use serde::Serialize;
use thiserror::Error;

/// Errors reported by a quantum service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("no quantum API key provided")]
    MissingCredential,
    #[error("quantum API key rejected")]
    InvalidCredential,
    #[error("no quantum backends available")]
    NoBackend,
    #[error("quantum service did not answer within {0} ms")]
    Timeout(u128),
    #[error("quantum service transport error: {0}")]
    Transport(String),
    #[error("unsupported request: {0}")]
    Unsupported(String),
}

/// Capability class of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceKind {
    /// Nothing is reachable.
    Unavailable,
    /// In-process simulation.
    Simulated,
    /// A real measurement device.
    HardwareConnected,
}

/// Configuration facts reported by a connected backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BackendConfiguration {
    pub name: String,
    pub num_qubits: usize,
    pub basis_gates: Vec<String>,
    pub coupling_map: String,
    pub quantum_volume: Option<u32>,
}

/// Trait for quantum measurement services.
///
/// Implementations must be shareable across the helper thread used to
/// bound each call.
pub trait QuantumService: Send + Sync {
    /// Identifier used in logs.
    fn name(&self) -> &str;

    /// Capability class.
    fn kind(&self) -> ServiceKind;

    /// Authenticates and returns the configuration of the first
    /// available backend.
    fn connect(&self, credential: &str) -> Result<BackendConfiguration, ServiceError>;

    /// Runs one shot of a Hadamard-and-measure circuit on `qubits`
    /// qubits and returns the measured register.
    fn measure_superposition(&self, credential: &str, qubits: usize)
        -> Result<Vec<bool>, ServiceError>;
}

/// A service that is never reachable.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableService;

impl QuantumService for UnavailableService {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn kind(&self) -> ServiceKind {
        ServiceKind::Unavailable
    }

    fn connect(&self, _credential: &str) -> Result<BackendConfiguration, ServiceError> {
        Err(ServiceError::NoBackend)
    }

    fn measure_superposition(
        &self,
        _credential: &str,
        _qubits: usize,
    ) -> Result<Vec<bool>, ServiceError> {
        Err(ServiceError::NoBackend)
    }
}

//! Mock hardware-connected quantum device.
//!
//! Stands in for a remote measurement backend in tests and demos. It
//! behaves like a real service from the caller's point of view: it
//! requires a credential, reports a configuration, answers with a
//! configurable latency, and can be told to fail.

use super::{BackendConfiguration, QuantumService, ServiceError, ServiceKind};
use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;

/// Mock device for testing hardware-backed code paths.
#[derive(Debug)]
pub struct MockQuantumDevice {
    configuration: BackendConfiguration,
    latency: Duration,
    failure: Option<ServiceError>,
    rng: Mutex<ChaCha20Rng>,
}

impl MockQuantumDevice {
    /// Creates a 5-qubit device that answers immediately.
    pub fn new() -> Self {
        Self {
            configuration: BackendConfiguration {
                name: "mock_backend_5q".to_string(),
                num_qubits: 5,
                basis_gates: ["id", "rz", "sx", "x", "cx"].map(String::from).to_vec(),
                coupling_map: "[[0, 1], [1, 2], [2, 3], [3, 4]]".to_string(),
                quantum_volume: Some(32),
            },
            latency: Duration::ZERO,
            failure: None,
            rng: Mutex::new(ChaCha20Rng::seed_from_u64(0x5eed)),
        }
    }

    /// Overrides the register width.
    pub fn with_qubits(mut self, num_qubits: usize) -> Self {
        self.configuration.num_qubits = num_qubits;
        self
    }

    /// Adds a fixed delay to every call.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Makes every call fail with `error`.
    pub fn failing(mut self, error: ServiceError) -> Self {
        self.failure = Some(error);
        self
    }

    fn check(&self, credential: &str) -> Result<(), ServiceError> {
        if !self.latency.is_zero() {
            std::thread::sleep(self.latency);
        }
        if let Some(ref error) = self.failure {
            return Err(error.clone());
        }
        if credential.trim().is_empty() {
            return Err(ServiceError::InvalidCredential);
        }
        Ok(())
    }
}

impl Default for MockQuantumDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl QuantumService for MockQuantumDevice {
    fn name(&self) -> &str {
        &self.configuration.name
    }

    fn kind(&self) -> ServiceKind {
        ServiceKind::HardwareConnected
    }

    fn connect(&self, credential: &str) -> Result<BackendConfiguration, ServiceError> {
        self.check(credential)?;
        tracing::debug!(backend = %self.configuration.name, "MockQuantumDevice connected");
        Ok(self.configuration.clone())
    }

    fn measure_superposition(
        &self,
        credential: &str,
        qubits: usize,
    ) -> Result<Vec<bool>, ServiceError> {
        self.check(credential)?;
        if qubits > self.configuration.num_qubits {
            return Err(ServiceError::Unsupported(format!(
                "{} qubits requested, device has {}",
                qubits, self.configuration.num_qubits
            )));
        }
        let mut rng = self
            .rng
            .lock()
            .map_err(|_| ServiceError::Transport("device state poisoned".to_string()))?;
        Ok((0..qubits).map(|_| rng.next_u32() & 1 == 1).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_device_requires_credential() {
        let device = MockQuantumDevice::new();
        assert_eq!(device.connect(""), Err(ServiceError::InvalidCredential));

        let config = device.connect("token").unwrap();
        assert_eq!(config.num_qubits, 5);
        assert_eq!(device.kind(), ServiceKind::HardwareConnected);
    }

    #[test]
    fn test_mock_device_respects_register_width() {
        let device = MockQuantumDevice::new().with_qubits(3);
        assert_eq!(device.measure_superposition("token", 3).unwrap().len(), 3);
        assert!(matches!(
            device.measure_superposition("token", 4),
            Err(ServiceError::Unsupported(_))
        ));
    }

    #[test]
    fn test_failing_device() {
        let device = MockQuantumDevice::new().failing(ServiceError::NoBackend);
        assert_eq!(device.connect("token"), Err(ServiceError::NoBackend));
    }
}

//! Measurement backend descriptor and connectivity probe.

use crate::backend::{call_with_deadline, QuantumService, ServiceError, ServiceKind};
use crate::runlog::RunLog;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Backend name reported when the probe falls back to the simulator.
pub const SIMULATOR_BACKEND: &str = "qiskit_aer_simulator";

/// Descriptor of a measurement backend, as seen by the testbed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceProfile {
    pub connected: bool,
    pub backend: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_qubits: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basis_gates: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupling_map: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantum_volume: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeviceProfile {
    /// A disconnected profile carrying the failure reason.
    pub fn disconnected(backend: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            connected: false,
            backend: backend.into(),
            num_qubits: None,
            basis_gates: None,
            coupling_map: None,
            quantum_volume: None,
            error: Some(error.into()),
        }
    }
}

/// Probes `service` with `credential`, waiting at most `timeout`.
///
/// Never fails: any fault is logged and turned into a disconnected
/// profile.
pub fn probe_connectivity(
    service: &Arc<dyn QuantumService>,
    credential: Option<&str>,
    timeout: Duration,
    log: &mut RunLog,
) -> DeviceProfile {
    if service.kind() == ServiceKind::Unavailable {
        log.error("Quantum service not available for device testing");
        return DeviceProfile::disconnected("simulation", "quantum service not available");
    }

    let attempt = match credential.filter(|c| !c.trim().is_empty()) {
        None => Err(ServiceError::MissingCredential),
        Some(credential) => {
            let service = Arc::clone(service);
            let credential = credential.to_string();
            call_with_deadline(timeout, move || service.connect(&credential))
        }
    };

    match attempt {
        Ok(config) => {
            log.success(format!("Connected to device: {}", config.name));
            DeviceProfile {
                connected: true,
                backend: config.name,
                num_qubits: Some(config.num_qubits),
                basis_gates: Some(config.basis_gates),
                coupling_map: Some(config.coupling_map),
                quantum_volume: Some(
                    config
                        .quantum_volume
                        .map(|qv| qv.to_string())
                        .unwrap_or_else(|| "Not specified".to_string()),
                ),
                error: None,
            }
        }
        Err(e) => {
            log.error(format!("Device connection failed: {}", e));
            log.warning("Falling back to quantum simulator");
            DeviceProfile::disconnected(SIMULATOR_BACKEND, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{MockQuantumDevice, UnavailableService};

    const TIMEOUT: Duration = Duration::from_millis(200);

    #[test]
    fn test_connected_profile() {
        let service: Arc<dyn QuantumService> = Arc::new(MockQuantumDevice::new());
        let mut log = RunLog::new();
        let profile = probe_connectivity(&service, Some("token"), TIMEOUT, &mut log);

        assert!(profile.connected);
        assert_eq!(profile.num_qubits, Some(5));
        assert_eq!(profile.quantum_volume.as_deref(), Some("32"));
        assert!(profile.error.is_none());
    }

    #[test]
    fn test_missing_credential_is_disconnected() {
        let service: Arc<dyn QuantumService> = Arc::new(MockQuantumDevice::new());
        let mut log = RunLog::new();
        let profile = probe_connectivity(&service, None, TIMEOUT, &mut log);

        assert!(!profile.connected);
        assert_eq!(profile.backend, SIMULATOR_BACKEND);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_unavailable_service() {
        let service: Arc<dyn QuantumService> = Arc::new(UnavailableService);
        let mut log = RunLog::new();
        let profile = probe_connectivity(&service, Some("token"), TIMEOUT, &mut log);

        assert!(!profile.connected);
        assert_eq!(profile.backend, "simulation");
    }

    #[test]
    fn test_serialization_skips_missing_facts() {
        let profile = DeviceProfile::disconnected(SIMULATOR_BACKEND, "no key");
        let json = serde_json::to_value(&profile).unwrap();
        assert_eq!(json["connected"], false);
        assert!(json.get("num_qubits").is_none());
    }
}

//! BB84 Quantum Key Distribution Library
//!
//! An end-to-end model of the BB84 protocol, plus a performance model
//! for QKD devices. Results are illustrative: the reconciler and the
//! privacy amplifier are simplified, and device figures carry bounded
//! random jitter.
//!
//! # Architecture
//!
//! Data flows strictly downstream:
//!
//! ```text
//! randomness → channel → eavesdropper → sifting → qber → reconcile → amplify → policy
//!      ↑
//!   backend (hardware → simulator → classical)
//! ```
//!
//! The device model is driven separately by the testbed orchestrator.
//!
//! # Design Principles
//!
//! - **Never fails on a backend**: quantum services degrade to the next
//!   tier; only caller input or internal faults fail a run
//! - **Per-run logs**: every run returns its own log trail
//! - **Bounded waits**: every external service call has a deadline
//! - **No cryptographic claims**: the classical tier is a seeded
//!   ChaCha20 stream, not a key source
//!
//! # Example
//!
//! ```no_run
//! use bb84_qkd::{
//!     backend::{CircuitSimulator, UnavailableService},
//!     orchestration::{SimulationOrchestrator, SimulationRequest},
//!     randomness::{ClassicalRng, RandomSource},
//! };
//! use std::{sync::Arc, time::Duration};
//!
//! let source = RandomSource::new(
//!     ClassicalRng::from_os_entropy(),
//!     Arc::new(UnavailableService),
//!     Arc::new(CircuitSimulator::new(32)),
//!     Duration::from_secs(5),
//! );
//! let mut orchestrator = SimulationOrchestrator::new(source);
//!
//! let result = orchestrator.run(&SimulationRequest::auto(16)).unwrap();
//! println!("QBER {:.3}, secure: {}", result.qber, result.is_secure);
//! ```

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod backend;
pub mod bits;
pub mod channel;
pub mod config;
pub mod device;
pub mod metrics;
pub mod orchestration;
pub mod protocol;
pub mod randomness;
pub mod runlog;

// Re-export commonly used types at crate root
pub use backend::{CircuitSimulator, MockQuantumDevice, QuantumService, ServiceError, UnavailableService};
pub use bits::{Basis, BasisSequence, Bit, BitSequence};
pub use config::FileConfig;
pub use device::{DeviceMetricsModel, DeviceProfile, MobileMeasurementBatch, Rating, Suitability};
pub use orchestration::{
    RunError, RunFailure, SimulationOrchestrator, SimulationRequest, SimulationResult,
    TestbedOrchestrator,
};
pub use randomness::{ClassicalRng, RandomSource, RngMode};
pub use runlog::{LogEntry, RunLog, Severity};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

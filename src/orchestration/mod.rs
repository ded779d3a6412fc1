//! Run orchestration.
//!
//! [`SimulationOrchestrator`] sequences the protocol stages into one
//! BB84 run:
//!
//! ```text
//! prepare → channel → eavesdropper → sift → qber → reconcile → amplify
//! ```
//!
//! [`TestbedOrchestrator`] runs the device model for lab backends and
//! mobile batches. Both return either a report or a [`RunFailure`]
//! carrying the log trail; neither panics or leaks a backend error.

mod error;
mod simulation;
mod testbed;

pub use error::{RunError, RunFailure, MOBILE_FAILED, SIMULATION_FAILED, TESTBED_FAILED};
pub use simulation::{
    photon_qubit_count, BackendType, GenerationMethod, Scenario, SimulationOrchestrator,
    SimulationRequest, SimulationResult,
};
pub use testbed::{
    DetectionReport, MobileReport, SecurityStatus, TestbedOrchestrator, TestbedReport,
    DEFAULT_LAB_DISTANCE,
};

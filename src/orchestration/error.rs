//! Run failures and their outward shape.

use crate::bits::SequenceError;
use crate::channel::ChannelError;
use crate::runlog::LogEntry;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use thiserror::Error;

/// Message shown for simulation runtime failures.
pub const SIMULATION_FAILED: &str = "Simulation failed. Please check your parameters and try again.";

/// Message shown for lab testbed runtime failures.
pub const TESTBED_FAILED: &str = "Testbed analysis failed. Please check your API key and try again.";

/// Message shown for mobile runtime failures.
pub const MOBILE_FAILED: &str = "Mobile data processing failed.";

/// The two ways a run can fail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    /// Caller input was rejected before any stage ran.
    #[error("{0}")]
    Validation(String),
    /// A stage failed unexpectedly.
    #[error("{0}")]
    Runtime(String),
}

impl From<SequenceError> for RunError {
    fn from(e: SequenceError) -> Self {
        RunError::Runtime(e.to_string())
    }
}

impl From<ChannelError> for RunError {
    fn from(e: ChannelError) -> Self {
        RunError::Runtime(e.to_string())
    }
}

/// A failed run together with the log trail up to the failure.
#[derive(Debug, Clone)]
pub struct RunFailure {
    pub error: RunError,
    /// User-facing message. Validation failures echo the error text;
    /// runtime failures use a fixed message and keep detail in `error`.
    pub message: String,
    pub logs: Vec<LogEntry>,
    /// Set for mobile failures.
    pub device_id: Option<String>,
}

impl RunFailure {
    pub fn new(error: RunError, runtime_message: &str, logs: Vec<LogEntry>) -> Self {
        let message = match &error {
            RunError::Validation(detail) => detail.clone(),
            RunError::Runtime(_) => runtime_message.to_string(),
        };
        Self {
            error,
            message,
            logs,
            device_id: None,
        }
    }

    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    /// True for caller mistakes, false for internal faults.
    #[inline]
    pub fn is_client_error(&self) -> bool {
        matches!(self.error, RunError::Validation(_))
    }
}

impl std::fmt::Display for RunFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.error)
    }
}

impl std::error::Error for RunFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl Serialize for RunFailure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let fields = if self.device_id.is_some() { 5 } else { 4 };
        let mut state = serializer.serialize_struct("RunFailure", fields)?;
        state.serialize_field("status", "error")?;
        state.serialize_field("error", &self.error.to_string())?;
        state.serialize_field("message", &self.message)?;
        if let Some(device_id) = &self.device_id {
            state.serialize_field("device_id", device_id)?;
        }
        state.serialize_field("logs", &self.logs)?;
        state.end()
    }
}

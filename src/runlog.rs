//! Per-run log trail.
//!
//! Each orchestrator call owns a fresh [`RunLog`] and hands it back
//! inside its report (or failure). Entries are mirrored to `tracing`
//! so process-level logs see the same events.

use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};

/// Severity of a run log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Success,
}

/// A single timestamped message in a run's log trail.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    #[serde(serialize_with = "serialize_clock")]
    pub timestamp: DateTime<Local>,
    pub message: String,
    #[serde(rename = "level")]
    pub severity: Severity,
}

fn serialize_clock<S: Serializer>(ts: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&ts.format("%H:%M:%S"))
}

/// Append-only log buffer for one orchestrator run.
#[derive(Debug, Clone, Default)]
pub struct RunLog {
    entries: Vec<LogEntry>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry and mirrors it to `tracing`.
    pub fn push(&mut self, severity: Severity, message: impl Into<String>) {
        let message = message.into();
        match severity {
            Severity::Info | Severity::Success => tracing::info!(target: "bb84_qkd::run", "{}", message),
            Severity::Warning => tracing::warn!(target: "bb84_qkd::run", "{}", message),
            Severity::Error => tracing::error!(target: "bb84_qkd::run", "{}", message),
        }
        self.entries.push(LogEntry {
            timestamp: Local::now(),
            message,
            severity,
        });
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(Severity::Info, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message);
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(Severity::Success, message);
    }

    #[inline]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if any entry has the given severity.
    pub fn contains_severity(&self, severity: Severity) -> bool {
        self.entries.iter().any(|e| e.severity == severity)
    }

    /// Consumes the buffer, returning its entries.
    pub fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }
}

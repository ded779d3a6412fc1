//! Device testbed analysis for lab backends and mobile sensors.

use super::error::{RunError, RunFailure, MOBILE_FAILED, TESTBED_FAILED};
use crate::backend::QuantumService;
use crate::device::{
    probe_connectivity, summarize_detections, DetectionBatch, DetectionSummary, DeviceMetrics,
    DeviceMetricsModel, DeviceProfile, MobileMeasurementBatch, Profile, RawExcerpt, Suitability,
};
use crate::protocol::SecurityPolicy;
use crate::randomness::ClassicalRng;
use crate::runlog::{LogEntry, RunLog};
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Default fiber length for lab key-rate estimates (km).
pub const DEFAULT_LAB_DISTANCE: f64 = 10.0;

/// Verdict on a mobile channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityStatus {
    Secure,
    Compromised,
}

impl SecurityStatus {
    fn from_secure(secure: bool) -> Self {
        if secure {
            SecurityStatus::Secure
        } else {
            SecurityStatus::Compromised
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            SecurityStatus::Secure => "Quantum channel is secure for key distribution",
            SecurityStatus::Compromised => "High QBER detected - potential eavesdropping",
        }
    }
}

/// Lab analysis record.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename = "success")]
pub struct TestbedReport {
    pub timestamp: DateTime<Utc>,
    pub device_info: DeviceProfile,
    pub metrics: DeviceMetrics,
    pub analysis: Suitability,
    pub logs: Vec<LogEntry>,
    pub is_secure: bool,
}

/// Mobile analysis record.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename = "success")]
pub struct MobileReport {
    pub timestamp: DateTime<Utc>,
    pub device_id: String,
    pub device_info: Map<String, Value>,
    pub metrics: DeviceMetrics,
    pub analysis: Suitability,
    pub raw_data: RawExcerpt,
    pub logs: Vec<LogEntry>,
    pub is_secure: bool,
    pub security_status: SecurityStatus,
}

/// Quick detection-list analysis record.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename = "success")]
pub struct DetectionReport {
    pub timestamp: DateTime<Utc>,
    pub device_id: String,
    /// Seconds.
    pub measurement_duration: f64,
    #[serde(flatten)]
    pub summary: DetectionSummary,
    pub device_info: Map<String, Value>,
    pub security_status: SecurityStatus,
    pub security_message: &'static str,
    pub logs: Vec<LogEntry>,
}

/// Runs device analyses.
///
/// Like the simulation orchestrator, every call owns a fresh log and
/// returns it in the report or the failure.
pub struct TestbedOrchestrator {
    rng: ClassicalRng,
    hardware: Arc<dyn QuantumService>,
    timeout: Duration,
    distance: f64,
    policy: SecurityPolicy,
    default_credential: Option<String>,
}

impl TestbedOrchestrator {
    pub fn new(rng: ClassicalRng, hardware: Arc<dyn QuantumService>, timeout: Duration) -> Self {
        Self {
            rng,
            hardware,
            timeout,
            distance: DEFAULT_LAB_DISTANCE,
            policy: SecurityPolicy::default(),
            default_credential: None,
        }
    }

    /// Credential used when a lab analysis is given no `api_key`.
    pub fn with_default_credential(mut self, credential: Option<String>) -> Self {
        self.default_credential = credential;
        self
    }

    /// Sets the fiber length used for lab key rates.
    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_policy(mut self, policy: SecurityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Probes the hardware service and rates it with the lab profile.
    pub fn analyze_lab(&mut self, photon_rate: f64, api_key: Option<&str>) -> Result<TestbedReport, RunFailure> {
        let mut log = RunLog::new();
        log.info("Starting quantum device testbed analysis");

        if !photon_rate.is_finite() || photon_rate < 0.0 {
            let error = RunError::Validation(format!(
                "Photon rate must be a non-negative number, got {}",
                photon_rate
            ));
            log.error(format!("Testbed analysis failed: {}", error));
            return Err(RunFailure::new(error, TESTBED_FAILED, log.into_entries()));
        }

        let credential = api_key
            .filter(|c| !c.trim().is_empty())
            .or(self.default_credential.as_deref());
        let device = probe_connectivity(&self.hardware, credential, self.timeout, &mut log);
        let metrics = DeviceMetricsModel::lab().measure_lab(
            &device,
            photon_rate,
            self.distance,
            &mut self.rng,
            &mut log,
        );
        let analysis = Suitability::assess(Profile::Lab, &metrics);
        log.success(format!("Device analysis complete. Rating: {}", analysis.rating));
        info!(
            backend = %device.backend,
            score = analysis.suitability_score,
            "Lab analysis complete"
        );

        Ok(TestbedReport {
            timestamp: Utc::now(),
            is_secure: self.policy.is_secure(metrics.qber),
            device_info: device,
            metrics,
            analysis,
            logs: log.into_entries(),
        })
    }

    /// Rates a mobile sensor from its raw measurement batch.
    ///
    /// The QBER comes from the batch's flagged errors. Missing or
    /// unequal `bits`/`bases` are rejected before any metric is computed.
    pub fn analyze_mobile(
        &mut self,
        batch: &MobileMeasurementBatch,
        device_id: &str,
    ) -> Result<MobileReport, RunFailure> {
        let mut log = RunLog::new();
        log.info(format!("Processing mobile data from device: {}", device_id));

        match self.mobile_report(batch, device_id, &mut log) {
            Ok(mut report) => {
                report.logs = log.into_entries();
                Ok(report)
            }
            Err(e) => {
                log.error(format!("Mobile data processing failed: {}", e));
                Err(RunFailure::new(e, MOBILE_FAILED, log.into_entries()).with_device_id(device_id))
            }
        }
    }

    fn mobile_report(
        &mut self,
        batch: &MobileMeasurementBatch,
        device_id: &str,
        log: &mut RunLog,
    ) -> Result<MobileReport, RunError> {
        let total = validate_batch(batch)?;
        log.info(format!("Received {} measurements from mobile device", total));

        let metrics = DeviceMetricsModel::mobile().measure_mobile(batch, total, &mut self.rng, log);
        let analysis = Suitability::assess(Profile::Mobile, &metrics);
        log.success(format!(
            "Mobile device analysis complete. Rating: {}",
            analysis.rating
        ));
        info!(
            device_id,
            qber = metrics.qber,
            score = analysis.suitability_score,
            "Mobile analysis complete"
        );

        let is_secure = self.policy.is_secure(metrics.qber);
        Ok(MobileReport {
            timestamp: batch_timestamp(batch.timestamp),
            device_id: device_id.to_string(),
            device_info: mobile_device_info(batch, total)?,
            metrics,
            analysis,
            raw_data: batch.excerpt(),
            logs: Vec::new(),
            is_secure,
            security_status: SecurityStatus::from_secure(is_secure),
        })
    }

    /// Coarse analysis of a photon-detection list.
    pub fn summarize_detections(&mut self, batch: &DetectionBatch) -> DetectionReport {
        let mut log = RunLog::new();
        log.info("Processing mobile device quantum measurements");

        let summary = summarize_detections(batch, &mut self.rng, &mut log);
        let security_status = SecurityStatus::from_secure(self.policy.is_secure(summary.device_qber));

        DetectionReport {
            timestamp: Utc::now(),
            device_id: batch
                .device_id
                .clone()
                .unwrap_or_else(|| "mobile_device".to_string()),
            measurement_duration: batch.duration,
            summary,
            device_info: batch.device_info.clone(),
            security_status,
            security_message: security_status.message(),
            logs: log.into_entries(),
        }
    }
}

impl std::fmt::Debug for TestbedOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestbedOrchestrator")
            .field("hardware", &self.hardware.name())
            .field("timeout", &self.timeout)
            .field("distance", &self.distance)
            .finish_non_exhaustive()
    }
}

/// Checks the required arrays and returns the measurement count.
fn validate_batch(batch: &MobileMeasurementBatch) -> Result<usize, RunError> {
    let (bits, bases) = match (batch.bits.as_deref(), batch.bases.as_deref()) {
        (Some(bits), Some(bases)) if !bits.is_empty() && !bases.is_empty() => (bits, bases),
        _ => {
            return Err(RunError::Validation(
                "Mobile data must contain 'bits' and 'bases' arrays".to_string(),
            ))
        }
    };
    if bits.len() != bases.len() {
        return Err(RunError::Validation(
            "Bits and bases arrays must have the same length".to_string(),
        ));
    }
    if let Some(index) = batch.measurement_errors.iter().find(|&&i| i >= bits.len()) {
        return Err(RunError::Validation(format!(
            "Measurement error index {} is out of range for {} measurements",
            index,
            bits.len()
        )));
    }
    if batch.measurement_errors.len() > bits.len() {
        return Err(RunError::Validation(
            "More measurement errors than measurements".to_string(),
        ));
    }
    Ok(bits.len())
}

/// Reported device facts merged with whatever the client sent.
fn mobile_device_info(batch: &MobileMeasurementBatch, total: usize) -> Result<Map<String, Value>, RunError> {
    let info = &batch.device_info;
    let mut merged = Map::new();
    merged.insert("mobile_device".into(), Value::Bool(true));
    merged.insert("measurement_count".into(), total.into());
    merged.insert(
        "device_model".into(),
        info.model.clone().unwrap_or_else(|| "Unknown".to_string()).into(),
    );
    merged.insert(
        "app_version".into(),
        info.app_version.clone().unwrap_or_else(|| "1.0.0".to_string()).into(),
    );

    match serde_json::to_value(info).map_err(|e| RunError::Runtime(e.to_string()))? {
        Value::Object(submitted) => merged.extend(submitted),
        other => {
            return Err(RunError::Runtime(format!(
                "device info serialized to a non-object: {}",
                other
            )))
        }
    }
    Ok(merged)
}

fn batch_timestamp(seconds: Option<f64>) -> DateTime<Utc> {
    seconds
        .filter(|s| s.is_finite())
        .and_then(|s| {
            let secs = s.trunc() as i64;
            let nanos = (s.fract().abs() * 1e9) as u32;
            Utc.timestamp_opt(secs, nanos).single()
        })
        .unwrap_or_else(Utc::now)
}

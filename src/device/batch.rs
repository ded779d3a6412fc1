//! Raw measurement batches submitted by mobile sensors.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Maximum number of entries kept in the diagnostic excerpt.
pub const RAW_EXCERPT_LEN: usize = 10;

/// Default declared photon rate for mobile batches (MHz).
pub const DEFAULT_MOBILE_PHOTON_RATE: f64 = 100.0;

/// Default declared fiber distance for mobile batches (km).
pub const DEFAULT_MOBILE_DISTANCE: f64 = 10.0;

/// Self-description sent by the mobile client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MobileDeviceInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_version: Option<String>,
    /// Any other facts the client reports, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Raw measurement input from a mobile collaborator.
///
/// `bits` and `bases` are required and must have equal length; every
/// other field is optional. A batch is consumed by one testbed call and
/// only a bounded excerpt survives in the report.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MobileMeasurementBatch {
    #[serde(default)]
    pub bits: Option<Vec<u8>>,
    #[serde(default)]
    pub bases: Option<Vec<String>>,
    /// Indices of measurements the client flagged as errors.
    #[serde(default)]
    pub measurement_errors: Vec<usize>,
    #[serde(default)]
    pub photon_rate: Option<f64>,
    #[serde(default)]
    pub distance: Option<f64>,
    /// Ambient light in lux.
    #[serde(default)]
    pub ambient_light: Option<f64>,
    /// Sensor temperature in degrees Celsius.
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Client-side timestamp (seconds since the epoch).
    #[serde(default)]
    pub timestamp: Option<f64>,
    #[serde(default)]
    pub device_info: MobileDeviceInfo,
}

impl MobileMeasurementBatch {
    /// Builds a batch from parallel arrays.
    pub fn new(bits: Vec<u8>, bases: Vec<String>) -> Self {
        Self {
            bits: Some(bits),
            bases: Some(bases),
            ..Default::default()
        }
    }

    pub fn with_errors(mut self, measurement_errors: Vec<usize>) -> Self {
        self.measurement_errors = measurement_errors;
        self
    }

    pub fn with_environment(mut self, ambient_light: f64, temperature: f64) -> Self {
        self.ambient_light = Some(ambient_light);
        self.temperature = Some(temperature);
        self
    }

    #[inline]
    pub fn photon_rate(&self) -> f64 {
        self.photon_rate.unwrap_or(DEFAULT_MOBILE_PHOTON_RATE)
    }

    #[inline]
    pub fn distance(&self) -> f64 {
        self.distance.unwrap_or(DEFAULT_MOBILE_DISTANCE)
    }

    /// First [`RAW_EXCERPT_LEN`] entries of each array.
    pub fn excerpt(&self) -> RawExcerpt {
        fn head<T: Clone>(items: &[T]) -> Vec<T> {
            items.iter().take(RAW_EXCERPT_LEN).cloned().collect()
        }
        RawExcerpt {
            bits: head(self.bits.as_deref().unwrap_or_default()),
            bases: head(self.bases.as_deref().unwrap_or_default()),
            errors: head(&self.measurement_errors),
        }
    }
}

/// Bounded debug excerpt of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawExcerpt {
    pub bits: Vec<u8>,
    pub bases: Vec<String>,
    pub errors: Vec<usize>,
}

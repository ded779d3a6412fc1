//! QKD device performance analysis.
//!
//! This module describes measurement backends ([`DeviceProfile`]),
//! accepts raw mobile measurement batches, and estimates device
//! performance with [`DeviceMetricsModel`]. The [`Suitability`] rubric
//! turns the estimates into a 0-100 score and an A-D rating. Figures
//! are illustrative; they are not a detector simulation.

mod batch;
mod detection;
mod model;
mod profile;
mod suitability;

pub use batch::{
    MobileDeviceInfo, MobileMeasurementBatch, RawExcerpt, DEFAULT_MOBILE_DISTANCE,
    DEFAULT_MOBILE_PHOTON_RATE, RAW_EXCERPT_LEN,
};
pub use detection::{summarize as summarize_detections, DetectionBatch, DetectionSummary};
pub use model::{
    binary_entropy, fiber_transmission, DeviceMetrics, DeviceMetricsModel, Profile,
    ProfileConstants,
};
pub use profile::{probe_connectivity, DeviceProfile, SIMULATOR_BACKEND};
pub use suitability::{suitability_score, Rating, Suitability};

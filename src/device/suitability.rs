//! Weighted suitability rubric and rating.
//!
//! Four bands contribute to a score out of 100: fidelity (30),
//! detection efficiency (25), QBER (25) and secure key rate (20).
//! Fidelity, efficiency and key-rate thresholds depend on the profile;
//! the QBER band is shared.

use super::{DeviceMetrics, Profile};
use serde::Serialize;
use std::fmt;

/// `(exclusive lower bound, points)` pairs, best band first.
type Bands = &'static [(f64, u32)];

struct Rubric {
    fidelity: Bands,
    fidelity_floor: u32,
    efficiency: Bands,
    efficiency_floor: u32,
    key_rate: Bands,
    key_rate_floor: u32,
    recommendations: [&'static str; 4],
}

const LAB_RUBRIC: Rubric = Rubric {
    fidelity: &[(0.95, 30), (0.90, 20), (0.85, 10)],
    fidelity_floor: 0,
    efficiency: &[(0.90, 25), (0.80, 20), (0.70, 15)],
    efficiency_floor: 10,
    key_rate: &[(1000.0, 20), (500.0, 15), (100.0, 10)],
    key_rate_floor: 5,
    recommendations: [
        "Excellent for QKD deployment",
        "Good for QKD with optimization",
        "Marginal - requires significant optimization",
        "Not suitable for secure QKD",
    ],
};

const MOBILE_RUBRIC: Rubric = Rubric {
    fidelity: &[(0.90, 30), (0.85, 25), (0.80, 20), (0.75, 15)],
    fidelity_floor: 5,
    efficiency: &[(0.80, 25), (0.70, 20), (0.60, 15)],
    efficiency_floor: 10,
    key_rate: &[(500.0, 20), (250.0, 15), (100.0, 10)],
    key_rate_floor: 5,
    recommendations: [
        "Excellent mobile device for QKD measurements",
        "Good mobile device with minor optimization needed",
        "Marginal mobile device - requires calibration",
        "Mobile device not suitable for secure QKD",
    ],
};

/// `(exclusive upper bound, points)`; shared by both profiles.
const QBER_BANDS: Bands = &[(0.05, 25), (0.10, 20), (0.15, 15)];
const QBER_FLOOR: u32 = 5;

fn above(value: f64, bands: Bands, floor: u32) -> u32 {
    bands
        .iter()
        .find(|(bound, _)| value > *bound)
        .map_or(floor, |(_, points)| *points)
}

fn below(value: f64, bands: Bands, floor: u32) -> u32 {
    bands
        .iter()
        .find(|(bound, _)| value < *bound)
        .map_or(floor, |(_, points)| *points)
}

impl Profile {
    fn rubric(self) -> &'static Rubric {
        match self {
            Profile::Lab => &LAB_RUBRIC,
            Profile::Mobile => &MOBILE_RUBRIC,
        }
    }
}

/// Letter rating derived from a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Rating {
    A,
    B,
    C,
    D,
}

impl Rating {
    /// Maps a score to its band: A ≥ 80, B ≥ 60, C ≥ 40, else D.
    pub fn from_score(score: u32) -> Self {
        if score >= 80 {
            Rating::A
        } else if score >= 60 {
            Rating::B
        } else if score >= 40 {
            Rating::C
        } else {
            Rating::D
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Rating::A => "A",
            Rating::B => "B",
            Rating::C => "C",
            Rating::D => "D",
        };
        f.write_str(letter)
    }
}

/// Suitability verdict for a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suitability {
    pub suitability_score: u32,
    pub rating: Rating,
    pub recommendation: &'static str,
}

/// Scores the four bands for `profile`.
pub fn suitability_score(
    profile: Profile,
    fidelity: f64,
    detection_efficiency: f64,
    qber: f64,
    secure_key_rate: f64,
) -> u32 {
    let rubric = profile.rubric();
    above(fidelity, rubric.fidelity, rubric.fidelity_floor)
        + above(detection_efficiency, rubric.efficiency, rubric.efficiency_floor)
        + below(qber, QBER_BANDS, QBER_FLOOR)
        + above(secure_key_rate, rubric.key_rate, rubric.key_rate_floor)
}

impl Suitability {
    /// Scores `metrics` and attaches the profile's recommendation.
    pub fn assess(profile: Profile, metrics: &DeviceMetrics) -> Self {
        let score = suitability_score(
            profile,
            metrics.fidelity,
            metrics.detection_efficiency,
            metrics.qber,
            metrics.secure_key_rate,
        );
        let rating = Rating::from_score(score);
        Self {
            suitability_score: score,
            rating,
            recommendation: profile.rubric().recommendations[rating.index()],
        }
    }
}

//! Device performance model.
//!
//! Estimates fidelity, detection efficiency, dark-count rate and secure
//! key rate for a QKD device. The lab and mobile profiles share the same
//! computation shape and differ in their constants and inputs. Values
//! carry bounded random jitter: they are illustrative, not a detector
//! simulation.

use super::{DeviceProfile, MobileMeasurementBatch};
use crate::randomness::ClassicalRng;
use crate::runlog::RunLog;
use serde::{Deserialize, Serialize};

/// Fiber attenuation in dB per km.
const FIBER_LOSS_DB_PER_KM: f64 = 0.2;

/// Fidelity reported for a disconnected (simulated) lab backend.
const SIMULATOR_FIDELITY: f64 = 0.999;

/// Mobile key rates are scaled down below this many measurements.
const MOBILE_FULL_BATCH: usize = 1000;

/// Parameter profile of the device model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    Lab,
    Mobile,
}

/// Profile-specific constants.
#[derive(Debug, Clone, Copy)]
pub struct ProfileConstants {
    pub base_fidelity: f64,
    pub fidelity_jitter: f64,
    pub fidelity_range: (f64, f64),
    pub base_efficiency: f64,
    pub efficiency_jitter: f64,
    pub efficiency_range: (f64, f64),
    /// Uniform dark-count band (Hz) used when nothing is measured.
    pub dark_count_band: (f64, f64),
    /// Error-correction overhead per unit of QBER.
    pub ec_overhead: f64,
    /// Fixed privacy-amplification overhead.
    pub pa_overhead: f64,
}

const LAB: ProfileConstants = ProfileConstants {
    base_fidelity: 0.95,
    fidelity_jitter: 0.02,
    fidelity_range: (0.8, 0.99),
    base_efficiency: 0.85,
    efficiency_jitter: 0.05,
    efficiency_range: (0.6, 0.95),
    dark_count_band: (50.0, 500.0),
    ec_overhead: 1.2,
    pa_overhead: 0.1,
};

const MOBILE: ProfileConstants = ProfileConstants {
    base_fidelity: 0.88,
    fidelity_jitter: 0.03,
    fidelity_range: (0.7, 0.95),
    base_efficiency: 0.75,
    efficiency_jitter: 0.05,
    efficiency_range: (0.5, 0.9),
    dark_count_band: (100.0, 1000.0),
    ec_overhead: 1.5,
    pa_overhead: 0.15,
};

impl Profile {
    pub fn constants(self) -> &'static ProfileConstants {
        match self {
            Profile::Lab => &LAB,
            Profile::Mobile => &MOBILE,
        }
    }
}

/// Performance figures of a device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceMetrics {
    pub fidelity: f64,
    pub detection_efficiency: f64,
    /// Hz.
    pub dark_count_rate: f64,
    /// Bits per second.
    pub secure_key_rate: f64,
    pub qber: f64,
    /// MHz.
    pub photon_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_measurements: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_count: Option<usize>,
}

/// Binary entropy `h(p) = -p·log2(p) - (1-p)·log2(1-p)`, 0 at p∈{0,1}.
pub fn binary_entropy(p: f64) -> f64 {
    if p <= 0.0 || p >= 1.0 {
        return 0.0;
    }
    -p * p.log2() - (1.0 - p) * (1.0 - p).log2()
}

/// Transmission through `distance` km of fiber.
pub fn fiber_transmission(distance: f64) -> f64 {
    10f64.powf(-(FIBER_LOSS_DB_PER_KM * distance) / 10.0)
}

/// Estimates device metrics for one profile.
#[derive(Debug, Clone, Copy)]
pub struct DeviceMetricsModel {
    profile: Profile,
}

impl DeviceMetricsModel {
    pub fn new(profile: Profile) -> Self {
        Self { profile }
    }

    pub fn lab() -> Self {
        Self::new(Profile::Lab)
    }

    pub fn mobile() -> Self {
        Self::new(Profile::Mobile)
    }

    #[inline]
    pub fn profile(&self) -> Profile {
        self.profile
    }

    #[inline]
    fn constants(&self) -> &'static ProfileConstants {
        self.profile.constants()
    }

    fn jittered(&self, value: f64, amplitude: f64, range: (f64, f64), rng: &mut ClassicalRng) -> f64 {
        (value + rng.uniform(-amplitude, amplitude)).clamp(range.0, range.1)
    }

    /// Lab fidelity: degrades with the connected device's qubit count;
    /// a disconnected backend is a simulator and reports 0.999.
    pub fn lab_fidelity(&self, device: &DeviceProfile, rng: &mut ClassicalRng, log: &mut RunLog) -> f64 {
        if !device.connected {
            log.info(format!("Simulator fidelity: {:.3}", SIMULATOR_FIDELITY));
            return SIMULATOR_FIDELITY;
        }
        let c = self.constants();
        let qubits = device.num_qubits.unwrap_or(5) as f64;
        let degradation = (qubits * 0.005).min(0.1);
        let fidelity = self.jittered(c.base_fidelity - degradation, c.fidelity_jitter, c.fidelity_range, rng);
        log.info(format!("Device fidelity measured: {:.3}", fidelity));
        fidelity
    }

    /// Mobile fidelity: scaled by the measured success rate.
    pub fn mobile_fidelity(
        &self,
        total: usize,
        errors: usize,
        rng: &mut ClassicalRng,
        log: &mut RunLog,
    ) -> f64 {
        if total == 0 {
            return 0.0;
        }
        let c = self.constants();
        let success_rate = 1.0 - errors as f64 / total as f64;
        let fidelity = self.jittered(
            c.base_fidelity * success_rate,
            c.fidelity_jitter,
            c.fidelity_range,
            rng,
        );
        log.info(format!("Mobile device fidelity: {:.3}", fidelity));
        fidelity
    }

    /// Lab detection efficiency: detector dead time costs up to 10%
    /// above 100 MHz.
    pub fn lab_detection_efficiency(&self, photon_rate: f64, rng: &mut ClassicalRng, log: &mut RunLog) -> f64 {
        let c = self.constants();
        let rate_factor = if photon_rate < 100.0 {
            1.0
        } else {
            1.0 - ((photon_rate - 100.0) / 1000.0).min(0.1)
        };
        let efficiency = self.jittered(
            c.base_efficiency * rate_factor,
            c.efficiency_jitter,
            c.efficiency_range,
            rng,
        );
        log.info(format!(
            "Detection efficiency: {:.3} at {} MHz",
            efficiency, photon_rate
        ));
        efficiency
    }

    /// Mobile detection efficiency: ambient light and temperature drift
    /// reduce the sensor's efficiency.
    pub fn mobile_detection_efficiency(
        &self,
        ambient_light: f64,
        temperature: f64,
        rng: &mut ClassicalRng,
        log: &mut RunLog,
    ) -> f64 {
        let c = self.constants();
        let light_factor = (1.0 - ambient_light / 1000.0).max(0.8);
        let temp_factor = 1.0 - (temperature - 25.0).abs() * 0.002;
        let efficiency = self.jittered(
            c.base_efficiency * light_factor * temp_factor,
            c.efficiency_jitter,
            c.efficiency_range,
            rng,
        );
        log.info(format!("Mobile detection efficiency: {:.3}", efficiency));
        efficiency
    }

    /// Dark-count rate in Hz. Mobile batches with flagged errors derive
    /// it from the error density (assuming 100 measurements per second);
    /// otherwise it is drawn from the profile's band.
    pub fn dark_count_rate(&self, errors: Option<usize>, rng: &mut ClassicalRng, log: &mut RunLog) -> f64 {
        let (low, high) = self.constants().dark_count_band;
        match self.profile {
            Profile::Lab => {
                let rate = rng.uniform(low, high);
                log.info(format!("Dark count rate: {:.1} Hz", rate));
                rate
            }
            Profile::Mobile => {
                let rate = match errors {
                    Some(n) if n > 0 => n as f64 * 10_000.0 / 100.0,
                    _ => rng.uniform(low, high),
                };
                let rate = rate.clamp(100.0, 5000.0);
                log.info(format!("Mobile dark count rate: {:.1} Hz", rate));
                rate
            }
        }
    }

    /// QBER estimated from dark counts against the detected signal,
    /// capped at 0.25. Used by the lab profile.
    pub fn estimated_qber(&self, photon_rate: f64, efficiency: f64, dark_count_rate: f64, distance: f64) -> f64 {
        let signal = photon_rate * 1e6 * efficiency * fiber_transmission(distance);
        let total = signal + dark_count_rate;
        let qber = if total > 0.0 { dark_count_rate / total } else { 0.5 };
        qber.min(0.25)
    }

    /// Secure key rate in bits per second.
    ///
    /// `detected = photon_rate(MHz→Hz) · efficiency · fiber loss`, then
    /// `detected · 0.5 · (1 - h(qber))` reduced by the profile's
    /// error-correction and privacy-amplification overheads, floored at
    /// zero. `measurements` scales mobile rates for small batches.
    pub fn secure_key_rate(
        &self,
        photon_rate: f64,
        efficiency: f64,
        qber: f64,
        distance: f64,
        measurements: Option<usize>,
    ) -> f64 {
        let c = self.constants();
        let effective = photon_rate * 1e6 * efficiency * fiber_transmission(distance);
        let raw = effective * 0.5 * (1.0 - binary_entropy(qber));
        let mut rate = (raw * (1.0 - c.ec_overhead * qber - c.pa_overhead)).max(0.0);

        if self.profile == Profile::Mobile {
            if let Some(n) = measurements {
                if n < MOBILE_FULL_BATCH {
                    rate *= n as f64 / MOBILE_FULL_BATCH as f64;
                }
            }
        }
        rate
    }

    /// Full lab measurement for a probed device.
    pub fn measure_lab(
        &self,
        device: &DeviceProfile,
        photon_rate: f64,
        distance: f64,
        rng: &mut ClassicalRng,
        log: &mut RunLog,
    ) -> DeviceMetrics {
        let fidelity = self.lab_fidelity(device, rng, log);
        let detection_efficiency = self.lab_detection_efficiency(photon_rate, rng, log);
        let dark_count_rate = self.dark_count_rate(None, rng, log);
        let qber = self.estimated_qber(photon_rate, detection_efficiency, dark_count_rate, distance);
        let secure_key_rate = self.secure_key_rate(photon_rate, detection_efficiency, qber, distance, None);
        log.info(format!(
            "Secure key rate: {:.0} bps (QBER: {:.3})",
            secure_key_rate, qber
        ));

        DeviceMetrics {
            fidelity,
            detection_efficiency,
            dark_count_rate,
            secure_key_rate,
            qber,
            photon_rate,
            total_measurements: None,
            error_count: None,
        }
    }

    /// Full mobile measurement from a validated batch.
    ///
    /// The QBER is the measured error share, not an estimate.
    pub fn measure_mobile(
        &self,
        batch: &MobileMeasurementBatch,
        total: usize,
        rng: &mut ClassicalRng,
        log: &mut RunLog,
    ) -> DeviceMetrics {
        let errors = batch.measurement_errors.len();
        let fidelity = self.mobile_fidelity(total, errors, rng, log);
        let detection_efficiency = self.mobile_detection_efficiency(
            batch.ambient_light.unwrap_or(50.0),
            batch.temperature.unwrap_or(25.0),
            rng,
            log,
        );
        let dark_count_rate = self.dark_count_rate(Some(errors), rng, log);
        let qber = if total > 0 {
            errors as f64 / total as f64
        } else {
            0.0
        };
        let photon_rate = batch.photon_rate();
        let secure_key_rate =
            self.secure_key_rate(photon_rate, detection_efficiency, qber, batch.distance(), Some(total));
        log.info(format!("Mobile secure key rate: {:.0} bps", secure_key_rate));

        DeviceMetrics {
            fidelity,
            detection_efficiency,
            dark_count_rate,
            secure_key_rate,
            qber,
            photon_rate,
            total_measurements: Some(total),
            error_count: Some(errors),
        }
    }
}

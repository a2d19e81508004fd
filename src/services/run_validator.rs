//! Per-run numerical health check.
//!
//! A run is numerically clean when neither its polarization nor its
//! carrier ratio contains NaN and no polarization value exceeds the overflow
//! threshold in magnitude. Offending polarization entries are zeroed in the
//! returned result so the series stays usable for plotting; the health flag
//! is always computed from the raw values.

use crate::domain::models::RunResult;

/// Classifies and sanitizes single runs.
#[derive(Debug, Clone, Copy)]
pub struct RunValidator {
    overflow_threshold: f64,
}

impl RunValidator {
    pub const fn new(overflow_threshold: f64) -> Self {
        Self { overflow_threshold }
    }

    fn is_anomalous(&self, value: f64) -> bool {
        value.is_nan() || value.abs() > self.overflow_threshold
    }

    /// Whether the raw output is free of NaN and overflow.
    pub fn is_clean(&self, result: &RunResult) -> bool {
        if result.is_failed() {
            return false;
        }
        let pol_ok = !result.polarization.values().any(|v| self.is_anomalous(v));
        let carriers_ok = !result.carrier_ratio.iter().any(|v| v.is_nan());
        pol_ok && carriers_ok
    }

    /// Set the health flag and zero anomalous polarization entries.
    pub fn validate(&self, mut result: RunResult) -> RunResult {
        let clean = self.is_clean(&result);
        if !clean && !result.is_failed() {
            result.polarization = result
                .polarization
                .map(|v| if self.is_anomalous(v) { 0.0 } else { v });
            tracing::warn!(
                time_step = %result.time_step,
                "Engine produced NaN or overflowing values during this run"
            );
        }
        result.numerically_clean = clean;
        result
    }
}

impl Default for RunValidator {
    fn default() -> Self {
        Self::new(crate::domain::models::convergence::DEFAULT_OVERFLOW_THRESHOLD)
    }
}

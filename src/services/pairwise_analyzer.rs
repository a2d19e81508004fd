//! Pairwise convergence analysis between consecutive runs.
//!
//! Runs are compared sample by sample at the cached instants they share.
//! A comparison is only meaningful when both runs conserve the carrier
//! number, so the polarization tests are skipped otherwise.

use crate::domain::models::{ConvergencePolicy, FieldAxis, PairOutcome, RunResult, Verdict};

/// Electron-conservation test: no carrier-ratio sample strictly above `tolerance`.
pub fn electron_conservation_test(carrier_ratio: &[f64], tolerance: f64) -> bool {
    !carrier_ratio.iter().any(|ratio| *ratio > tolerance)
}

/// Axis along which the field-aligned test compares polarizations.
///
/// First nonzero direction component; an all-zero direction selects x.
pub fn field_axis(direction: [f64; 3]) -> FieldAxis {
    FieldAxis::from_direction(direction)
}

/// Compares consecutive runs under the polarization criteria of a policy.
#[derive(Debug, Clone, Copy)]
pub struct PairwiseAnalyzer {
    tolerance: f64,
    axis: FieldAxis,
}

impl PairwiseAnalyzer {
    pub const fn new(tolerance: f64, axis: FieldAxis) -> Self {
        Self { tolerance, axis }
    }

    pub const fn from_policy(policy: &ConvergencePolicy) -> Self {
        Self::new(policy.polarization_tolerance, policy.field_axis)
    }

    pub const fn axis(&self) -> FieldAxis {
        self.axis
    }

    /// Relative-difference test on two series of the same observable.
    ///
    /// Passes iff `(current - previous) / tolerance` is nowhere above 1.
    /// Series of different length do not share their cached instants and fail.
    fn relative_difference_test(&self, current: &[f64], previous: &[f64]) -> Verdict {
        if current.len() != previous.len() {
            tracing::warn!(
                current = current.len(),
                previous = previous.len(),
                "Runs cached a different number of samples"
            );
            return Verdict::Fail;
        }
        let exceeded = current
            .iter()
            .zip(previous)
            .any(|(cur, prev)| (cur - prev) / self.tolerance > 1.0);
        Verdict::from_bool(!exceeded)
    }

    /// `|P|^2` test.
    pub fn pol_squared_test(&self, current: &RunResult, previous: &RunResult) -> Verdict {
        self.relative_difference_test(
            &current.polarization.squared_magnitude(),
            &previous.polarization.squared_magnitude(),
        )
    }

    /// Test on the polarization component along the applied field.
    pub fn along_field_test(&self, current: &RunResult, previous: &RunResult) -> Verdict {
        self.relative_difference_test(
            current.polarization.component(self.axis),
            previous.polarization.component(self.axis),
        )
    }

    /// Compare run `n` with run `n - 1`.
    ///
    /// Both polarization tests are evaluated only when both runs passed the
    /// electron conservation test.
    pub fn compare(
        &self,
        current: &RunResult,
        previous: &RunResult,
        electron_current: bool,
        electron_previous: bool,
    ) -> PairOutcome {
        if !(electron_current && electron_previous) {
            return PairOutcome::skipped();
        }
        PairOutcome {
            pol_squared: self.pol_squared_test(current, previous),
            along_field: self.along_field_test(current, previous),
        }
    }
}

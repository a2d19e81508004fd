//! Convergence policy.
//!
//! The [`ConvergencePolicy`] bundles the numerical tolerances and the
//! termination rule used by the time-step convergence loop. It is assembled
//! from configuration and the base input deck before the first run and does
//! not change afterwards.

use serde::{Deserialize, Serialize};

use crate::domain::models::field::FieldAxis;

/// Default number of consecutive passing comparisons that ends the loop.
pub const DEFAULT_REQUIRED_STREAK: u32 = 2;

/// Default tolerance on the carrier-ratio diagnostic.
pub const DEFAULT_ELECTRON_TOLERANCE: f64 = 1e-4;

/// Default tolerance on polarization differences between runs.
pub const DEFAULT_POLARIZATION_TOLERANCE: f64 = 1e-3;

/// Default magnitude above which a polarization value counts as overflow.
pub const DEFAULT_OVERFLOW_THRESHOLD: f64 = 1e8;

/// Governs acceptance and termination of the convergence loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergencePolicy {
    /// Consecutive passing comparisons needed to declare convergence.
    pub required_streak: u32,

    /// A run fails electron conservation when any carrier-ratio sample
    /// strictly exceeds this value.
    pub electron_tolerance: f64,

    /// Relative tolerance for both polarization tests.
    pub polarization_tolerance: f64,

    /// Polarization magnitude treated as numerical overflow.
    pub overflow_threshold: f64,

    /// Polarization component compared by the field-aligned test.
    pub field_axis: FieldAxis,
}

impl Default for ConvergencePolicy {
    fn default() -> Self {
        Self {
            required_streak: DEFAULT_REQUIRED_STREAK,
            electron_tolerance: DEFAULT_ELECTRON_TOLERANCE,
            polarization_tolerance: DEFAULT_POLARIZATION_TOLERANCE,
            overflow_threshold: DEFAULT_OVERFLOW_THRESHOLD,
            field_axis: FieldAxis::X,
        }
    }
}

impl ConvergencePolicy {
    pub fn with_field_axis(mut self, axis: FieldAxis) -> Self {
        self.field_axis = axis;
        self
    }
}

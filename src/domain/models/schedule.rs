//! Candidate time-step schedules.

use serde::{Deserialize, Serialize};

use super::time_step::TimeStep;

/// Inputs of the candidate generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleParams {
    /// Largest (first) candidate, in attoseconds.
    pub max_time_step: u32,
    /// Difference between consecutive candidates, in attoseconds.
    pub decrement: u32,
    /// Requested number of candidates before non-positive ones are dropped.
    pub count: u32,
    /// Simulated time after the field is over, in femtoseconds.
    pub reference_duration_fs: f64,
    /// Minimum number of cached samples required in the reference window.
    pub min_time_points: Option<u32>,
}

/// Time steps to test and the simulated duration shared by every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSchedule {
    /// Strictly decreasing multiples of the decrement.
    pub time_steps: Vec<TimeStep>,
    /// Least common multiple of the time steps, in femtoseconds.
    pub lcm_fs: f64,
    /// Field settling time, in femtoseconds.
    pub field_settling_fs: f64,
    pub reference_duration_fs: f64,
    /// `lcm_fs + field_settling_fs + reference_duration_fs`.
    pub total_duration_fs: f64,
}

impl CandidateSchedule {
    pub fn len(&self) -> usize {
        self.time_steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time_steps.is_empty()
    }

    /// Smallest and largest candidate.
    pub fn range(&self) -> Option<(TimeStep, TimeStep)> {
        Some((*self.time_steps.last()?, *self.time_steps.first()?))
    }
}

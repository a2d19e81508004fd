//! Convergence state machine.
//!
//! [`ConvergenceState`] is threaded by value through the controller loop:
//! every transition consumes the previous state and returns the next one.
//! This keeps the streak rule testable without any engine process.
//!
//! ```text
//! Init -> DipolesReady -> Running(0) -> ... -> Running(i) -> Converged
//!                                                         \-> Exhausted
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::verdict::PairOutcome;
use crate::domain::models::run::RunResult;
use crate::domain::models::time_step::TimeStep;

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Position of the controller in the convergence procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    Init,
    DipolesReady,
    /// Candidate `index` has been executed and analyzed.
    Running { index: usize },
    /// Two consecutive comparisons passed; terminal.
    Converged { recommended: TimeStep },
    /// Every candidate was tried without reaching the required streak; terminal.
    Exhausted,
}

impl Phase {
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Converged { .. } | Self::Exhausted)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "INIT"),
            Self::DipolesReady => write!(f, "DIPOLES_READY"),
            Self::Running { index } => write!(f, "RUNNING({index})"),
            Self::Converged { recommended } => write!(f, "CONVERGED({recommended})"),
            Self::Exhausted => write!(f, "EXHAUSTED"),
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Final answer of the procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The coarsest step that still converged.
    Converged { recommended: TimeStep },
    /// No tested candidate converged; no step is recommended.
    Exhausted,
}

impl Outcome {
    pub const fn recommended(&self) -> Option<TimeStep> {
        match self {
            Self::Converged { recommended } => Some(*recommended),
            Self::Exhausted => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Analysis of one executed candidate, before the streak rule is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Sanitized run output.
    pub run: RunResult,
    /// No NaN or overflow in the raw output.
    pub nan_test: bool,
    /// Carrier ratio within tolerance; false whenever `nan_test` is false.
    pub electron_test: bool,
    /// Comparison with the previous candidate; `None` for the first one.
    pub pair: Option<PairOutcome>,
}

/// One executed candidate together with the streak after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub run: RunResult,
    pub nan_test: bool,
    pub electron_test: bool,
    pub pair: Option<PairOutcome>,
    pub streak: u32,
}

impl CandidateRecord {
    pub fn time_step(&self) -> TimeStep {
        self.run.time_step
    }
}

/// Number of runs (or pairs) passing each test.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestTally {
    pub runs: usize,
    pub pairs: usize,
    pub nan_passed: usize,
    pub electron_passed: usize,
    pub pol_squared_passed: usize,
    pub along_field_passed: usize,
}

// ---------------------------------------------------------------------------
// ConvergenceState
// ---------------------------------------------------------------------------

/// Accumulated results of the convergence procedure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceState {
    records: Vec<CandidateRecord>,
    streak: u32,
    phase: Phase,
}

impl Default for ConvergenceState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConvergenceState {
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
            streak: 0,
            phase: Phase::Init,
        }
    }

    pub fn records(&self) -> &[CandidateRecord] {
        &self.records
    }

    pub fn last(&self) -> Option<&CandidateRecord> {
        self.records.last()
    }

    pub const fn streak(&self) -> u32 {
        self.streak
    }

    pub const fn phase(&self) -> Phase {
        self.phase
    }

    pub const fn is_terminal(&self) -> bool {
        self.phase.is_terminal()
    }

    /// The shared dipole prerequisite is available.
    pub fn dipoles_ready(mut self) -> Self {
        if self.phase == Phase::Init {
            self.phase = Phase::DipolesReady;
        }
        self
    }

    /// Append the next candidate and apply the streak rule.
    ///
    /// The streak grows only when both polarization tests pass and resets on
    /// any other pairwise outcome. Reaching `required_streak` converges on the
    /// larger time step of the comparison that completed the streak.
    pub fn record(mut self, evaluation: Evaluation, required_streak: u32) -> Self {
        if self.is_terminal() {
            return self;
        }

        self.streak = match evaluation.pair {
            Some(pair) if pair.passed() => self.streak + 1,
            _ => 0,
        };

        let previous = self.records.last().map(CandidateRecord::time_step);
        let index = self.records.len();
        self.records.push(CandidateRecord {
            run: evaluation.run,
            nan_test: evaluation.nan_test,
            electron_test: evaluation.electron_test,
            pair: evaluation.pair,
            streak: self.streak,
        });

        self.phase = match previous {
            Some(recommended) if self.streak >= required_streak => {
                Phase::Converged { recommended }
            }
            _ => Phase::Running { index },
        };
        self
    }

    /// Close the procedure once no candidates remain.
    pub fn finish(mut self) -> Self {
        if !self.is_terminal() {
            self.phase = Phase::Exhausted;
        }
        self
    }

    /// Final outcome, once the state is terminal.
    pub const fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::Converged { recommended } => Some(Outcome::Converged { recommended }),
            Phase::Exhausted => Some(Outcome::Exhausted),
            _ => None,
        }
    }

    pub fn tally(&self) -> TestTally {
        let pairs = self.records.iter().filter_map(|r| r.pair);
        let (pairs_count, pol_squared_passed, along_field_passed) =
            pairs.fold((0, 0, 0), |(n, sq, af), pair| {
                (
                    n + 1,
                    sq + usize::from(pair.pol_squared.is_pass()),
                    af + usize::from(pair.along_field.is_pass()),
                )
            });

        TestTally {
            runs: self.records.len(),
            pairs: pairs_count,
            nan_passed: self.records.iter().filter(|r| r.nan_test).count(),
            electron_passed: self.records.iter().filter(|r| r.electron_test).count(),
            pol_squared_passed,
            along_field_passed,
        }
    }
}

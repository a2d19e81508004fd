//! Time-step convergence controller.
//!
//! Runs the candidates from the largest time step down and stops as soon as
//! two consecutive pairwise comparisons pass. Each step of the loop:
//!
//! 1. execute the candidate (a failed invocation yields an unclean run),
//! 2. NaN/overflow validation,
//! 3. electron conservation test (clean runs only),
//! 4. |P|^2 and field-aligned comparison with the previous candidate,
//! 5. streak update through [`ConvergenceState::record`].

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::candidate_generator::CandidateGenerator;
use super::pairwise_analyzer::{electron_conservation_test, PairwiseAnalyzer};
use super::run_driver::{DipolesStatus, RunDriver};
use super::run_validator::RunValidator;
use crate::domain::errors::{ConfigurationError, DomainError, DomainResult};
use crate::domain::models::{
    CandidateRecord, CandidateSchedule, ConvergencePolicy, ConvergenceState, Evaluation, Field,
    Outcome, RunResult, ScheduleParams, TestTally, TimeStep,
};

/// File name of the JSON report written into the run directory.
pub const REPORT_FILE: &str = "convergence_report.json";

/// Everything the procedure learned, in the order it learned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceReport {
    pub field: Field,
    pub policy: ConvergencePolicy,
    pub schedule: CandidateSchedule,
    pub dipoles_computed: bool,
    pub records: Vec<CandidateRecord>,
    pub outcome: Outcome,
    pub tally: TestTally,
    pub warnings: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ConvergenceReport {
    pub const fn recommended(&self) -> Option<TimeStep> {
        self.outcome.recommended()
    }

    /// Time steps actually executed, in execution order.
    pub fn executed(&self) -> Vec<TimeStep> {
        self.records.iter().map(CandidateRecord::time_step).collect()
    }

    /// Serialize the report as pretty JSON.
    pub async fn write(&self, path: &Path) -> DomainResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json)
            .await
            .map_err(|e| DomainError::io(path, e))
    }

    /// Load a report written by [`ConvergenceReport::write`].
    pub async fn read(path: &Path) -> DomainResult<Self> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DomainError::io(path, e))?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Drives the full convergence procedure.
pub struct ConvergenceController {
    driver: RunDriver,
    params: ScheduleParams,
    policy: ConvergencePolicy,
    write_report: bool,
}

impl ConvergenceController {
    pub fn new(driver: RunDriver, params: ScheduleParams, policy: ConvergencePolicy) -> Self {
        Self {
            driver,
            params,
            policy,
            write_report: true,
        }
    }

    /// Whether to write [`REPORT_FILE`] into the run directory.
    pub fn with_report(mut self, write_report: bool) -> Self {
        self.write_report = write_report;
        self
    }

    pub fn report_path(&self) -> PathBuf {
        self.driver.run_path().join(REPORT_FILE)
    }

    /// Read the field and derive the candidate schedule without running anything.
    pub fn plan(&self) -> Result<(Field, CandidateSchedule), ConfigurationError> {
        let field = CandidateGenerator::field_envelope(self.driver.base_deck())?;
        let schedule = CandidateGenerator::generate(&self.params, &field.envelope)?;
        Ok((field, schedule))
    }

    /// Run the procedure to a terminal state.
    ///
    /// Configuration errors abort before any external invocation. A candidate
    /// whose run fails is recorded as unclean and the loop continues.
    pub async fn run(mut self) -> DomainResult<ConvergenceReport> {
        let started_at = Utc::now();

        let (field, schedule) = self.plan()?;
        let policy = self.policy.with_field_axis(field.axis());
        CandidateGenerator::apply_timing(self.driver.base_deck_mut(), &schedule);

        self.driver.prepare_workspace().await?;
        let dipoles = self.driver.ensure_dipoles().await?;
        let mut state = ConvergenceState::new().dipoles_ready();

        let validator = RunValidator::new(policy.overflow_threshold);
        let analyzer = PairwiseAnalyzer::from_policy(&policy);
        tracing::info!(
            candidates = schedule.len(),
            axis = %policy.field_axis,
            tol_eh = policy.electron_tolerance,
            tol_pol = policy.polarization_tolerance,
            "Running time step convergence"
        );

        for &time_step in &schedule.time_steps {
            let spec = self.driver.candidate(time_step);
            let run = match self.driver.execute(&spec).await {
                Ok(run) => run,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!(
                        time_step = %time_step,
                        error = %e,
                        "Run failed, recording it as unclean"
                    );
                    RunResult::failed(time_step, e.to_string())
                }
            };

            let evaluation = evaluate(&validator, &analyzer, &policy, &state, run);
            tracing::info!(
                time_step = %time_step,
                nan_test = evaluation.nan_test,
                electron_test = evaluation.electron_test,
                pol_squared = ?evaluation.pair.map(|p| p.pol_squared),
                along_field = ?evaluation.pair.map(|p| p.along_field),
                "Candidate analyzed"
            );

            state = state.record(evaluation, policy.required_streak);
            tracing::debug!(phase = %state.phase(), streak = state.streak(), "State updated");
            if state.is_terminal() {
                break;
            }
        }

        let state = state.finish();
        let outcome = state.outcome().unwrap_or(Outcome::Exhausted);
        match outcome.recommended() {
            Some(recommended) => {
                tracing::info!(recommended = %recommended, "Time step converged");
            }
            None => tracing::warn!("No tested candidate converged"),
        }

        let warnings = analysis_warnings(&state, outcome, policy.required_streak);
        for warning in &warnings {
            tracing::warn!("{warning}");
        }

        let report = ConvergenceReport {
            field,
            policy,
            schedule,
            dipoles_computed: dipoles == DipolesStatus::Computed,
            records: state.records().to_vec(),
            outcome,
            tally: state.tally(),
            warnings,
            started_at,
            finished_at: Utc::now(),
        };

        if self.write_report {
            let path = self.report_path();
            report.write(&path).await?;
            tracing::info!(path = %path.display(), "Convergence report written");
        }

        Ok(report)
    }
}

/// Validate a run and compare it with the last recorded candidate.
fn evaluate(
    validator: &RunValidator,
    analyzer: &PairwiseAnalyzer,
    policy: &ConvergencePolicy,
    state: &ConvergenceState,
    run: RunResult,
) -> Evaluation {
    let run = validator.validate(run);
    let nan_test = run.numerically_clean;
    let electron_test =
        nan_test && electron_conservation_test(&run.carrier_ratio, policy.electron_tolerance);
    let pair = state
        .last()
        .map(|previous| analyzer.compare(&run, &previous.run, electron_test, previous.electron_test));

    Evaluation {
        run,
        nan_test,
        electron_test,
        pair,
    }
}

/// Diagnostics for the user beyond the bare outcome.
fn analysis_warnings(
    state: &ConvergenceState,
    outcome: Outcome,
    required_streak: u32,
) -> Vec<String> {
    let mut warnings = Vec::new();
    let tally = state.tally();
    // Converging on the first possible run needs one reference run plus the streak.
    let earliest_convergence = required_streak as usize + 1;

    if tally.runs > 0 && tally.nan_passed == 0 {
        warnings.push("Every run produced NaN or overflowing values".to_string());
    } else if tally.runs > 0 && tally.electron_passed == 0 {
        warnings.push(
            "No run conserved the electron number; consider a smaller maximum time step"
                .to_string(),
        );
    }

    match outcome {
        Outcome::Exhausted if state.streak() > 0 && state.streak() + 1 == required_streak => {
            warnings.push(
                "The finest time step passed the polarization tests, but no candidate was \
                 left for the confirming run; add candidates to confirm it"
                    .to_string(),
            );
        }
        Outcome::Converged { .. } if state.records().len() <= earliest_convergence => warnings
            .push(
                "The largest time step already looks converged; consider increasing the \
                 maximum time step"
                    .to_string(),
            ),
        _ => {}
    }

    warnings
}

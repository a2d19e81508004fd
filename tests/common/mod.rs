//! Common test utilities for integration tests
//!
//! Shared fixtures for decks, run configurations and mock-backed controllers.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use rtstep::adapters::output::MockOutputReader;
use rtstep::adapters::scheduler::MockScheduler;
use rtstep::domain::models::{
    ConvergencePolicy, DeckValue, InputDeck, Polarization, RunConfig, ScheduleParams, TimeStep,
};
use rtstep::domain::ports::RunOutput;
use rtstep::services::{ConvergenceController, RunDriver};
use tempfile::TempDir;

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Setup test logging
///
/// Initializes tracing subscriber for test output.
pub fn setup_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

pub fn step(attoseconds: u32) -> TimeStep {
    TimeStep::new(attoseconds).expect("time step must be positive")
}

/// Base deck with a delta kick along z.
pub fn delta_deck() -> InputDeck {
    let mut deck = InputDeck::new();
    deck.push_argument("negf");
    deck.set("RTstep", DeckValue::quantity(10.0, "as"));
    deck.set("Field1_kind", DeckValue::text("DELTA"));
    deck.set(
        "Field1_Dir",
        DeckValue::Table {
            values: vec![0.0, 0.0, 1.0],
            unit: None,
        },
    );
    deck.set("DIP_CPU", DeckValue::text("1 1 1"));
    deck
}

/// Run configuration rooted in `dir`.
pub fn run_config(dir: &Path) -> RunConfig {
    RunConfig {
        run_path: dir.join("run"),
        save_path: dir.join("SAVE"),
        ..RunConfig::default()
    }
}

/// Default schedule: 30, 25, 20, 15, 10, 5 as.
pub fn default_params() -> ScheduleParams {
    ScheduleParams {
        max_time_step: 30,
        decrement: 5,
        count: 6,
        reference_duration_fs: 30.0,
        min_time_points: None,
    }
}

/// Output with a constant polarization `pz` along z and a conserved carrier number.
pub fn flat_output(pz: f64) -> RunOutput {
    RunOutput {
        polarization: Polarization::new(vec![0.0; 4], vec![0.0; 4], vec![pz; 4])
            .expect("rows have equal length"),
        carrier_ratio: vec![0.0; 4],
    }
}

/// Constant polarization `pz` along z with the given carrier-ratio samples.
pub fn output_with_carriers(pz: f64, carrier_ratio: Vec<f64>) -> RunOutput {
    RunOutput {
        carrier_ratio,
        ..flat_output(pz)
    }
}

/// Mock reader serving `flat_output(pz)` for each `(time step, pz)`.
pub fn reader(outputs: &[(u32, f64)]) -> MockOutputReader {
    outputs
        .iter()
        .fold(MockOutputReader::new(), |reader, &(ts, pz)| {
            reader.with_output(step(ts), flat_output(pz))
        })
}

/// Controller over mock ports with the default policy.
pub fn controller(
    dir: &Path,
    scheduler: Arc<MockScheduler>,
    reader: MockOutputReader,
    params: ScheduleParams,
    deck: InputDeck,
) -> ConvergenceController {
    let driver = RunDriver::new(scheduler, Arc::new(reader), deck, run_config(dir));
    ConvergenceController::new(driver, params, ConvergencePolicy::default())
}

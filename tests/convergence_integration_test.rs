//! End-to-end convergence runs over mock scheduler and output reader.

mod common;

use std::sync::Arc;

use rtstep::adapters::scheduler::MockScheduler;
use rtstep::domain::errors::{ConfigurationError, DomainError};
use rtstep::domain::models::{DeckValue, Outcome, Phase, Verdict};
use rtstep::services::{ConvergenceReport, REPORT_FILE};

use common::{
    controller, default_params, delta_deck, output_with_carriers, reader, setup_test_logging, step,
    temp_dir,
};

#[tokio::test]
async fn converges_on_the_coarser_step_of_the_second_agreeing_pair() {
    setup_test_logging();
    let dir = temp_dir();
    let scheduler = Arc::new(MockScheduler::new());
    // 30 -> 25 -> 20 keep growing; 20, 15 and 10 agree.
    let outputs = reader(&[(30, 0.0), (25, 1.0), (20, 2.0), (15, 2.0), (10, 2.0), (5, 2.0)]);

    let report = controller(dir.path(), scheduler.clone(), outputs, default_params(), delta_deck())
        .run()
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::Converged { recommended: step(15) });
    assert_eq!(
        report.executed(),
        vec![step(30), step(25), step(20), step(15), step(10)]
    );
    // Dipoles plus five runs; 5 as is never executed.
    assert_eq!(scheduler.call_count().await, 6);
    assert!(scheduler
        .submissions()
        .await
        .iter()
        .all(|commands| !commands.iter().any(|c| c.contains("RTstep_00005as"))));

    let streaks: Vec<u32> = report.records.iter().map(|r| r.streak).collect();
    assert_eq!(streaks, vec![0, 0, 0, 1, 2]);
    assert!(report.warnings.is_empty());
    assert!(report.dipoles_computed);
}

#[tokio::test]
async fn timing_fields_reach_every_run_deck() {
    let dir = temp_dir();
    let scheduler = Arc::new(MockScheduler::new());
    let outputs = reader(&[(30, 0.0), (25, 0.0), (20, 0.0)]);

    let report = controller(dir.path(), scheduler, outputs, default_params(), delta_deck())
        .run()
        .await
        .unwrap();
    assert_eq!(report.outcome, Outcome::Converged { recommended: step(25) });

    let deck = rtstep::InputDeck::read(dir.path().join("run").join("RTstep_00025as.in"))
        .await
        .unwrap();
    assert_eq!(deck.number("RTstep"), Some((25.0, Some("as"))));
    assert_eq!(deck.number("Field1_Tstart"), Some((0.3, Some("fs"))));
    assert_eq!(
        deck.number("NETime"),
        Some((report.schedule.total_duration_fs, Some("fs")))
    );
    assert_eq!(deck.table("IOCachetime"), Some(&[0.3, 0.3][..]));
}

#[tokio::test]
async fn overflowing_run_is_sanitized_and_excluded() {
    let dir = temp_dir();
    let scheduler = Arc::new(MockScheduler::new());
    let outputs = reader(&[(30, 0.0), (25, 2e8), (20, 0.0), (15, 0.0), (10, 0.0), (5, 0.0)]);

    let report = controller(dir.path(), scheduler, outputs, default_params(), delta_deck())
        .run()
        .await
        .unwrap();

    let overflowed = &report.records[1];
    assert_eq!(overflowed.time_step(), step(25));
    assert!(!overflowed.nan_test);
    assert!(!overflowed.electron_test);
    assert!(overflowed.run.polarization.axes()[2].iter().all(|v| *v == 0.0));
    assert_eq!(overflowed.pair.map(|p| p.pol_squared), Some(Verdict::Skipped));
    assert_eq!(report.records[2].pair.map(|p| p.along_field), Some(Verdict::Skipped));

    assert_eq!(report.outcome, Outcome::Converged { recommended: step(15) });
    assert_eq!(report.tally.nan_passed, 4);
}

#[tokio::test]
async fn exhaustion_recommends_nothing_and_writes_report() {
    let dir = temp_dir();
    let scheduler = Arc::new(MockScheduler::new());
    let outputs = reader(&[(30, 0.0), (25, 1.0), (20, 2.0), (15, 3.0), (10, 4.0), (5, 5.0)]);

    let report = controller(dir.path(), scheduler.clone(), outputs, default_params(), delta_deck())
        .run()
        .await
        .unwrap();

    assert_eq!(report.outcome, Outcome::Exhausted);
    assert_eq!(report.recommended(), None);
    assert_eq!(report.records.len(), 6);
    assert_eq!(report.tally.pairs, 5);
    assert_eq!(report.tally.along_field_passed, 0);
    assert_eq!(scheduler.call_count().await, 7);

    let written = ConvergenceReport::read(&dir.path().join("run").join(REPORT_FILE))
        .await
        .unwrap();
    assert_eq!(written, report);
}

#[tokio::test]
async fn report_with_nan_carrier_ratio_reads_back() {
    let dir = temp_dir();
    let outputs = reader(&[(30, 0.0), (20, 0.0), (15, 0.0), (10, 0.0), (5, 0.0)])
        .with_output(step(25), output_with_carriers(0.0, vec![0.0, f64::NAN, 0.0, 0.0]));

    let report = controller(
        dir.path(),
        Arc::new(MockScheduler::new()),
        outputs,
        default_params(),
        delta_deck(),
    )
    .run()
    .await
    .unwrap();
    assert!(!report.records[1].nan_test);
    assert_eq!(report.outcome, Outcome::Converged { recommended: step(15) });

    let written = ConvergenceReport::read(&dir.path().join("run").join(REPORT_FILE))
        .await
        .unwrap();
    assert_eq!(written.outcome, report.outcome);
    assert_eq!(written.records.len(), report.records.len());
    let carriers = &written.records[1].run.carrier_ratio;
    assert_eq!(carriers.len(), 4);
    assert!(carriers[1].is_nan());
    assert_eq!(written.records[2], report.records[2]);
}

#[tokio::test]
async fn electron_failure_skips_both_neighbouring_pairs_and_resets_the_streak() {
    let dir = temp_dir();
    // 30 and 25 agree, then 20 loses electrons beyond tol_eh = 1e-4.
    let outputs = reader(&[(30, 0.0), (25, 0.0), (15, 0.0), (10, 0.0), (5, 0.0)])
        .with_output(step(20), output_with_carriers(0.0, vec![0.0, 2e-4, 0.0, 0.0]));

    let report = controller(
        dir.path(),
        Arc::new(MockScheduler::new()),
        outputs,
        default_params(),
        delta_deck(),
    )
    .run()
    .await
    .unwrap();

    let lossy = &report.records[2];
    assert_eq!(lossy.time_step(), step(20));
    assert!(lossy.nan_test);
    assert!(!lossy.electron_test);

    for record in &report.records[2..4] {
        let pair = record.pair.unwrap();
        assert_eq!(pair.pol_squared, Verdict::Skipped);
        assert_eq!(pair.along_field, Verdict::Skipped);
    }

    let streaks: Vec<u32> = report.records.iter().map(|r| r.streak).collect();
    assert_eq!(streaks, vec![0, 1, 0, 0, 1, 2]);
    assert_eq!(report.outcome, Outcome::Converged { recommended: step(10) });
    assert_eq!(report.tally.electron_passed, 5);
}

#[tokio::test]
async fn single_pass_at_the_finest_step_is_reported() {
    let dir = temp_dir();
    let outputs = reader(&[(30, 0.0), (25, 1.0), (20, 2.0), (15, 3.0), (10, 4.0), (5, 4.0)]);

    let report = controller(
        dir.path(),
        Arc::new(MockScheduler::new()),
        outputs,
        default_params(),
        delta_deck(),
    )
    .run()
    .await
    .unwrap();

    assert_eq!(report.outcome, Outcome::Exhausted);
    assert_eq!(report.records.last().map(|r| r.streak), Some(1));
    assert_eq!(report.warnings.len(), 1);
}

#[tokio::test]
async fn configuration_error_halts_before_any_invocation() {
    let dir = temp_dir();
    let scheduler = Arc::new(MockScheduler::new());
    let mut params = default_params();
    params.decrement = 7;

    let result = controller(dir.path(), scheduler.clone(), reader(&[]), params, delta_deck())
        .run()
        .await;

    assert!(matches!(
        result,
        Err(DomainError::Configuration(
            ConfigurationError::NonDivisibleTimeStep { max: 30, decrement: 7 }
        ))
    ));
    assert_eq!(scheduler.call_count().await, 0);
    assert!(!dir.path().join("run").exists());
}

#[tokio::test]
async fn smooth_pulse_without_width_halts() {
    let dir = temp_dir();
    let scheduler = Arc::new(MockScheduler::new());
    let mut deck = delta_deck();
    deck.set("Field1_kind", DeckValue::text("QSSIN"));

    let result = controller(dir.path(), scheduler.clone(), reader(&[]), default_params(), deck)
        .run()
        .await;

    assert!(matches!(
        result,
        Err(DomainError::Configuration(ConfigurationError::MissingFieldWidth))
    ));
    assert_eq!(scheduler.call_count().await, 0);
}

#[tokio::test]
async fn failed_invocation_is_recorded_and_the_loop_continues() {
    let dir = temp_dir();
    // Dipoles, 30 as, then 25 as exits with status 1.
    let scheduler = Arc::new(MockScheduler::with_exit_codes([0, 0, 1]));
    let outputs = reader(&[(30, 0.0), (20, 1.0), (15, 1.0), (10, 1.0), (5, 1.0)]);

    let report = controller(dir.path(), scheduler, outputs, default_params(), delta_deck())
        .run()
        .await
        .unwrap();

    let failed = &report.records[1];
    assert_eq!(failed.time_step(), step(25));
    assert!(failed.run.is_failed());
    assert!(!failed.nan_test);
    assert_eq!(report.outcome, Outcome::Converged { recommended: step(15) });
}

#[tokio::test]
async fn existing_dipoles_are_reused() {
    let dir = temp_dir();
    let artifact = dir.path().join("run").join("dipoles").join("ndb.dipoles");
    tokio::fs::create_dir_all(artifact.parent().unwrap()).await.unwrap();
    tokio::fs::write(&artifact, b"").await.unwrap();

    let scheduler = Arc::new(MockScheduler::new());
    let outputs = reader(&[(30, 0.0), (25, 0.0), (20, 0.0)]);
    let report = controller(dir.path(), scheduler.clone(), outputs, default_params(), delta_deck())
        .run()
        .await
        .unwrap();

    assert!(!report.dipoles_computed);
    assert_eq!(scheduler.call_count().await, 3);
    assert!(report
        .warnings
        .iter()
        .any(|w| w.contains("largest time step already looks converged")));
}

#[tokio::test]
async fn report_can_be_disabled() {
    let dir = temp_dir();
    let outputs = reader(&[(30, 0.0), (25, 0.0), (20, 0.0)]);
    let controller = controller(
        dir.path(),
        Arc::new(MockScheduler::new()),
        outputs,
        default_params(),
        delta_deck(),
    )
    .with_report(false);
    let report_path = controller.report_path();

    controller.run().await.unwrap();
    assert!(!report_path.exists());
}

#[test]
fn terminal_phases_are_distinct() {
    assert!(Phase::Exhausted.is_terminal());
    assert!(Phase::Converged { recommended: step(5) }.is_terminal());
    assert!(!Phase::Running { index: 0 }.is_terminal());
}

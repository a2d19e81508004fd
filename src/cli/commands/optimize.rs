//! Implementation of the `rtstep optimize` command.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::adapters::output::TextOutputReader;
use crate::adapters::scheduler::ShellScheduler;
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::cli::types::OptimizeArgs;
use crate::domain::models::{Config, InputDeck};
use crate::services::{ConvergenceController, ConvergenceReport, RunDriver};

#[derive(Debug, serde::Serialize)]
pub struct OptimizeOutput {
    #[serde(flatten)]
    pub report: ConvergenceReport,
    pub report_path: Option<PathBuf>,
}

impl CommandOutput for OptimizeOutput {
    fn to_human(&self) -> String {
        let report = &self.report;
        let tally = &report.tally;
        let mut lines = vec![
            TableFormatter::new().format_records(&report.records),
            String::new(),
            format!(
                "[1] NaN and overflow test:             passed by {} out of {}",
                tally.nan_passed, tally.runs
            ),
            format!(
                "[2] Electron conservation (tol={:.0e}): passed by {} out of {}",
                report.policy.electron_tolerance, tally.electron_passed, tally.runs
            ),
            format!(
                "[3] |pol|^2 (tol={:.0e}):              passed by {} out of {}",
                report.policy.polarization_tolerance, tally.pol_squared_passed, tally.pairs
            ),
            format!(
                "[4] {} along field (tol={:.0e}):     passed by {} out of {}",
                report.policy.field_axis,
                report.policy.polarization_tolerance,
                tally.along_field_passed,
                tally.pairs
            ),
            String::new(),
        ];

        match report.recommended() {
            Some(step) => lines.push(format!("Suggested time step: {step}")),
            None => lines.push("No tested candidate converged.".to_string()),
        }
        for warning in &report.warnings {
            lines.push(format!("Warning: {warning}"));
        }
        if let Some(path) = &self.report_path {
            lines.push(format!("Report written to {}", path.display()));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: OptimizeArgs, config_path: Option<&Path>, json_mode: bool) -> Result<()> {
    let mut config = super::load_config(config_path)?;
    args.apply(&mut config);
    crate::infrastructure::config::ConfigLoader::validate(&config)?;
    let _logger = super::init_logging(&config, config.logging.log_to_file)?;

    let deck = super::read_deck(&config).await?;
    let controller = build_controller(&config, deck);
    let report_path = config
        .output
        .write_report
        .then(|| controller.report_path());

    let report = controller
        .run()
        .await
        .context("Time-step convergence procedure failed")?;

    output(
        &OptimizeOutput {
            report,
            report_path,
        },
        json_mode,
    );
    Ok(())
}

/// Wire the shell scheduler and the text output reader into a controller.
pub fn build_controller(config: &Config, deck: InputDeck) -> ConvergenceController {
    let driver = RunDriver::new(
        Arc::new(ShellScheduler::default()),
        Arc::new(TextOutputReader::new(config.output.carrier_ratio_column)),
        deck,
        config.run.clone(),
    );
    ConvergenceController::new(driver, config.schedule.params(), config.tolerances.policy())
        .with_report(config.output.write_report)
}

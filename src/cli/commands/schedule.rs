//! Implementation of the `rtstep schedule` command.
//!
//! Dry run: reads the deck and prints what `optimize` would run.

use anyhow::Result;
use std::path::Path;

use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::cli::types::ScheduleArgs;
use crate::domain::models::{CandidateSchedule, Config, Field, InputDeck};
use crate::infrastructure::config::ConfigLoader;
use crate::services::{field_axis, CandidateGenerator};

#[derive(Debug, serde::Serialize)]
pub struct ScheduleOutput {
    pub field: Field,
    pub field_axis: String,
    pub schedule: CandidateSchedule,
}

impl CommandOutput for ScheduleOutput {
    fn to_human(&self) -> String {
        let schedule = &self.schedule;
        let mut lines = vec![
            format!("Field: {} along {}", self.field.envelope, self.field_axis),
            TableFormatter::new().format_schedule(schedule),
            format!("Sampling interval (lcm): {:.3} fs", schedule.lcm_fs),
            format!("Field settling time:     {:.3} fs", schedule.field_settling_fs),
            format!("Reference duration:      {:.3} fs", schedule.reference_duration_fs),
            format!("Total duration:          {:.3} fs", schedule.total_duration_fs),
        ];
        if let Some((min, max)) = schedule.range() {
            lines.push(format!("Candidates from {max} down to {min}"));
        }
        lines.join("\n")
    }
}

pub async fn execute(args: ScheduleArgs, config_path: Option<&Path>, json_mode: bool) -> Result<()> {
    let config = configure(super::load_config(config_path)?, &args)?;
    let _logger = super::init_logging(&config, false)?;

    let deck = super::read_deck(&config).await?;
    let output_data = plan(&config, &deck)?;
    output(&output_data, json_mode);
    Ok(())
}

/// Apply the command-line overrides and check the result again.
fn configure(mut config: Config, args: &ScheduleArgs) -> Result<Config> {
    args.overrides.apply(&mut config);
    ConfigLoader::validate(&config)?;
    Ok(config)
}

/// Derive the schedule the controller would run for this deck.
pub fn plan(config: &Config, deck: &InputDeck) -> Result<ScheduleOutput> {
    let field = CandidateGenerator::field_envelope(deck)?;
    let schedule = CandidateGenerator::generate(&config.schedule.params(), &field.envelope)?;
    Ok(ScheduleOutput {
        field_axis: field_axis(field.direction).to_string(),
        field,
        schedule,
    })
}

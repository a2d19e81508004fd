//! Table output formatting for CLI commands
//!
//! Candidate summaries and schedules rendered with comfy-table. Verdicts are
//! color-coded unless `NO_COLOR` is set or the terminal is dumb.

use crate::domain::models::{CandidateRecord, CandidateSchedule, Verdict};
use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

/// Table formatter for CLI output
pub struct TableFormatter {
    /// Whether to use colors in output
    use_colors: bool,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
        }
    }

    pub const fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// One row per executed candidate with every test outcome and the streak.
    pub fn format_records(&self, records: &[CandidateRecord]) -> String {
        let mut table = create_base_table();
        table.set_header(header(&[
            "Time step",
            "NaN",
            "e/h",
            "|pol|^2",
            "pol along field",
            "Streak",
        ]));

        for record in records {
            let (pol_squared, along_field) = record.pair.map_or((None, None), |pair| {
                (Some(pair.pol_squared), Some(pair.along_field))
            });
            table.add_row(vec![
                Cell::new(record.time_step().to_string()),
                self.verdict_cell(Some(Verdict::from_bool(record.nan_test))),
                self.verdict_cell(Some(Verdict::from_bool(record.electron_test))),
                self.verdict_cell(pol_squared),
                self.verdict_cell(along_field),
                Cell::new(record.streak.to_string()),
            ]);
        }

        table.to_string()
    }

    /// Candidate time steps and the shared timing.
    pub fn format_schedule(&self, schedule: &CandidateSchedule) -> String {
        let mut table = create_base_table();
        table.set_header(header(&["#", "Time step", "Steps per sample"]));

        for (index, step) in schedule.time_steps.iter().enumerate() {
            let per_sample = schedule.lcm_fs / step.femtoseconds();
            table.add_row(vec![
                Cell::new(index + 1),
                Cell::new(step.to_string()),
                Cell::new(format!("{per_sample:.0}")),
            ]);
        }

        table.to_string()
    }

    fn verdict_cell(&self, verdict: Option<Verdict>) -> Cell {
        let Some(verdict) = verdict else {
            return Cell::new("-");
        };
        if !self.use_colors {
            return Cell::new(verdict.to_string());
        }
        let color = match verdict {
            Verdict::Pass => Color::Green,
            Verdict::Fail => Color::Red,
            Verdict::Skipped => Color::DarkGrey,
        };
        Cell::new(verdict.to_string()).fg(color)
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn header(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|title| Cell::new(title).add_attribute(Attribute::Bold))
        .collect()
}

fn create_base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}

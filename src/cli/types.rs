//! Command-line argument definitions.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::models::Config;

#[derive(Parser, Debug)]
#[command(
    name = "rtstep",
    version,
    about = "Time-step convergence for real-time propagation runs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .rtstep/config.yaml and .rtstep/local.yaml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration file
    Init(InitArgs),

    /// Show the candidate time steps and simulated duration without running
    Schedule(ScheduleArgs),

    /// Run the time-step convergence procedure
    Optimize(OptimizeArgs),
}

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

/// Overrides of the candidate schedule shared by `schedule` and `optimize`.
#[derive(Args, Debug, Default)]
pub struct ScheduleOverrides {
    /// Base input deck
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Largest candidate time step in attoseconds
    #[arg(long, value_name = "AS")]
    pub max_time_step: Option<u32>,

    /// Decrement between candidates in attoseconds
    #[arg(long, value_name = "AS")]
    pub decrement: Option<u32>,

    /// Number of candidates
    #[arg(long, short = 'n')]
    pub count: Option<u32>,

    /// Simulated time after the field in femtoseconds
    #[arg(long, value_name = "FS")]
    pub reference_duration: Option<f64>,

    /// Minimum polarization samples within the reference window
    #[arg(long)]
    pub min_time_points: Option<u32>,
}

impl ScheduleOverrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(input) = &self.input {
            config.run.input_path.clone_from(input);
        }
        if let Some(max) = self.max_time_step {
            config.schedule.max_time_step = max;
        }
        if let Some(decrement) = self.decrement {
            config.schedule.decrement = decrement;
        }
        if let Some(count) = self.count {
            config.schedule.count = count;
        }
        if let Some(reference) = self.reference_duration {
            config.schedule.reference_duration_fs = reference;
        }
        if self.min_time_points.is_some() {
            config.schedule.min_time_points = self.min_time_points;
        }
    }
}

#[derive(Args, Debug)]
pub struct ScheduleArgs {
    #[command(flatten)]
    pub overrides: ScheduleOverrides,
}

#[derive(Args, Debug)]
pub struct OptimizeArgs {
    #[command(flatten)]
    pub overrides: ScheduleOverrides,

    /// Engine database linked into the run directory
    #[arg(short, long, value_name = "DIR")]
    pub save: Option<PathBuf>,

    /// Run directory
    #[arg(short, long, value_name = "DIR")]
    pub run_path: Option<PathBuf>,

    /// Real-time engine executable
    #[arg(long)]
    pub engine: Option<String>,

    /// MPI ranks per run
    #[arg(long)]
    pub cores: Option<u32>,

    /// Do not write the JSON report into the run directory
    #[arg(long)]
    pub no_report: bool,
}

impl OptimizeArgs {
    pub fn apply(&self, config: &mut Config) {
        self.overrides.apply(config);
        if let Some(save) = &self.save {
            config.run.save_path.clone_from(save);
        }
        if let Some(run_path) = &self.run_path {
            config.run.run_path.clone_from(run_path);
        }
        if let Some(engine) = &self.engine {
            config.run.engine.clone_from(engine);
        }
        if let Some(cores) = self.cores {
            config.run.cores = cores;
        }
        if self.no_report {
            config.output.write_report = false;
        }
    }
}

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::convergence::{
    ConvergencePolicy, DEFAULT_ELECTRON_TOLERANCE, DEFAULT_OVERFLOW_THRESHOLD,
    DEFAULT_POLARIZATION_TOLERANCE, DEFAULT_REQUIRED_STREAK,
};
use super::schedule::ScheduleParams;

/// Main configuration structure for rtstep
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Engine invocation and run directory layout
    #[serde(default)]
    pub run: RunConfig,

    /// Candidate time-step schedule
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Acceptance tolerances
    #[serde(default)]
    pub tolerances: ToleranceConfig,

    /// Output parsing and reporting
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Engine invocation and run directory layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunConfig {
    /// Base input deck
    #[serde(default = "default_input_path")]
    pub input_path: PathBuf,

    /// Engine database linked into the run directory
    #[serde(default = "default_save_path")]
    pub save_path: PathBuf,

    /// Directory holding every deck, run output and the report
    #[serde(default = "default_run_path")]
    pub run_path: PathBuf,

    /// Real-time engine executable
    #[serde(default = "default_engine")]
    pub engine: String,

    /// MPI ranks per run; 1 runs the engine directly
    #[serde(default = "default_cores")]
    pub cores: u32,

    /// Launcher used when `cores > 1`
    #[serde(default = "default_mpi_launcher")]
    pub mpi_launcher: String,

    /// Folder (and job name) of the shared dipole precomputation
    #[serde(default = "default_dipoles_folder")]
    pub dipoles_folder: String,

    /// Deck variable overridden for each candidate
    #[serde(default = "default_parameter")]
    pub parameter: String,

    /// Unit of the overridden variable
    #[serde(default = "default_units")]
    pub units: String,
}

fn default_input_path() -> PathBuf {
    PathBuf::from("./yambo.in")
}

fn default_save_path() -> PathBuf {
    PathBuf::from("./SAVE")
}

fn default_run_path() -> PathBuf {
    PathBuf::from("./RT_time-step_optimize")
}

fn default_engine() -> String {
    "yambo_rt".to_string()
}

const fn default_cores() -> u32 {
    1
}

fn default_mpi_launcher() -> String {
    "mpirun".to_string()
}

fn default_dipoles_folder() -> String {
    "dipoles".to_string()
}

fn default_parameter() -> String {
    "RTstep".to_string()
}

fn default_units() -> String {
    "as".to_string()
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            save_path: default_save_path(),
            run_path: default_run_path(),
            engine: default_engine(),
            cores: default_cores(),
            mpi_launcher: default_mpi_launcher(),
            dipoles_folder: default_dipoles_folder(),
            parameter: default_parameter(),
            units: default_units(),
        }
    }
}

/// Candidate time-step schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScheduleConfig {
    /// Largest candidate time step in attoseconds
    #[serde(default = "default_max_time_step")]
    pub max_time_step: u32,

    /// Decrement between candidates in attoseconds
    #[serde(default = "default_decrement")]
    pub decrement: u32,

    /// Number of candidates to try
    #[serde(default = "default_count")]
    pub count: u32,

    /// Simulated duration after the field, in femtoseconds
    #[serde(default = "default_reference_duration")]
    pub reference_duration_fs: f64,

    /// Minimum polarization samples in the reference window (unchecked if unset)
    #[serde(default)]
    pub min_time_points: Option<u32>,
}

const fn default_max_time_step() -> u32 {
    30
}

const fn default_decrement() -> u32 {
    5
}

const fn default_count() -> u32 {
    6
}

const fn default_reference_duration() -> f64 {
    30.0
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            max_time_step: default_max_time_step(),
            decrement: default_decrement(),
            count: default_count(),
            reference_duration_fs: default_reference_duration(),
            min_time_points: None,
        }
    }
}

impl ScheduleConfig {
    pub const fn params(&self) -> ScheduleParams {
        ScheduleParams {
            max_time_step: self.max_time_step,
            decrement: self.decrement,
            count: self.count,
            reference_duration_fs: self.reference_duration_fs,
            min_time_points: self.min_time_points,
        }
    }
}

/// Acceptance tolerances
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ToleranceConfig {
    /// Carrier-ratio tolerance for the electron conservation test
    #[serde(default = "default_electron")]
    pub electron: f64,

    /// Relative tolerance for the polarization tests
    #[serde(default = "default_polarization")]
    pub polarization: f64,

    /// Polarization magnitude treated as overflow
    #[serde(default = "default_overflow")]
    pub overflow: f64,

    /// Consecutive passing comparisons needed to converge
    #[serde(default = "default_required_streak")]
    pub required_streak: u32,
}

const fn default_electron() -> f64 {
    DEFAULT_ELECTRON_TOLERANCE
}

const fn default_polarization() -> f64 {
    DEFAULT_POLARIZATION_TOLERANCE
}

const fn default_overflow() -> f64 {
    DEFAULT_OVERFLOW_THRESHOLD
}

const fn default_required_streak() -> u32 {
    DEFAULT_REQUIRED_STREAK
}

impl Default for ToleranceConfig {
    fn default() -> Self {
        Self {
            electron: default_electron(),
            polarization: default_polarization(),
            overflow: default_overflow(),
            required_streak: default_required_streak(),
        }
    }
}

impl ToleranceConfig {
    /// Policy with these tolerances; the field axis is set from the deck later.
    pub fn policy(&self) -> ConvergencePolicy {
        ConvergencePolicy {
            required_streak: self.required_streak,
            electron_tolerance: self.electron,
            polarization_tolerance: self.polarization,
            overflow_threshold: self.overflow,
            ..ConvergencePolicy::default()
        }
    }
}

/// Output parsing and reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct OutputConfig {
    /// Column of the carriers file holding the ratio (last column if unset)
    #[serde(default)]
    pub carrier_ratio_column: Option<usize>,

    /// Write `convergence_report.json` into the run directory
    #[serde(default = "default_true")]
    pub write_report: bool,
}

const fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            carrier_ratio_column: None,
            write_report: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Also log to `rtstep.log` in the run directory
    #[serde(default = "default_true")]
    pub log_to_file: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_to_file: true,
        }
    }
}

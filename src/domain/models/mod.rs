pub mod config;
pub mod convergence;
pub mod field;
pub mod input_deck;
pub mod run;
pub mod schedule;
pub mod time_step;

pub use config::{
    Config, LoggingConfig, OutputConfig, RunConfig, ScheduleConfig, ToleranceConfig,
};
pub use convergence::{
    CandidateRecord, ConvergencePolicy, ConvergenceState, Evaluation, Outcome, PairOutcome, Phase,
    TestTally, Verdict,
};
pub use field::{Field, FieldAxis, FieldEnvelope};
pub use input_deck::{DeckValue, InputDeck};
pub use run::{Polarization, RunResult, RunSpec};
pub use schedule::{CandidateSchedule, ScheduleParams};
pub use time_step::TimeStep;

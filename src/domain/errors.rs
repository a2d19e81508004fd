//! Domain errors for the time-step convergence controller.

use std::path::PathBuf;

use thiserror::Error;

/// Invalid or inconsistent input detected before any external invocation.
///
/// Always fatal: the procedure halts before the first engine run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error(
        "maximum time step {max} as is not divisible by the decrement {decrement} as; \
         polarizations sampled with different steps would not share comparison instants"
    )]
    NonDivisibleTimeStep { max: u32, decrement: u32 },

    #[error("invalid time step schedule: {0}")]
    InvalidTimeStep(String),

    #[error("least common multiple of the candidate time steps overflows")]
    TimeStepLcmOverflow,

    #[error("smooth-pulse field requires a nonzero Field1_FWHM (do not rely on Field1_Width)")]
    MissingFieldWidth,

    #[error("unsupported field kind: {0} (expected DELTA or QSSIN)")]
    UnsupportedFieldKind(String),

    #[error("input deck is missing required variable {0}")]
    MissingVariable(String),

    #[error(
        "only {available:.2} polarization samples fit in the reference duration, \
         at least {required} are required"
    )]
    TooFewTimePoints { available: f64, required: u32 },
}

/// Domain-level errors that can occur while driving the convergence procedure.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("external invocation failed for {label}: {reason}")]
    ExternalInvocation { label: String, reason: String },

    #[error("failed to parse run output in {path}: {reason}")]
    OutputParse { path: PathBuf, reason: String },

    #[error("input deck error at line {line}: {reason}")]
    Deck { line: usize, reason: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Wrap an I/O error with the path it occurred on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error must abort the whole procedure.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}

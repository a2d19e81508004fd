//! Test verdicts for individual runs and consecutive run pairs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome of a single acceptance test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    Fail,
    /// Not evaluated because a prerequisite test failed.
    Skipped,
}

impl Verdict {
    pub const fn from_bool(pass: bool) -> Self {
        if pass {
            Self::Pass
        } else {
            Self::Fail
        }
    }

    pub const fn is_pass(self) -> bool {
        matches!(self, Self::Pass)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Fail => write!(f, "fail"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

/// Result of comparing a run with the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairOutcome {
    /// `|P|^2` relative-difference test.
    pub pol_squared: Verdict,
    /// Field-aligned component relative-difference test.
    pub along_field: Verdict,
}

impl PairOutcome {
    /// Both tests skipped; at least one run failed electron conservation.
    pub const fn skipped() -> Self {
        Self {
            pol_squared: Verdict::Skipped,
            along_field: Verdict::Skipped,
        }
    }

    /// The pair counts toward convergence only when both tests pass.
    pub const fn passed(&self) -> bool {
        self.pol_squared.is_pass() && self.along_field.is_pass()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_passes_only_when_both_tests_pass() {
        let both = PairOutcome {
            pol_squared: Verdict::Pass,
            along_field: Verdict::Pass,
        };
        let one = PairOutcome {
            pol_squared: Verdict::Pass,
            along_field: Verdict::Fail,
        };
        assert!(both.passed());
        assert!(!one.passed());
        assert!(!PairOutcome::skipped().passed());
    }

    #[test]
    fn verdict_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&Verdict::Skipped).unwrap(), "\"skipped\"");
        assert_eq!(Verdict::from_bool(false), Verdict::Fail);
    }
}

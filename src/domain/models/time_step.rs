//! Simulation time steps.
//!
//! Time steps are integral numbers of attoseconds so that the least common
//! multiple of a candidate set is exact. Durations handed to the engine are
//! expressed in femtoseconds.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Attoseconds per femtosecond.
pub const AS_PER_FS: f64 = 1000.0;

/// A real-time propagation time step in attoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeStep(u32);

impl TimeStep {
    /// Create a time step, rejecting zero.
    pub const fn new(attoseconds: u32) -> Option<Self> {
        if attoseconds == 0 {
            None
        } else {
            Some(Self(attoseconds))
        }
    }

    /// Value in attoseconds.
    pub const fn attoseconds(self) -> u32 {
        self.0
    }

    /// Value in femtoseconds.
    pub fn femtoseconds(self) -> f64 {
        f64::from(self.0) / AS_PER_FS
    }
}

impl fmt::Display for TimeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} as", self.0)
    }
}

const fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Least common multiple of a set of time steps, in attoseconds.
///
/// Returns `None` for an empty set or when the result overflows `u64`.
pub fn lcm(steps: &[TimeStep]) -> Option<u64> {
    let mut iter = steps.iter();
    let first = u64::from(iter.next()?.attoseconds());
    iter.try_fold(first, |acc, step| {
        let value = u64::from(step.attoseconds());
        (acc / gcd(acc, value)).checked_mul(value)
    })
}

//! External field description.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::input_deck::InputDeck;
use crate::domain::errors::ConfigurationError;

/// Input deck variable holding the field kind.
pub const FIELD_KIND: &str = "Field1_kind";
/// Input deck variable holding the pulse full width at half maximum.
pub const FIELD_FWHM: &str = "Field1_FWHM";
/// Input deck variable holding the field direction.
pub const FIELD_DIR: &str = "Field1_Dir";

/// Number of FWHM widths after which a smooth pulse is considered over.
pub const SETTLING_WIDTHS: f64 = 6.0;

/// Temporal envelope of the applied field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldEnvelope {
    /// Delta-like kick, no settling time.
    Delta,
    /// Smooth pulse (QSSIN) with its width in femtoseconds, if set.
    SmoothPulse { fwhm_fs: Option<f64> },
}

impl FieldEnvelope {
    /// Time in femtoseconds the field needs before the response is free.
    pub fn settling_time(&self) -> Result<f64, ConfigurationError> {
        match *self {
            Self::Delta => Ok(0.0),
            Self::SmoothPulse { fwhm_fs: Some(fwhm) } if fwhm != 0.0 => Ok(SETTLING_WIDTHS * fwhm),
            Self::SmoothPulse { .. } => Err(ConfigurationError::MissingFieldWidth),
        }
    }
}

impl fmt::Display for FieldEnvelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delta => write!(f, "DELTA"),
            Self::SmoothPulse { fwhm_fs: Some(w) } => write!(f, "QSSIN (FWHM {w} fs)"),
            Self::SmoothPulse { fwhm_fs: None } => write!(f, "QSSIN (FWHM unset)"),
        }
    }
}

/// Cartesian polarization axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldAxis {
    X,
    Y,
    Z,
}

impl FieldAxis {
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::X => "pol-x",
            Self::Y => "pol-y",
            Self::Z => "pol-z",
        }
    }

    /// Axis of the first nonzero direction component.
    ///
    /// A field with no nonzero component falls back to `X`.
    pub fn from_direction(direction: [f64; 3]) -> Self {
        match direction.iter().position(|c| *c != 0.0) {
            Some(1) => Self::Y,
            Some(2) => Self::Z,
            _ => Self::X,
        }
    }
}

impl fmt::Display for FieldAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Applied field as read from the base input deck.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub envelope: FieldEnvelope,
    pub direction: [f64; 3],
}

impl Field {
    /// Read the field kind, width and direction from an input deck.
    pub fn from_deck(deck: &InputDeck) -> Result<Self, ConfigurationError> {
        let kind = deck
            .text(FIELD_KIND)
            .ok_or_else(|| ConfigurationError::MissingVariable(FIELD_KIND.to_string()))?;

        let envelope = match kind.trim().to_ascii_uppercase().as_str() {
            "DELTA" => FieldEnvelope::Delta,
            "QSSIN" => FieldEnvelope::SmoothPulse {
                fwhm_fs: deck.number(FIELD_FWHM).map(|(value, _)| value),
            },
            other => return Err(ConfigurationError::UnsupportedFieldKind(other.to_string())),
        };

        let direction = match deck.table(FIELD_DIR) {
            Some([x, y, z, ..]) => [*x, *y, *z],
            Some(_) | None => {
                return Err(ConfigurationError::MissingVariable(FIELD_DIR.to_string()));
            }
        };

        Ok(Self {
            envelope,
            direction,
        })
    }

    pub fn axis(&self) -> FieldAxis {
        FieldAxis::from_direction(self.direction)
    }
}

//! Run specifications and results.

use serde::{Deserialize, Serialize};

use super::field::FieldAxis;
use super::input_deck::InputDeck;
use super::time_step::TimeStep;

/// Time-resolved polarization, one row per Cartesian axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Polarization {
    axes: [Vec<f64>; 3],
}

impl Polarization {
    /// Build from three equally long axis rows.
    ///
    /// Returns `None` when the rows differ in length.
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Option<Self> {
        if x.len() != y.len() || y.len() != z.len() {
            return None;
        }
        Some(Self { axes: [x, y, z] })
    }

    /// Number of cached time samples.
    pub fn len(&self) -> usize {
        self.axes[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn component(&self, axis: FieldAxis) -> &[f64] {
        &self.axes[axis.index()]
    }

    pub fn axes(&self) -> &[Vec<f64>; 3] {
        &self.axes
    }

    /// `|P(t)|^2` at every cached sample.
    pub fn squared_magnitude(&self) -> Vec<f64> {
        let [x, y, z] = &self.axes;
        x.iter()
            .zip(y)
            .zip(z)
            .map(|((px, py), pz)| px * px + py * py + pz * pz)
            .collect()
    }

    /// Every element, axis by axis.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.axes.iter().flatten().copied()
    }

    /// Apply `f` to every element.
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        let [x, y, z] = &self.axes;
        let apply = |row: &Vec<f64>| -> Vec<f64> { row.iter().map(|v| f(*v)).collect() };
        Self {
            axes: [apply(x), apply(y), apply(z)],
        }
    }
}

/// Input for a single engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSpec {
    pub time_step: TimeStep,
    pub units: String,
    /// Deck derived from the base deck for this run.
    pub deck: InputDeck,
    /// Deterministic name shared by the deck file and the output directory.
    pub label: String,
}

impl RunSpec {
    /// Name a run from the overridden parameter, value and unit,
    /// e.g. `RTstep_00015as`.
    pub fn label_for(param: &str, time_step: TimeStep, units: &str) -> String {
        format!("{param}_{:05}{units}", time_step.attoseconds())
    }

    pub fn input_file_name(&self) -> String {
        format!("{}.in", self.label)
    }
}

/// Output of a single engine run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub time_step: TimeStep,
    pub polarization: Polarization,
    /// Carrier-number conservation diagnostic, one value per sample.
    /// Kept raw, so NaN and infinities survive into the report.
    #[serde(with = "non_finite")]
    pub carrier_ratio: Vec<f64>,
    /// Set by the validator; false until then.
    pub numerically_clean: bool,
    /// Why the run produced no usable output, if it did not.
    pub failure: Option<String>,
}

impl RunResult {
    /// Output loaded from the engine, not yet validated.
    pub fn loaded(time_step: TimeStep, polarization: Polarization, carrier_ratio: Vec<f64>) -> Self {
        Self {
            time_step,
            polarization,
            carrier_ratio,
            numerically_clean: false,
            failure: None,
        }
    }

    /// Placeholder for a run whose invocation or output parsing failed.
    pub fn failed(time_step: TimeStep, reason: impl Into<String>) -> Self {
        Self {
            time_step,
            polarization: Polarization::default(),
            carrier_ratio: Vec::new(),
            numerically_clean: false,
            failure: Some(reason.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

/// JSON has no NaN or infinity; those values are written as `"NaN"`,
/// `"inf"` and `"-inf"` strings.
mod non_finite {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(|&value| {
            if value.is_finite() {
                Repr::Number(value)
            } else {
                Repr::Text(value.to_string())
            }
        }))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        Vec::<Repr>::deserialize(deserializer)?
            .into_iter()
            .map(|repr| match repr {
                Repr::Number(value) => Ok(value),
                Repr::Text(text) => text
                    .parse()
                    .map_err(|_| D::Error::custom(format!("invalid float {text:?}"))),
            })
            .collect()
    }
}

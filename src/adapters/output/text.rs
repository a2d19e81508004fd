//! Plain-text run output reader.
//!
//! Reads the engine's column files from a run directory:
//!
//! - `o-<label>.polarization`: time, P_x, P_y, P_z
//! - `o-<label>.carriers`: time followed by carrier diagnostics; the ratio is
//!   taken from a configurable column (the last one by default)
//!
//! Lines starting with `#` are headers. Fortran overflow fields (`*****`)
//! are read as infinity so the validator flags them.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{Polarization, RunSpec};
use crate::domain::ports::{RunOutput, RunOutputReader};

/// Reader for the engine's plain-text observables.
#[derive(Debug, Clone, Default)]
pub struct TextOutputReader {
    carrier_ratio_column: Option<usize>,
}

impl TextOutputReader {
    pub fn new(carrier_ratio_column: Option<usize>) -> Self {
        Self {
            carrier_ratio_column,
        }
    }

    pub fn polarization_path(output_dir: &Path, label: &str) -> PathBuf {
        output_dir.join(format!("o-{label}.polarization"))
    }

    pub fn carriers_path(output_dir: &Path, label: &str) -> PathBuf {
        output_dir.join(format!("o-{label}.carriers"))
    }

    fn parse_field(token: &str) -> Option<f64> {
        if !token.is_empty() && token.chars().all(|c| c == '*') {
            return Some(f64::INFINITY);
        }
        token.parse().ok()
    }

    /// Numeric rows of a column file, headers skipped.
    fn parse_rows(path: &Path, content: &str) -> DomainResult<Vec<Vec<f64>>> {
        content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(|line| {
                line.split_whitespace()
                    .map(|token| {
                        Self::parse_field(token).ok_or_else(|| DomainError::OutputParse {
                            path: path.to_path_buf(),
                            reason: format!("invalid number '{token}'"),
                        })
                    })
                    .collect::<DomainResult<Vec<f64>>>()
            })
            .collect()
    }

    fn parse_polarization(path: &Path, content: &str) -> DomainResult<Polarization> {
        let rows = Self::parse_rows(path, content)?;
        let mut axes: [Vec<f64>; 3] = Default::default();
        for row in &rows {
            let [_, px, py, pz, ..] = row.as_slice() else {
                return Err(DomainError::OutputParse {
                    path: path.to_path_buf(),
                    reason: format!("expected at least 4 columns, found {}", row.len()),
                });
            };
            axes[0].push(*px);
            axes[1].push(*py);
            axes[2].push(*pz);
        }
        let [x, y, z] = axes;
        Polarization::new(x, y, z).ok_or_else(|| DomainError::OutputParse {
            path: path.to_path_buf(),
            reason: "polarization components differ in length".to_string(),
        })
    }

    fn parse_carrier_ratio(&self, path: &Path, content: &str) -> DomainResult<Vec<f64>> {
        let rows = Self::parse_rows(path, content)?;
        rows.iter()
            .map(|row| {
                let value = match self.carrier_ratio_column {
                    Some(column) => row.get(column),
                    None => row.last(),
                };
                value.copied().ok_or_else(|| DomainError::OutputParse {
                    path: path.to_path_buf(),
                    reason: format!("carrier ratio column missing in a {}-column row", row.len()),
                })
            })
            .collect()
    }

    async fn read_file(path: &Path) -> DomainResult<String> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| DomainError::io(path, e))
    }
}

#[async_trait]
impl RunOutputReader for TextOutputReader {
    async fn read(&self, spec: &RunSpec, output_dir: &Path) -> DomainResult<RunOutput> {
        let pol_path = Self::polarization_path(output_dir, &spec.label);
        let carriers_path = Self::carriers_path(output_dir, &spec.label);

        let polarization = Self::parse_polarization(&pol_path, &Self::read_file(&pol_path).await?)?;
        let carrier_ratio =
            self.parse_carrier_ratio(&carriers_path, &Self::read_file(&carriers_path).await?)?;

        tracing::debug!(
            label = %spec.label,
            samples = polarization.len(),
            carrier_samples = carrier_ratio.len(),
            "Run output parsed"
        );

        Ok(RunOutput {
            polarization,
            carrier_ratio,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{InputDeck, TimeStep};

    const POLARIZATION: &str = "\
# Time[fs]   Pol_x   Pol_y   Pol_z
 0.000  0.0  0.0  0.0
 0.300  1.0e-3  0.0  2.0e-3
 0.600  NaN  0.0  ******
";

    const CARRIERS: &str = "\
# Time[fs]  dN_e  dN_h  ratio
 0.000  0.0  0.0  0.0
 0.300  1.0  1.0  2.0e-5
 0.600  2.0  2.0  3.0e-5
";

    #[test]
    fn polarization_columns_map_to_axes() {
        let pol = TextOutputReader::parse_polarization(Path::new("p"), POLARIZATION).unwrap();
        assert_eq!(pol.len(), 3);
        assert_eq!(pol.axes()[0][1], 1.0e-3);
        assert!(pol.axes()[0][2].is_nan());
        assert!(pol.axes()[2][2].is_infinite());
    }

    #[test]
    fn carrier_ratio_defaults_to_last_column() {
        let reader = TextOutputReader::default();
        let ratio = reader.parse_carrier_ratio(Path::new("c"), CARRIERS).unwrap();
        assert_eq!(ratio, vec![0.0, 2.0e-5, 3.0e-5]);

        let reader = TextOutputReader::new(Some(1));
        let ratio = reader.parse_carrier_ratio(Path::new("c"), CARRIERS).unwrap();
        assert_eq!(ratio, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn short_rows_and_garbage_are_rejected() {
        assert!(TextOutputReader::parse_polarization(Path::new("p"), "0.0 1.0 2.0\n").is_err());
        assert!(TextOutputReader::parse_polarization(Path::new("p"), "0.0 a b c\n").is_err());
    }

    #[tokio::test]
    async fn reads_files_from_run_directory() {
        let dir = tempfile::tempdir().unwrap();
        let step = TimeStep::new(10).unwrap();
        let spec = RunSpec {
            time_step: step,
            units: "as".to_string(),
            deck: InputDeck::new(),
            label: RunSpec::label_for("RTstep", step, "as"),
        };
        tokio::fs::write(
            TextOutputReader::polarization_path(dir.path(), &spec.label),
            POLARIZATION,
        )
        .await
        .unwrap();
        tokio::fs::write(TextOutputReader::carriers_path(dir.path(), &spec.label), CARRIERS)
            .await
            .unwrap();

        let output = TextOutputReader::default().read(&spec, dir.path()).await.unwrap();
        assert_eq!(output.polarization.len(), 3);
        assert_eq!(output.carrier_ratio.len(), 3);
    }

    #[tokio::test]
    async fn missing_output_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let step = TimeStep::new(10).unwrap();
        let spec = RunSpec {
            time_step: step,
            units: "as".to_string(),
            deck: InputDeck::new(),
            label: "RTstep_00010as".to_string(),
        };
        let err = TextOutputReader::default().read(&spec, dir.path()).await.unwrap_err();
        assert!(matches!(err, DomainError::Io { .. }));
    }
}

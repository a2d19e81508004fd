//! Run output port - parses an engine output directory.

use std::path::Path;

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{Polarization, RunSpec};

/// Observables extracted from one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutput {
    pub polarization: Polarization,
    pub carrier_ratio: Vec<f64>,
}

/// Reads the polarization time series and the carrier-ratio diagnostic
/// produced by a run.
#[async_trait]
pub trait RunOutputReader: Send + Sync {
    async fn read(&self, spec: &RunSpec, output_dir: &Path) -> DomainResult<RunOutput>;
}

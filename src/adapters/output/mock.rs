//! Mock output reader for testing.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{RunSpec, TimeStep};
use crate::domain::ports::{RunOutput, RunOutputReader};

/// Output reader serving canned observables per time step.
///
/// Time steps without an entry fail as an unreadable output directory.
#[derive(Debug, Clone, Default)]
pub struct MockOutputReader {
    outputs: HashMap<TimeStep, RunOutput>,
}

impl MockOutputReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, time_step: TimeStep, output: RunOutput) -> Self {
        self.outputs.insert(time_step, output);
        self
    }
}

#[async_trait]
impl RunOutputReader for MockOutputReader {
    async fn read(&self, spec: &RunSpec, output_dir: &Path) -> DomainResult<RunOutput> {
        self.outputs
            .get(&spec.time_step)
            .cloned()
            .ok_or_else(|| DomainError::OutputParse {
                path: output_dir.to_path_buf(),
                reason: format!("no output for {}", spec.time_step),
            })
    }
}

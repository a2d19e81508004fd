//! Run driver.
//!
//! Owns the run directory and the base input deck, and turns a [`RunSpec`]
//! into a [`RunResult`] by writing its deck, submitting the engine through
//! the [`Scheduler`] port and parsing its output through the
//! [`RunOutputReader`] port.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{DeckValue, InputDeck, RunConfig, RunResult, RunSpec, TimeStep};
use crate::domain::ports::{shell_quote, RunOutputReader, Scheduler};

/// Dipole file whose presence marks the shared precomputation as done.
pub const DIPOLES_ARTIFACT: &str = "ndb.dipoles";

/// Deck variables copied from the base deck into the dipoles deck.
const DIPOLE_VARIABLES: [&str; 3] = ["DIP_ROLEs", "DIP_CPU", "DipBands"];

/// Whether the dipoles had to be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DipolesStatus {
    /// The artifact already existed; nothing was submitted.
    Found,
    /// The dipoles run was submitted.
    Computed,
}

/// Drives single engine runs inside the run directory.
pub struct RunDriver {
    scheduler: Arc<dyn Scheduler>,
    reader: Arc<dyn RunOutputReader>,
    base_deck: InputDeck,
    config: RunConfig,
}

impl RunDriver {
    pub fn new(
        scheduler: Arc<dyn Scheduler>,
        reader: Arc<dyn RunOutputReader>,
        base_deck: InputDeck,
        config: RunConfig,
    ) -> Self {
        Self {
            scheduler,
            reader,
            base_deck,
            config,
        }
    }

    pub fn run_path(&self) -> &Path {
        &self.config.run_path
    }

    pub fn base_deck(&self) -> &InputDeck {
        &self.base_deck
    }

    pub fn base_deck_mut(&mut self) -> &mut InputDeck {
        &mut self.base_deck
    }

    pub fn dipoles_artifact(&self) -> PathBuf {
        self.config
            .run_path
            .join(&self.config.dipoles_folder)
            .join(DIPOLES_ARTIFACT)
    }

    /// Create the run directory and link the engine database into it.
    pub async fn prepare_workspace(&self) -> DomainResult<()> {
        let run_path = &self.config.run_path;
        tokio::fs::create_dir_all(run_path)
            .await
            .map_err(|e| DomainError::io(run_path, e))?;

        let link = run_path.join("SAVE");
        if tokio::fs::symlink_metadata(&link).await.is_ok() {
            return Ok(());
        }

        let save = match tokio::fs::canonicalize(&self.config.save_path).await {
            Ok(save) => save,
            Err(e) => {
                tracing::warn!(
                    save = %self.config.save_path.display(),
                    error = %e,
                    "SAVE database not found, runs will rely on the engine to locate it"
                );
                return Ok(());
            }
        };

        link_database(&save, &link).await?;
        tracing::debug!(save = %save.display(), link = %link.display(), "Linked SAVE database");
        Ok(())
    }

    /// Compute the shared dipoles once.
    ///
    /// The `negf` argument makes the engine abort right after the dipoles are
    /// written, so the exit status is not checked. Only a submission failure
    /// is an error.
    pub async fn ensure_dipoles(&self) -> DomainResult<DipolesStatus> {
        let artifact = self.dipoles_artifact();
        if tokio::fs::try_exists(&artifact).await.unwrap_or(false) {
            tracing::info!(artifact = %artifact.display(), "Dipoles found");
            return Ok(DipolesStatus::Found);
        }

        let folder = &self.config.dipoles_folder;
        let mut deck = InputDeck::new();
        deck.push_argument("dipoles");
        deck.push_argument("negf");
        for name in DIPOLE_VARIABLES {
            if let Some(value) = self.base_deck.get(name) {
                deck.set(name, value.clone());
            }
        }
        deck.write(self.config.run_path.join("dipoles.in")).await?;

        tracing::info!(folder = %folder, "Running dipoles");
        let commands = vec![
            self.cd_command(),
            format!(
                "{} -F dipoles.in -J {folder} -C {folder} 2> {}",
                shell_quote(&self.config.engine),
                shell_quote(&format!("{folder}.log")),
                folder = shell_quote(folder),
            ),
        ];
        let status = self.scheduler.run(&commands).await?;
        tracing::debug!(status = %status, "Dipoles run finished");

        if !tokio::fs::try_exists(&artifact).await.unwrap_or(false) {
            tracing::warn!(
                artifact = %artifact.display(),
                status = %status,
                "Dipoles run finished without writing the dipole database"
            );
        }
        Ok(DipolesStatus::Computed)
    }

    /// Derive the run for one candidate from the base deck.
    pub fn input_to_run(&self, param: &str, time_step: TimeStep, units: &str) -> RunSpec {
        let mut deck = self.base_deck.clone();
        deck.set(
            param,
            DeckValue::quantity(f64::from(time_step.attoseconds()), units),
        );
        RunSpec {
            time_step,
            units: units.to_string(),
            deck,
            label: RunSpec::label_for(param, time_step, units),
        }
    }

    /// Run the candidate with the configured parameter name and units.
    pub fn candidate(&self, time_step: TimeStep) -> RunSpec {
        self.input_to_run(&self.config.parameter, time_step, &self.config.units)
    }

    /// Engine command line for one run.
    pub fn engine_command(&self, spec: &RunSpec) -> String {
        let label = &spec.label;
        let launcher = if self.config.cores > 1 {
            format!("{} -np {} ", self.config.mpi_launcher, self.config.cores)
        } else {
            String::new()
        };
        format!(
            "{launcher}{} -F {} -J {} -C {} 2> {}",
            shell_quote(&self.config.engine),
            shell_quote(&spec.input_file_name()),
            shell_quote(&format!("{label},{}", self.config.dipoles_folder)),
            shell_quote(label),
            shell_quote(&format!("{label}.log")),
        )
    }

    /// Write the deck, run the engine and load its output.
    pub async fn execute(&self, spec: &RunSpec) -> DomainResult<RunResult> {
        let deck_path = self.config.run_path.join(spec.input_file_name());
        spec.deck.write(&deck_path).await?;

        let commands = vec![self.cd_command(), self.engine_command(spec)];
        tracing::info!(
            time_step = %spec.time_step,
            label = %spec.label,
            "Running simulation"
        );
        let status = self.scheduler.run(&commands).await?;
        if !status.success() {
            return Err(DomainError::ExternalInvocation {
                label: spec.label.clone(),
                reason: status.to_string(),
            });
        }

        let output_dir = self.config.run_path.join(&spec.label);
        let output = self.reader.read(spec, &output_dir).await?;
        Ok(RunResult::loaded(
            spec.time_step,
            output.polarization,
            output.carrier_ratio,
        ))
    }

    fn cd_command(&self) -> String {
        format!(
            "cd {}",
            shell_quote(&self.config.run_path.to_string_lossy())
        )
    }
}

#[cfg(unix)]
async fn link_database(save: &Path, link: &Path) -> DomainResult<()> {
    tokio::fs::symlink(save, link)
        .await
        .map_err(|e| DomainError::io(link, e))
}

#[cfg(not(unix))]
async fn link_database(save: &Path, link: &Path) -> DomainResult<()> {
    tracing::warn!(
        save = %save.display(),
        link = %link.display(),
        "Symbolic links unsupported on this platform, SAVE not linked"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::output::MockOutputReader;
    use crate::adapters::scheduler::MockScheduler;
    use crate::domain::models::Polarization;
    use crate::domain::ports::RunOutput;
    use tempfile::TempDir;

    fn step(value: u32) -> TimeStep {
        TimeStep::new(value).unwrap()
    }

    fn config(dir: &TempDir) -> RunConfig {
        RunConfig {
            run_path: dir.path().join("run"),
            save_path: dir.path().join("SAVE"),
            ..RunConfig::default()
        }
    }

    fn base_deck() -> InputDeck {
        let mut deck = InputDeck::new();
        deck.push_argument("negf");
        deck.set("RTstep", DeckValue::quantity(10.0, "as"));
        deck.set("DIP_CPU", DeckValue::text("1 1 1"));
        deck
    }

    fn driver(
        dir: &TempDir,
        scheduler: Arc<MockScheduler>,
        reader: MockOutputReader,
    ) -> RunDriver {
        RunDriver::new(scheduler, Arc::new(reader), base_deck(), config(dir))
    }

    #[test]
    fn input_to_run_overrides_only_the_parameter() {
        let dir = TempDir::new().unwrap();
        let driver = driver(&dir, Arc::new(MockScheduler::new()), MockOutputReader::new());

        let spec = driver.input_to_run("RTstep", step(15), "as");
        assert_eq!(spec.label, "RTstep_00015as");
        assert_eq!(spec.deck.number("RTstep"), Some((15.0, Some("as"))));
        assert_eq!(spec.deck.text("DIP_CPU"), Some("1 1 1"));
        assert_eq!(driver.base_deck().number("RTstep"), Some((10.0, Some("as"))));
    }

    #[test]
    fn engine_command_uses_launcher_for_several_cores() {
        let dir = TempDir::new().unwrap();
        let mut cfg = config(&dir);
        cfg.cores = 4;
        let driver = RunDriver::new(
            Arc::new(MockScheduler::new()),
            Arc::new(MockOutputReader::new()),
            base_deck(),
            cfg,
        );
        let spec = driver.candidate(step(15));
        assert_eq!(
            driver.engine_command(&spec),
            "mpirun -np 4 yambo_rt -F RTstep_00015as.in -J RTstep_00015as,dipoles \
             -C RTstep_00015as 2> RTstep_00015as.log"
        );
    }

    #[tokio::test]
    async fn prepare_workspace_links_save() {
        let dir = TempDir::new().unwrap();
        tokio::fs::create_dir_all(dir.path().join("SAVE")).await.unwrap();
        let driver = driver(&dir, Arc::new(MockScheduler::new()), MockOutputReader::new());

        driver.prepare_workspace().await.unwrap();
        driver.prepare_workspace().await.unwrap();

        assert!(driver.run_path().is_dir());
        #[cfg(unix)]
        assert!(driver.run_path().join("SAVE").is_dir());
    }

    #[tokio::test]
    async fn ensure_dipoles_skips_scheduler_when_artifact_exists() {
        let dir = TempDir::new().unwrap();
        let scheduler = Arc::new(MockScheduler::new());
        let driver = driver(&dir, scheduler.clone(), MockOutputReader::new());

        let artifact = driver.dipoles_artifact();
        tokio::fs::create_dir_all(artifact.parent().unwrap()).await.unwrap();
        tokio::fs::write(&artifact, b"").await.unwrap();

        assert_eq!(driver.ensure_dipoles().await.unwrap(), DipolesStatus::Found);
        assert_eq!(scheduler.call_count().await, 0);
    }

    #[tokio::test]
    async fn ensure_dipoles_tolerates_abnormal_exit() {
        let dir = TempDir::new().unwrap();
        let scheduler = Arc::new(MockScheduler::with_exit_codes([134]));
        let driver = driver(&dir, scheduler.clone(), MockOutputReader::new());
        driver.prepare_workspace().await.unwrap();

        assert_eq!(driver.ensure_dipoles().await.unwrap(), DipolesStatus::Computed);

        let submissions = scheduler.submissions().await;
        assert_eq!(submissions.len(), 1);
        assert_eq!(
            submissions[0][1],
            "yambo_rt -F dipoles.in -J dipoles -C dipoles 2> dipoles.log"
        );

        let deck = InputDeck::read(driver.run_path().join("dipoles.in")).await.unwrap();
        assert_eq!(deck.arguments(), ["dipoles", "negf"]);
        assert_eq!(deck.text("DIP_CPU"), Some("1 1 1"));
        assert!(!deck.contains("RTstep"));
    }

    #[tokio::test]
    async fn ensure_dipoles_propagates_submission_failure() {
        let dir = TempDir::new().unwrap();
        let driver = driver(&dir, Arc::new(MockScheduler::unavailable()), MockOutputReader::new());
        driver.prepare_workspace().await.unwrap();

        assert!(matches!(
            driver.ensure_dipoles().await,
            Err(DomainError::ExternalInvocation { .. })
        ));
    }

    #[tokio::test]
    async fn execute_writes_deck_and_loads_output() {
        let dir = TempDir::new().unwrap();
        let scheduler = Arc::new(MockScheduler::new());
        let output = RunOutput {
            polarization: Polarization::new(vec![1.0], vec![2.0], vec![3.0]).unwrap(),
            carrier_ratio: vec![0.0],
        };
        let reader = MockOutputReader::new().with_output(step(20), output.clone());
        let driver = driver(&dir, scheduler.clone(), reader);
        driver.prepare_workspace().await.unwrap();

        let spec = driver.candidate(step(20));
        let result = driver.execute(&spec).await.unwrap();

        assert_eq!(result.polarization, output.polarization);
        assert!(!result.numerically_clean);
        assert!(driver.run_path().join("RTstep_00020as.in").is_file());

        let submissions = scheduler.submissions().await;
        assert_eq!(
            submissions[0][0],
            format!("cd {}", shell_quote(&driver.run_path().to_string_lossy()))
        );
    }

    #[test]
    fn commands_quote_paths_with_spaces() {
        let dir = TempDir::new().unwrap();
        let mut cfg = config(&dir);
        cfg.run_path = dir.path().join("my runs");
        cfg.engine = "/opt/yambo 5.2/yambo_rt".to_string();
        let driver = RunDriver::new(
            Arc::new(MockScheduler::new()),
            Arc::new(MockOutputReader::new()),
            base_deck(),
            cfg,
        );

        assert_eq!(
            driver.cd_command(),
            format!("cd '{}'", dir.path().join("my runs").display())
        );
        assert_eq!(
            driver.engine_command(&driver.candidate(step(15))),
            "'/opt/yambo 5.2/yambo_rt' -F RTstep_00015as.in -J RTstep_00015as,dipoles \
             -C RTstep_00015as 2> RTstep_00015as.log"
        );
    }

    #[tokio::test]
    async fn execute_reports_non_zero_exit() {
        let dir = TempDir::new().unwrap();
        let driver = driver(
            &dir,
            Arc::new(MockScheduler::with_exit_codes([1])),
            MockOutputReader::new(),
        );
        driver.prepare_workspace().await.unwrap();

        let err = driver.execute(&driver.candidate(step(20))).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::ExternalInvocation { ref label, .. } if label == "RTstep_00020as"
        ));
    }

    #[tokio::test]
    async fn execute_reports_unreadable_output() {
        let dir = TempDir::new().unwrap();
        let driver = driver(&dir, Arc::new(MockScheduler::new()), MockOutputReader::new());
        driver.prepare_workspace().await.unwrap();

        let err = driver.execute(&driver.candidate(step(20))).await.unwrap_err();
        assert!(matches!(err, DomainError::OutputParse { .. }));
    }
}

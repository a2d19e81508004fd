//! Shell scheduler.
//!
//! Runs the submitted commands in a single `sh -c` invocation on the local
//! host, chained with `&&` so a failed `cd` stops the run before the engine
//! starts in the wrong directory.

use async_trait::async_trait;
use tokio::process::Command;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{ExitStatus, Scheduler};

/// Scheduler that executes commands through a local shell.
pub struct ShellScheduler {
    /// The shell to execute (e.g. `"sh"`, `"bash"`).
    shell: String,
}

impl ShellScheduler {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    /// Join commands into one script.
    fn script(commands: &[String]) -> String {
        commands.join(" && ")
    }
}

impl Default for ShellScheduler {
    fn default() -> Self {
        Self::new("sh")
    }
}

#[async_trait]
impl Scheduler for ShellScheduler {
    fn name(&self) -> &'static str {
        "shell"
    }

    async fn run(&self, commands: &[String]) -> DomainResult<ExitStatus> {
        let script = Self::script(commands);
        tracing::debug!(scheduler = self.name(), script = %script, "Submitting commands");

        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(&script)
            .output()
            .await
            .map_err(|e| {
                tracing::error!(
                    scheduler = self.name(),
                    error = %e,
                    "Failed to spawn shell"
                );
                DomainError::ExternalInvocation {
                    label: script.clone(),
                    reason: format!("failed to spawn {}: {e}", self.shell),
                }
            })?;

        let status = ExitStatus {
            code: output.status.code(),
        };

        if !status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::warn!(
                scheduler = self.name(),
                status = %status,
                stderr = %stderr.trim(),
                "Commands exited abnormally"
            );
        }

        Ok(status)
    }
}

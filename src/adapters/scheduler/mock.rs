//! Mock scheduler for testing.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::{ExitStatus, Scheduler};

type RunHook = Box<dyn Fn(&[String]) + Send + Sync>;

/// Scheduler that records submissions instead of running them.
///
/// Exit statuses are taken from a script in submission order; once the
/// script is empty every submission succeeds. An optional hook runs on each
/// submission, e.g. to create the artifacts a real engine would write.
pub struct MockScheduler {
    submissions: Arc<Mutex<Vec<Vec<String>>>>,
    exit_codes: Arc<Mutex<VecDeque<Option<i32>>>>,
    hook: Option<RunHook>,
    fail_to_spawn: bool,
}

impl MockScheduler {
    pub fn new() -> Self {
        Self {
            submissions: Arc::new(Mutex::new(Vec::new())),
            exit_codes: Arc::new(Mutex::new(VecDeque::new())),
            hook: None,
            fail_to_spawn: false,
        }
    }

    /// Script the exit codes of successive submissions.
    pub fn with_exit_codes(codes: impl IntoIterator<Item = i32>) -> Self {
        Self {
            exit_codes: Arc::new(Mutex::new(codes.into_iter().map(Some).collect())),
            ..Self::new()
        }
    }

    /// Every submission fails before running.
    pub fn unavailable() -> Self {
        Self {
            fail_to_spawn: true,
            ..Self::new()
        }
    }

    /// Run `hook` on every submission.
    pub fn on_run(mut self, hook: impl Fn(&[String]) + Send + Sync + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    /// Number of submissions so far.
    pub async fn call_count(&self) -> usize {
        self.submissions.lock().await.len()
    }

    /// Every submitted command list, in order.
    pub async fn submissions(&self) -> Vec<Vec<String>> {
        self.submissions.lock().await.clone()
    }
}

impl Default for MockScheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Scheduler for MockScheduler {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn run(&self, commands: &[String]) -> DomainResult<ExitStatus> {
        self.submissions.lock().await.push(commands.to_vec());

        if self.fail_to_spawn {
            return Err(DomainError::ExternalInvocation {
                label: commands.join(" && "),
                reason: "mock scheduler unavailable".to_string(),
            });
        }

        if let Some(hook) = &self.hook {
            hook(commands);
        }

        let code = self.exit_codes.lock().await.pop_front().unwrap_or(Some(0));
        Ok(ExitStatus { code })
    }
}

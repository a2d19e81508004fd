//! Scheduler port - the only way the controller reaches external processes.

use std::borrow::Cow;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainResult;

/// Exit status of a submitted command list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitStatus {
    /// Process exit code; `None` when terminated by a signal.
    pub code: Option<i32>,
}

impl ExitStatus {
    pub const SUCCESS: Self = Self { code: Some(0) };

    pub const fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub const fn success(&self) -> bool {
        matches!(self.code, Some(0))
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "exit status {code}"),
            None => write!(f, "terminated by signal"),
        }
    }
}

/// Executes an ordered list of shell-level commands synchronously.
///
/// Commands run in order within one shell, so a leading `cd` applies to the
/// commands after it. The call returns once the last command has finished.
/// Timeouts, queueing and resource allocation are the scheduler's business.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Scheduler name for logging.
    fn name(&self) -> &'static str;

    /// Run the commands and report the final exit status.
    ///
    /// An `Err` means the commands could not be submitted at all.
    async fn run(&self, commands: &[String]) -> DomainResult<ExitStatus>;
}

/// Quote one word for a POSIX shell command line.
///
/// Words made only of characters the shell never interprets pass through
/// unchanged; anything else is wrapped in single quotes.
pub fn shell_quote(word: &str) -> Cow<'_, str> {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-.,/:=+@%".contains(c));
    if plain {
        Cow::Borrowed(word)
    } else {
        Cow::Owned(format!("'{}'", word.replace('\'', r"'\''")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_words_are_not_quoted() {
        assert_eq!(shell_quote("RTstep_00015as.in"), "RTstep_00015as.in");
        assert_eq!(shell_quote("/opt/yambo/bin/yambo_rt"), "/opt/yambo/bin/yambo_rt");
        assert_eq!(shell_quote("RTstep_00015as,dipoles"), "RTstep_00015as,dipoles");
    }

    #[test]
    fn special_words_are_single_quoted() {
        assert_eq!(shell_quote("/data/my runs"), "'/data/my runs'");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
        assert_eq!(shell_quote("$HOME"), "'$HOME'");
        assert_eq!(shell_quote(""), "''");
    }
}

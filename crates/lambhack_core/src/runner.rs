use std::collections::BTreeSet;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunnerError {
    #[error("command is empty")]
    InvalidCommand,

    #[error("failed to spawn '{program}': {message}")]
    Spawn { program: String, message: String },

    #[error("command exited with status {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },
}

/// Executes a command string and returns its output.
///
/// What "running" means is up to the implementation; the handler only relies
/// on string in, string or error out.
pub trait CommandRunner {
    fn run(&self, command: &str) -> Result<String, RunnerError>;
}

impl<F> CommandRunner for F
where
    F: Fn(&str) -> Result<String, RunnerError>,
{
    fn run(&self, command: &str) -> Result<String, RunnerError> {
        self(command)
    }
}

/// Decides which untrusted commands may reach the runner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CommandPolicy {
    #[default]
    Reject,
    AllowList(BTreeSet<String>),
    Unrestricted,
}

impl CommandPolicy {
    pub fn allow_list<I, S>(programs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::AllowList(programs.into_iter().map(Into::into).collect())
    }

    pub fn permits(&self, command: &str) -> bool {
        match self {
            Self::Reject => false,
            Self::Unrestricted => true,
            Self::AllowList(programs) => command
                .split_whitespace()
                .next()
                .map(|program| programs.contains(program))
                .unwrap_or(false),
        }
    }
}

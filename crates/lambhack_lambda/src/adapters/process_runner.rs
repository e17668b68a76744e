use std::path::PathBuf;
use std::process::Command;

use lambhack_core::runner::{CommandRunner, RunnerError};

/// Runs a command as a child process without a shell.
///
/// The command string is split on whitespace into a program and its
/// arguments. Quoting, pipes and redirection are not interpreted.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    working_dir: Option<PathBuf>,
}

impl ProcessRunner {
    pub fn with_working_dir(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: Some(working_dir.into()),
        }
    }
}

impl CommandRunner for ProcessRunner {
    fn run(&self, command: &str) -> Result<String, RunnerError> {
        let mut parts = command.split_whitespace();
        let Some(program) = parts.next() else {
            return Err(RunnerError::InvalidCommand);
        };

        let mut process = Command::new(program);
        process.args(parts);
        if let Some(dir) = &self.working_dir {
            process.current_dir(dir);
        }

        let output = process.output().map_err(|error| RunnerError::Spawn {
            program: program.to_string(),
            message: error.to_string(),
        })?;

        if !output.status.success() {
            return Err(RunnerError::NonZeroExit {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

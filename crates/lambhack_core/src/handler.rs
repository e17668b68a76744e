use serde_json::{json, Value};
use thiserror::Error;

use crate::contract::{GatewayRequest, LambhackResponse};
use crate::runner::{CommandPolicy, CommandRunner, RunnerError};

pub const HANDLER_LOG_MESSAGE: &str = "Lambhack structured log message";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerConfig {
    pub policy: CommandPolicy,
    /// Absorb rejections and runner failures and always answer with the
    /// welcome message.
    pub legacy_silent_errors: bool,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    #[error("command '{command}' is not permitted by the command policy")]
    CommandRejected { command: String },

    #[error("command '{command}' failed: {source}")]
    CommandFailed {
        command: String,
        #[source]
        source: RunnerError,
    },
}

pub trait HandlerLogger {
    fn info(&self, message: &str, details: Value);
}

pub fn handle_request(
    request: GatewayRequest,
    runner: &dyn CommandRunner,
    config: &HandlerConfig,
    logger: Option<&dyn HandlerLogger>,
) -> Result<LambhackResponse, HandlerError> {
    let command = request.command().to_string();

    if let Some(logger) = logger {
        logger.info(
            HANDLER_LOG_MESSAGE,
            json!({
                "command": command.clone(),
                "policy": policy_label(&config.policy),
            }),
        );
    }

    if let Err(error) = run_command(&command, runner, &config.policy) {
        if !config.legacy_silent_errors {
            return Err(error);
        }
    }

    Ok(LambhackResponse::welcome(&command, request))
}

fn run_command(
    command: &str,
    runner: &dyn CommandRunner,
    policy: &CommandPolicy,
) -> Result<(), HandlerError> {
    if command.trim().is_empty() {
        return Ok(());
    }

    if !policy.permits(command) {
        return Err(HandlerError::CommandRejected {
            command: command.to_string(),
        });
    }

    runner
        .run(command)
        .map(|_| ())
        .map_err(|source| HandlerError::CommandFailed {
            command: command.to_string(),
            source,
        })
}

fn policy_label(policy: &CommandPolicy) -> &'static str {
    match policy {
        CommandPolicy::Reject => "reject",
        CommandPolicy::AllowList(_) => "allowlist",
        CommandPolicy::Unrestricted => "unrestricted",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crate::contract::GREETING;

    use super::*;

    struct CapturingRunner {
        commands: Mutex<Vec<String>>,
        result: Result<String, RunnerError>,
    }

    impl CapturingRunner {
        fn succeeding(output: &str) -> Self {
            Self {
                commands: Mutex::new(Vec::new()),
                result: Ok(output.to_string()),
            }
        }

        fn failing(error: RunnerError) -> Self {
            Self {
                commands: Mutex::new(Vec::new()),
                result: Err(error),
            }
        }

        fn commands(&self) -> Vec<String> {
            self.commands.lock().expect("poisoned mutex").clone()
        }
    }

    impl CommandRunner for CapturingRunner {
        fn run(&self, command: &str) -> Result<String, RunnerError> {
            self.commands
                .lock()
                .expect("poisoned mutex")
                .push(command.to_string());
            self.result.clone()
        }
    }

    struct CapturingLogger {
        lines: Mutex<Vec<(String, Value)>>,
    }

    impl CapturingLogger {
        fn new() -> Self {
            Self {
                lines: Mutex::new(Vec::new()),
            }
        }
    }

    impl HandlerLogger for CapturingLogger {
        fn info(&self, message: &str, details: Value) {
            self.lines
                .lock()
                .expect("poisoned mutex")
                .push((message.to_string(), details));
        }
    }

    fn request_with_command(command: &str) -> GatewayRequest {
        GatewayRequest::new(json!({
            "method": "GET",
            "headers": {"Content-Type": "application/json"},
            "queryParams": {"command": command},
            "context": {"requestId": "req-1"}
        }))
    }

    fn unrestricted() -> HandlerConfig {
        HandlerConfig {
            policy: CommandPolicy::Unrestricted,
            legacy_silent_errors: false,
        }
    }

    fn legacy() -> HandlerConfig {
        HandlerConfig {
            policy: CommandPolicy::Unrestricted,
            legacy_silent_errors: true,
        }
    }

    #[test]
    fn missing_command_yields_bare_greeting_and_skips_runner() {
        let runner = CapturingRunner::succeeding("unused");
        let request = GatewayRequest::new(json!({"method": "GET", "queryParams": {}}));

        let response = handle_request(request.clone(), &runner, &HandlerConfig::default(), None)
            .expect("empty command should succeed under any policy");

        assert_eq!(response.message, GREETING);
        assert_eq!(response.request, request);
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn blank_command_skips_runner_under_every_policy() {
        let policies = [
            CommandPolicy::Reject,
            CommandPolicy::allow_list(["date"]),
            CommandPolicy::Unrestricted,
        ];

        for policy in policies {
            let runner = CapturingRunner::succeeding("unused");
            let config = HandlerConfig {
                policy,
                legacy_silent_errors: false,
            };

            let response = handle_request(request_with_command("   "), &runner, &config, None)
                .expect("blank command should succeed");

            assert_eq!(response.message, format!("{GREETING}   "));
            assert!(runner.commands().is_empty());
        }
    }

    #[test]
    fn appends_command_without_separator_and_echoes_request() {
        let runner = CapturingRunner::succeeding("Linux\n");
        let request = request_with_command("uname");

        let response = handle_request(request.clone(), &runner, &unrestricted(), None)
            .expect("permitted command should succeed");

        assert_eq!(response.message, "Welcome to lambhack!uname");
        assert_eq!(response.request, request);
        assert_eq!(runner.commands(), vec!["uname".to_string()]);
    }

    #[test]
    fn forwards_command_verbatim() {
        let runner = CapturingRunner::succeeding("");
        let raw = "echo  'a b' ; true";

        handle_request(request_with_command(raw), &runner, &unrestricted(), None)
            .expect("command should succeed");

        assert_eq!(runner.commands(), vec![raw.to_string()]);
    }

    #[test]
    fn default_policy_rejects_before_running() {
        let runner = CapturingRunner::succeeding("");

        let error = handle_request(
            request_with_command("cat /etc/passwd"),
            &runner,
            &HandlerConfig::default(),
            None,
        )
        .expect_err("default policy should reject");

        assert_eq!(
            error,
            HandlerError::CommandRejected {
                command: "cat /etc/passwd".to_string()
            }
        );
        assert!(runner.commands().is_empty());
    }

    #[test]
    fn allow_list_forwards_only_listed_programs() {
        let runner = CapturingRunner::succeeding("ok");
        let config = HandlerConfig {
            policy: CommandPolicy::allow_list(["date"]),
            legacy_silent_errors: false,
        };

        handle_request(request_with_command("date -u"), &runner, &config, None)
            .expect("listed program should run");
        handle_request(request_with_command("whoami"), &runner, &config, None)
            .expect_err("unlisted program should be rejected");

        assert_eq!(runner.commands(), vec!["date -u".to_string()]);
    }

    #[test]
    fn surfaces_runner_failures() {
        let runner = CapturingRunner::failing(RunnerError::NonZeroExit {
            code: Some(127),
            stderr: "not found".to_string(),
        });

        let error = handle_request(request_with_command("nope"), &runner, &unrestricted(), None)
            .expect_err("failing command should surface");

        assert!(matches!(error, HandlerError::CommandFailed { ref command, .. } if command == "nope"));
        assert!(error.to_string().contains("exited with status Some(127)"));
    }

    #[test]
    fn legacy_mode_never_returns_an_error() {
        let failing = CapturingRunner::failing(RunnerError::Spawn {
            program: "x".to_string(),
            message: "boom".to_string(),
        });
        let rejecting = HandlerConfig {
            policy: CommandPolicy::Reject,
            legacy_silent_errors: true,
        };

        for command in ["", "x", "x y z"] {
            let response = handle_request(request_with_command(command), &failing, &legacy(), None)
                .expect("legacy mode should absorb runner failures");
            assert_eq!(response.message, format!("{GREETING}{command}"));

            let response =
                handle_request(request_with_command(command), &failing, &rejecting, None)
                    .expect("legacy mode should absorb rejections");
            assert_eq!(response.message, format!("{GREETING}{command}"));
        }
    }

    #[test]
    fn logs_once_when_logger_is_injected() {
        let runner = CapturingRunner::succeeding("");
        let logger = CapturingLogger::new();

        handle_request(
            request_with_command("ls"),
            &runner,
            &unrestricted(),
            Some(&logger as &dyn HandlerLogger),
        )
        .expect("command should succeed");

        let lines = logger.lines.lock().expect("poisoned mutex").clone();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].0, HANDLER_LOG_MESSAGE);
        assert_eq!(lines[0].1["command"], "ls");
        assert_eq!(lines[0].1["policy"], "unrestricted");
    }
}

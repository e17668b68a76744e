pub use lambhack_core::contract::ALLOWED_ORIGIN_ENV;
use lambhack_core::handler::HandlerConfig;
use lambhack_core::runner::CommandPolicy;
use thiserror::Error;

pub const POLICY_ENV: &str = "LAMBHACK_COMMAND_POLICY";
pub const ALLOWED_COMMANDS_ENV: &str = "LAMBHACK_ALLOWED_COMMANDS";
pub const LEGACY_SILENT_ERRORS_ENV: &str = "LAMBHACK_LEGACY_SILENT_ERRORS";

const DEFAULT_ALLOWED_ORIGIN: &str = "*";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("LAMBHACK_COMMAND_POLICY must be one of reject, allowlist, unrestricted (got '{0}')")]
    InvalidPolicy(String),

    #[error("LAMBHACK_ALLOWED_COMMANDS must list at least one program when LAMBHACK_COMMAND_POLICY=allowlist")]
    EmptyAllowList,

    #[error("LAMBHACK_LEGACY_SILENT_ERRORS must be a boolean (got '{0}')")]
    InvalidFlag(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LambdaConfig {
    pub handler: HandlerConfig,
    pub allowed_origin: String,
}

impl Default for LambdaConfig {
    fn default() -> Self {
        Self {
            handler: HandlerConfig::default(),
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
        }
    }
}

impl LambdaConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let policy = match keyword(lookup(POLICY_ENV)).as_deref() {
            None | Some("reject") => CommandPolicy::Reject,
            Some("unrestricted") => CommandPolicy::Unrestricted,
            Some("allowlist") => {
                let programs = lookup(ALLOWED_COMMANDS_ENV).unwrap_or_default();
                let programs: Vec<&str> = programs
                    .split(',')
                    .map(str::trim)
                    .filter(|program| !program.is_empty())
                    .collect();
                if programs.is_empty() {
                    return Err(ConfigError::EmptyAllowList);
                }
                CommandPolicy::allow_list(programs)
            }
            Some(other) => return Err(ConfigError::InvalidPolicy(other.to_string())),
        };

        let legacy_silent_errors = match keyword(lookup(LEGACY_SILENT_ERRORS_ENV)).as_deref() {
            None | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(other) => return Err(ConfigError::InvalidFlag(other.to_string())),
        };

        let allowed_origin = allowed_origin(&lookup);

        Ok(Self {
            handler: HandlerConfig {
                policy,
                legacy_silent_errors,
            },
            allowed_origin,
        })
    }
}

/// CORS origin for responses. Resolved on its own so misconfiguration
/// responses still carry it when the rest of the config fails to load.
pub fn allowed_origin(lookup: impl Fn(&str) -> Option<String>) -> String {
    non_blank(lookup(ALLOWED_ORIGIN_ENV)).unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string())
}

pub fn allowed_origin_from_env() -> String {
    allowed_origin(|key| std::env::var(key).ok())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn keyword(value: Option<String>) -> Option<String> {
    non_blank(value).map(|value| value.to_ascii_lowercase())
}

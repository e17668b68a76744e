use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, StackError>;

#[derive(Error, Debug)]
pub enum StackError {
    #[error("failed to create S3 site from '{path}': {reason}")]
    SiteSource { path: PathBuf, reason: String },

    #[error("invalid API resource path '{0}': paths must start with '/'")]
    InvalidResourcePath(String),

    #[error("API resource '{0}' is already declared")]
    DuplicateResource(String),

    #[error("unsupported HTTP method '{0}'")]
    InvalidHttpMethod(String),

    #[error("method {method} is already declared on '{path}'")]
    DuplicateMethod { path: String, method: String },

    #[error("invalid HTTP status code {0}")]
    InvalidStatusCode(u16),

    #[error("stack '{0}' has not been provisioned")]
    NotProvisioned(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

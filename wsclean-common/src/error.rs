use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum WscleanError {
    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] Arc<serde_json::Error>),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Registry Error: {0}")]
    Registry(String),

    #[error("Executable not found: {0}")]
    ExecutableNotFound(String),

    #[error("Failed to execute command: {0}")]
    CommandExec(String),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Validation Error: {0}")]
    Validation(String),

    #[error("Resource Not Found: {0}")]
    NotFound(String),

    #[error("Generic Error: {0}")]
    Generic(String),
}

impl From<std::io::Error> for WscleanError {
    fn from(err: std::io::Error) -> Self {
        WscleanError::Io(Arc::new(err))
    }
}

impl From<serde_json::Error> for WscleanError {
    fn from(err: serde_json::Error) -> Self {
        WscleanError::Json(Arc::new(err))
    }
}

impl From<toml::de::Error> for WscleanError {
    fn from(err: toml::de::Error) -> Self {
        WscleanError::Config(err.to_string())
    }
}

impl WscleanError {
    /// True when the error represents caller-requested cancellation rather
    /// than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, WscleanError::Cancelled(_))
    }
}

pub type Result<T> = std::result::Result<T, WscleanError>;

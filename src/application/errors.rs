//! Application layer errors

use thiserror::Error;

/// General bot errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Plugin error: {0}")]
    Plugin(#[from] PluginError),

    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors raised by a single command or task invocation
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Upstream request failed: {0}")]
    Upstream(String),

    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Handler panicked: {0}")]
    Panicked(String),
}

/// Plugin discovery and construction errors
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Unable to read plugin directory {path}: {source}")]
    Directory {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid manifest {path}: {reason}")]
    Manifest { path: String, reason: String },

    #[error("Unknown plugin entry '{0}'")]
    UnknownEntry(String),

    #[error("Plugin '{name}' failed to initialize: {reason}")]
    Construction { name: String, reason: String },

    #[error("Invalid trigger '{pattern}': {reason}")]
    Trigger { pattern: String, reason: String },
}

/// Malformed task schedules
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("Invalid calendar expression '{expr}': {reason}")]
    Calendar { expr: String, reason: String },

    #[error("Invalid interval '{0}'")]
    Interval(String),

    #[error("Interval must be greater than zero")]
    ZeroInterval,
}

/// Transport errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication rejected: {0}")]
    Auth(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Transport closed")]
    Closed,
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Network(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for TransportError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        TransportError::WebSocket(err.to_string())
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for CommandError {
    fn from(err: reqwest::Error) -> Self {
        CommandError::Upstream(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PluginError::UnknownEntry("nope".to_string());
        assert_eq!(err.to_string(), "Unknown plugin entry 'nope'");

        let err: BotError = ScheduleError::ZeroInterval.into();
        assert_eq!(
            err.to_string(),
            "Schedule error: Interval must be greater than zero"
        );
    }
}

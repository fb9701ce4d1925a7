//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// The registry was asked for a logger before `initialize` ran
    #[error("Logger not initialized: call initialize() before get_logger()")]
    Uninitialized,

    /// A logger was built outside of a tokio runtime
    #[error("No tokio runtime available: {0}")]
    NoRuntime(String),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// A single transport failed
    #[error("Transport '{transport}' failed during {operation}: {message}")]
    Transport {
        transport: String,
        operation: String,
        message: String,
    },

    /// One or more transports failed during a fan-out operation
    #[error("{} transport operation(s) failed during {operation}", .errors.len())]
    TransportsFailed {
        operation: String,
        errors: Vec<LoggerError>,
    },

    /// The `log` facade is already owned by another logger
    #[error("Console bridge installation failed: {0}")]
    ConsoleBridge(String),

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl LoggerError {
    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(
        transport: impl Into<String>,
        operation: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        LoggerError::Transport {
            transport: transport.into(),
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Flatten this error into its individual failures.
    ///
    /// Aggregates are unpacked; any other error is returned as a single item.
    pub fn into_failures(self) -> Vec<LoggerError> {
        match self {
            LoggerError::TransportsFailed { errors, .. } => errors,
            other => vec![other],
        }
    }

    /// Turn a list of collected failures into a result for `operation`.
    pub(crate) fn aggregate(operation: &str, errors: Vec<LoggerError>) -> Result<()> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(LoggerError::TransportsFailed {
                operation: operation.to_string(),
                errors,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::config("batch", "size must be positive");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::transport("memory", "write", "boom");
        assert!(matches!(err, LoggerError::Transport { .. }));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            LoggerError::Uninitialized.to_string(),
            "Logger not initialized: call initialize() before get_logger()"
        );

        let err = LoggerError::transport("file", "flush", "disk full");
        assert_eq!(
            err.to_string(),
            "Transport 'file' failed during flush: disk full"
        );

        let err = LoggerError::TransportsFailed {
            operation: "write".to_string(),
            errors: vec![LoggerError::other("a"), LoggerError::other("b")],
        };
        assert_eq!(err.to_string(), "2 transport operation(s) failed during write");
    }

    #[test]
    fn test_aggregate_and_flatten() {
        assert!(LoggerError::aggregate("flush", Vec::new()).is_ok());

        let err = LoggerError::aggregate("flush", vec![LoggerError::other("x")]).unwrap_err();
        let failures = err.into_failures();
        assert_eq!(failures.len(), 1);

        let single = LoggerError::Uninitialized.into_failures();
        assert!(matches!(single[0], LoggerError::Uninitialized));
    }
}

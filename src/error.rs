//! Error types for dummymore

use thiserror::Error;

/// Errors that can occur while intercepting and logging messages
#[derive(Debug, Error)]
pub enum InterceptError {
    /// Transport could not be created or opened
    ///
    /// Fatal: a pipeline whose transport failed to initialize must not
    /// report itself ready.
    #[error("Failed to initialize {transport} transport: {reason}")]
    Initialization {
        transport: String,
        reason: String,
    },

    /// A single record could not be delivered
    ///
    /// Non-fatal: the suppression verdict never depends on it.
    #[error("Failed to deliver record via {transport}: {reason}")]
    Delivery {
        transport: String,
        reason: String,
    },

    /// Event rejected before any record was built
    #[error("Malformed message event: {0}")]
    MalformedEvent(String),

    /// A record line could not be parsed back into its parts
    #[error("Malformed log record: {0}")]
    MalformedRecord(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl InterceptError {
    /// Whether this error must abort plugin activation
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Initialization { .. })
    }

    pub(crate) fn init(transport: &str, reason: impl Into<String>) -> Self {
        Self::Initialization {
            transport: transport.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn delivery(transport: &str, reason: impl Into<String>) -> Self {
        Self::Delivery {
            transport: transport.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for interception operations
pub type Result<T> = std::result::Result<T, InterceptError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_initialization_is_fatal() {
        assert!(InterceptError::init("pipe", "mkfifo failed").is_fatal());
        assert!(!InterceptError::delivery("pipe", "broken pipe").is_fatal());
        assert!(!InterceptError::MalformedEvent("nul byte".into()).is_fatal());
        assert!(!InterceptError::Config("bad json".into()).is_fatal());
    }

    #[test]
    fn test_error_messages_name_the_transport() {
        let err = InterceptError::delivery("socket", "connection refused");
        assert_eq!(
            err.to_string(),
            "Failed to deliver record via socket: connection refused"
        );
    }
}

use std::time::Duration;
use thiserror::Error;

use crate::transport::TransportError;

/// Item-level failures of the bridge pipeline
///
/// Any of these aborts the current item. Whether the run continues is the
/// host's continue-on-fail decision, made in the pipeline runner.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("binary property '{property}' not found on item {item}")]
    AttachmentNotFound { property: String, item: usize },

    #[error("execution timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("remote execution {execution_id} ended with status '{status}'")]
    RemoteFailure {
        execution_id: String,
        status: String,
    },

    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("host error: {0}")]
    Host(String),
}

impl BridgeError {
    pub fn invalid_parameter(name: impl Into<String>, reason: impl Into<String>) -> Self {
        BridgeError::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Short machine-readable code, used in logs
    pub fn code(&self) -> &'static str {
        match self {
            BridgeError::Transport(_) => "TRANSPORT",
            BridgeError::AttachmentNotFound { .. } => "ATTACHMENT_NOT_FOUND",
            BridgeError::Timeout { .. } => "TIMEOUT",
            BridgeError::RemoteFailure { .. } => "REMOTE_FAILURE",
            BridgeError::InvalidParameter { .. } => "INVALID_PARAMETER",
            BridgeError::Host(_) => "HOST",
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message_carries_duration() {
        let err = BridgeError::Timeout {
            timeout: Duration::from_secs(2),
        };
        assert_eq!(err.to_string(), "execution timed out after 2s");
        assert_eq!(err.code(), "TIMEOUT");
    }

    #[test]
    fn test_transport_is_transparent() {
        let err: BridgeError = TransportError::Status {
            status: 500,
            body: "Internal Server Error".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "HTTP 500: Internal Server Error");
    }
}

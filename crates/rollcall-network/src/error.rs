use thiserror::Error;

/// Errors returned by an attendance backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// Lookup did not return a user for the card.
    #[error("User not found")]
    NotFound,

    /// Toggle answered 2xx but reported `success != true`.
    #[error("Request rejected: {}", message.as_deref().unwrap_or("no message"))]
    Rejected { message: Option<String> },

    /// Non-2xx status where a user-facing message is not available.
    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    /// The request did not complete within its timeout.
    #[error("Request timed out")]
    Timeout,

    /// Backend unreachable (refused, DNS, reset).
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Response body was not the expected JSON.
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Any other client failure.
    #[error("Request failed: {0}")]
    Other(String),
}

impl BackendError {
    pub fn rejected(message: Option<impl Into<String>>) -> Self {
        Self::Rejected {
            message: message.map(Into::into),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        // Timeout first: a connect timeout is also a connect error.
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::Connection(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Other(err.to_string())
        }
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Result type alias for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display() {
        let err = BackendError::rejected(Some("User already signed in"));
        assert_eq!(err.to_string(), "Request rejected: User already signed in");

        let err = BackendError::rejected(None::<String>);
        assert_eq!(err.to_string(), "Request rejected: no message");
    }

    #[test]
    fn test_json_error_is_decode() {
        let err: BackendError = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, BackendError::Decode(_)));
    }
}

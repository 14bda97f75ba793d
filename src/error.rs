//! Error types shared by the API layer, the session and the screens

use thiserror::Error;

/// Message shown when neither the server nor the caller supplies one
pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Errors surfaced by Captain operations
#[derive(Debug, Error)]
pub enum CaptainError {
    /// Input rejected before any request was made
    #[error("{0}")]
    Validation(String),

    /// The backend answered with a non-success status
    #[error("{}", .message.as_deref().unwrap_or(GENERIC_ERROR_MESSAGE))]
    Api {
        /// HTTP status code
        status: u16,
        /// Server-provided message, if the body carried one
        message: Option<String>,
    },

    /// The request never produced a response (connect, timeout, TLS)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body did not match the expected shape
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The persisted session store failed
    #[error("storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl CaptainError {
    /// Build a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Build an API error carrying a server message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: Some(message.into()),
        }
    }

    /// Text to show the captain.
    ///
    /// Validation errors and server messages are shown verbatim; everything
    /// else collapses to the operation's own fallback text.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Api {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Whether the backend rejected our credentials
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }
}

/// Result alias for Captain operations
pub type Result<T> = std::result::Result<T, CaptainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_wins() {
        let err = CaptainError::api(409, "Trip already taken");
        assert_eq!(err.user_message("Failed to accept trip"), "Trip already taken");
        assert_eq!(err.to_string(), "Trip already taken");
    }

    #[test]
    fn test_fallback_without_message() {
        let err = CaptainError::Api {
            status: 500,
            message: None,
        };
        assert_eq!(err.user_message("Invalid OTP"), "Invalid OTP");
        assert_eq!(err.to_string(), GENERIC_ERROR_MESSAGE);
    }

    #[test]
    fn test_blank_message_falls_back() {
        let err = CaptainError::api(400, "  ");
        assert_eq!(err.user_message("Failed to reject trip"), "Failed to reject trip");
    }

    #[test]
    fn test_storage_uses_fallback() {
        let err = CaptainError::from(anyhow::anyhow!("disk full"));
        assert_eq!(err.user_message("Login failed"), "Login failed");
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_unauthorized() {
        assert!(CaptainError::api(401, "expired").is_unauthorized());
        assert!(!CaptainError::validation("nope").is_unauthorized());
    }
}

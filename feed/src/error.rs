//! Error types for the feed client
//!
//! Every failure a service call can produce is a `FeedError`. The synchronizer
//! only cares about one distinction: `Unauthenticated` (the session must be
//! re-established) versus everything else (show a message, keep the feed).
//! `SessionError` covers reading and writing the persisted session store.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Unauthenticated - missing or rejected credentials")]
    Unauthenticated,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Rate limited")]
    RateLimited,

    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

/// Session store errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid session data: {0}")]
    Parse(#[from] serde_json::Error),
}

impl FeedError {
    pub fn is_unauthenticated(&self) -> bool {
        matches!(self, FeedError::Unauthenticated)
    }

    /// Message suitable for showing next to the feed
    pub fn user_message(&self) -> String {
        match self {
            FeedError::Unauthenticated => "Please log in to continue".to_string(),
            FeedError::Request(e) if e.is_timeout() => "The server took too long to respond".to_string(),
            FeedError::Request(_) => "Could not reach the server".to_string(),
            FeedError::Api { message, .. } if !message.is_empty() => message.clone(),
            FeedError::Api { status, .. } => format!("Server returned an error ({})", status),
            FeedError::RateLimited => "Too many requests, try again shortly".to_string(),
            FeedError::Deserialization(_) => "Received an unexpected response".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthenticated_is_distinct() {
        assert!(FeedError::Unauthenticated.is_unauthenticated());
        assert!(!FeedError::RateLimited.is_unauthenticated());
        assert!(!FeedError::Api {
            status: 500,
            message: String::new()
        }
        .is_unauthenticated());
    }

    #[test]
    fn test_user_message_prefers_server_message() {
        let err = FeedError::Api {
            status: 403,
            message: "Unauthorized to delete this post".to_string(),
        };
        assert_eq!(err.user_message(), "Unauthorized to delete this post");
    }

    #[test]
    fn test_user_message_falls_back_to_status() {
        let err = FeedError::Api {
            status: 502,
            message: String::new(),
        };
        assert_eq!(err.user_message(), "Server returned an error (502)");
    }
}

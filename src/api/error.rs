//! API Error Types
//!
//! Normalizes the backend's failure shapes (transport errors, non-2xx
//! statuses with an optional `message`, and `success: false` bodies) into
//! one error type the views can render.

use thiserror::Error;

/// Errors returned by the scheduler backend client
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// The configured request timeout elapsed
    #[error("Request timeout")]
    Timeout,

    /// Non-2xx status, with the server's message when it sent one
    #[error("API error {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Server { status: u16, message: Option<String> },

    /// 2xx response whose body reported `success: false`
    #[error("Request rejected: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { message: Option<String> },

    /// The response body did not have the expected shape
    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Message supplied by the server, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Server { message, .. } | ApiError::Rejected { message } => {
                message.as_deref().filter(|m| !m.is_empty())
            }
            _ => None,
        }
    }

    /// Server message verbatim, or `fallback` when the server gave none
    pub fn message_or(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }

    /// True when the request was answered by the server
    pub fn is_server_response(&self) -> bool {
        matches!(self, ApiError::Server { .. } | ApiError::Rejected { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

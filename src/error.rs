//! Error types for the Syntexa CLI

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for Syntexa operations
pub type Result<T> = std::result::Result<T, Error>;

/// Message shown when a request loses the race against the client timeout
pub const TIMEOUT_MESSAGE: &str = "Request timed out. Please try again.";

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

/// Errors talking to the remote API.
///
/// Every variant renders as a single human-readable line; callers never see
/// the underlying transport error.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request did not settle before the client-side timer fired
    #[error("{}", TIMEOUT_MESSAGE)]
    Timeout,

    /// The server answered with a 4xx/5xx status
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// A `404`; carries the same message a rejection would
    #[error("{0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// No valid session is available for an authenticated call
    #[error("You are not logged in or your session has expired. Run `syntexa login` to sign in.")]
    Unauthenticated,
}

impl ApiError {
    /// Build a rejection from a non-success response.
    ///
    /// The message is the server's structured `message` field when the body is
    /// a JSON object carrying one, otherwise the generic HTTP status message.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));

        if status == StatusCode::NOT_FOUND {
            return ApiError::NotFound(message);
        }

        ApiError::Rejected {
            status: status.as_u16(),
            message,
        }
    }

    /// HTTP status of a server rejection, if this is one
    #[cfg(test)]
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            ApiError::NotFound(_) => Some(404),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to API".to_string())
        } else if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Errors from the persisted session record.
///
/// `Malformed` is handled inside the session manager (the session is treated
/// as absent) and is never shown to the user.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Stored session is malformed: {0}")]
    Malformed(String),

    #[error("Session storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::Storage(err.to_string())
    }
}

/// Response cache errors
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Could not determine cache directory")]
    NoHome,

    #[error("Cache I/O error: {0}")]
    Io(String),

    #[error("Cache database error: {0}")]
    Database(#[from] rusqlite::Error),
}

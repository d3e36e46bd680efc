//! Error types for gloss-stream

use thiserror::Error;

/// Result type alias using gloss-stream Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the backend
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed before a response arrived
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend returned a non-success status
    #[error("Backend error: HTTP {code}: {message}")]
    Status { code: u16, message: String },

    /// Response arrived without a readable body
    #[error("Backend returned an empty response body")]
    EmptyBody,

    /// The response body failed mid-read
    #[error("Stream error: {0}")]
    Transport(String),
}

impl Error {
    /// Human-readable message suitable for surfacing in the UI status line.
    pub fn user_message(&self) -> String {
        match self {
            Error::Http(e) => format!("Could not reach the backend: {e}"),
            Error::Json(e) => format!("Malformed backend response: {e}"),
            Error::Status { code, message } => {
                if message.is_empty() {
                    format!("Backend request failed (HTTP {code})")
                } else {
                    format!("Backend request failed (HTTP {code}): {message}")
                }
            }
            Error::EmptyBody => "Backend returned no response body".to_string(),
            Error::Transport(msg) => format!("Connection lost: {msg}"),
        }
    }
}

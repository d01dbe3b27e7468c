//! Request failure taxonomy

use thiserror::Error;

/// Why a backend call produced no usable body
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("{0}")]
    Transport(String),
    #[error("HTTP {code}: {message}")]
    Status { code: u16, message: String },
    #[error("invalid response body: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        let msg = if e.is_timeout() {
            format!("Request timed out: {}", e)
        } else if e.is_connect() {
            format!("Connection failed: {}", e)
        } else {
            format!("Request failed: {}", e)
        };
        FetchError::Transport(msg)
    }
}

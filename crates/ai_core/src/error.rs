//! Inference errors

use thiserror::Error;

/// Errors that can occur while talking to the generative API
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Failed to connect to the API
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request could not be sent or its body could not be read
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Request exceeded the configured timeout
    #[error("Inference request timed out")]
    Timeout,

    /// Non-success status from the API
    #[error("Server error: {0}")]
    ServerError(String),

    /// Response parsing failed or carried no usable text
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// File upload did not complete
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    /// Uploaded file never left the processing state
    #[error("File {name} not ready after {attempts} checks")]
    AssetNotReady { name: String, attempts: u32 },
}

impl From<reqwest::Error> for InferenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}

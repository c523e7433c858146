//! Port definitions for generative engines
//!
//! Defines the request/response types and the trait that generative
//! adapters implement.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::InferenceError;

/// One part of a user turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text
    Text(String),
    /// Reference to a previously uploaded file
    File { mime_type: String, uri: String },
}

/// Request for a single-turn generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Parts of the user turn, in order
    pub parts: Vec<ContentPart>,
    /// Enable the URL-context and web-search tools
    #[serde(default)]
    pub grounded: bool,
}

impl GenerateRequest {
    /// Create a text-only request
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            parts: vec![ContentPart::Text(prompt.into())],
            grounded: false,
        }
    }

    /// Create a request that references an uploaded file followed by a prompt
    pub fn with_file(file: &RemoteFile, prompt: impl Into<String>) -> Self {
        Self {
            parts: vec![
                ContentPart::File {
                    mime_type: file.mime_type.clone(),
                    uri: file.uri.clone(),
                },
                ContentPart::Text(prompt.into()),
            ],
            grounded: false,
        }
    }

    /// Enable URL-context and web-search grounding
    #[must_use]
    pub const fn grounded(mut self) -> Self {
        self.grounded = true;
        self
    }
}

/// Response from a generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Text parts of the first candidate, in order
    pub texts: Vec<String>,
    /// Model that produced the response
    pub model: String,
    /// Token usage statistics
    pub usage: Option<TokenUsage>,
    /// Finish reason of the first candidate
    pub finish_reason: Option<String>,
}

impl GenerateResponse {
    /// All text parts concatenated
    pub fn joined_text(&self) -> String {
        self.texts.concat()
    }

    /// The first text part
    pub fn first_text(&self) -> Option<&str> {
        self.texts.first().map(String::as_str)
    }
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Processing state of an uploaded file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileState {
    #[default]
    StateUnspecified,
    Processing,
    Active,
    Failed,
    /// A state this client does not know yet
    #[serde(other)]
    Unknown,
}

/// A file held by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFile {
    /// Resource name, e.g. `files/abc123`
    pub name: String,
    /// URI used to reference the file in a generation
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub state: FileState,
}

/// Port for generative engine implementations
#[async_trait]
pub trait GenerativeEngine: Send + Sync {
    /// Generate a complete response
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, InferenceError>;

    /// Upload a file and return its remote handle
    async fn upload_file(
        &self,
        data: Vec<u8>,
        mime_type: &str,
        display_name: &str,
    ) -> Result<RemoteFile, InferenceError>;

    /// Wait until an uploaded file can be referenced in a generation
    async fn wait_until_active(&self, file: RemoteFile) -> Result<RemoteFile, InferenceError>;

    /// Delete an uploaded file
    async fn delete_file(&self, name: &str) -> Result<(), InferenceError>;

    /// Get the configured model
    fn model(&self) -> &str;
}

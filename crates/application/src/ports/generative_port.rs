//! Generative port - Interface for the AI model
//!
//! Two modes: plain text generation (optionally with search tooling) and
//! asset generation, where a file is uploaded first and referenced by the
//! prompt. Uploaded assets are owned by the caller, which must delete them.

use std::path::Path;

#[cfg(test)]
use mockall::automock;

use async_trait::async_trait;
use domain::TextIntent;
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// Text produced by the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedReply {
    /// Reply text
    pub text: String,
    /// Model that produced the reply
    pub model: String,
}

impl GeneratedReply {
    pub fn new(text: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: model.into(),
        }
    }
}

/// Handle for a file staged with the model provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedAsset {
    /// Provider resource name, used to delete the asset
    pub name: String,
    /// URI referenced from a prompt
    pub uri: String,
    pub mime_type: String,
}

/// Port for generative model operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GenerativePort: Send + Sync {
    /// Generate a reply to a text message
    ///
    /// [`TextIntent::Search`] enables web search and URL context tooling.
    async fn generate_text(
        &self,
        prompt: &str,
        intent: TextIntent,
    ) -> Result<GeneratedReply, ApplicationError>;

    /// Upload a file and wait until it can be referenced
    async fn upload_asset(
        &self,
        path: &Path,
        mime_type: &str,
        display_name: &str,
    ) -> Result<UploadedAsset, ApplicationError>;

    /// Generate a reply about an uploaded asset
    ///
    /// The reply is the first text segment of the response.
    async fn generate_with_asset(
        &self,
        asset: &UploadedAsset,
        prompt: &str,
    ) -> Result<GeneratedReply, ApplicationError>;

    /// Delete an uploaded asset
    async fn delete_asset(&self, asset: &UploadedAsset) -> Result<(), ApplicationError>;
}

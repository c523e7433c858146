//! Gemini generative adapter - Implements GenerativePort using ai_core

use std::{path::Path, sync::Arc};

use ai_core::{
    ContentPart, GeminiClient, GeminiConfig, GenerateRequest, GenerativeEngine, InferenceError,
};
use application::{
    error::ApplicationError,
    ports::{GeneratedReply, GenerativePort, UploadedAsset},
};
use async_trait::async_trait;
use domain::TextIntent;
use tracing::{debug, instrument, warn};

/// Adapter for the Gemini API
pub struct GeminiGenerativeAdapter {
    engine: Arc<dyn GenerativeEngine>,
}

impl std::fmt::Debug for GeminiGenerativeAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiGenerativeAdapter")
            .field("model", &self.engine.model())
            .finish()
    }
}

impl GeminiGenerativeAdapter {
    /// Create a new adapter with the given configuration
    pub fn new(config: GeminiConfig) -> Result<Self, ApplicationError> {
        let client = GeminiClient::new(config).map_err(Self::map_error)?;
        Ok(Self::with_engine(Arc::new(client)))
    }

    /// Use any generative engine
    pub fn with_engine(engine: Arc<dyn GenerativeEngine>) -> Self {
        Self { engine }
    }

    fn map_error(e: InferenceError) -> ApplicationError {
        ApplicationError::Inference(e.to_string())
    }
}

#[async_trait]
impl GenerativePort for GeminiGenerativeAdapter {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    async fn generate_text(
        &self,
        prompt: &str,
        intent: TextIntent,
    ) -> Result<GeneratedReply, ApplicationError> {
        let mut request = GenerateRequest::text(prompt);
        if intent.uses_tools() {
            request = request.grounded();
        }

        let response = self
            .engine
            .generate(request)
            .await
            .map_err(Self::map_error)?;

        debug!(
            model = %response.model,
            parts = response.texts.len(),
            "Text generation complete"
        );

        Ok(GeneratedReply::new(response.joined_text(), response.model))
    }

    #[instrument(skip(self, path), fields(path = %path.display()))]
    async fn upload_asset(
        &self,
        path: &Path,
        mime_type: &str,
        display_name: &str,
    ) -> Result<UploadedAsset, ApplicationError> {
        let data = tokio::fs::read(path).await.map_err(|e| {
            ApplicationError::Workspace(format!("Failed to read {}: {e}", path.display()))
        })?;

        let uploaded = self
            .engine
            .upload_file(data, mime_type, display_name)
            .await
            .map_err(Self::map_error)?;
        let name = uploaded.name.clone();

        let file = match self.engine.wait_until_active(uploaded).await {
            Ok(file) => file,
            Err(e) => {
                // Never handed to the caller, so it is released here
                if let Err(delete_err) = self.engine.delete_file(&name).await {
                    warn!(asset = %name, error = %delete_err, "Failed to delete unusable asset");
                }
                return Err(Self::map_error(e));
            },
        };

        debug!(asset = %file.name, "Asset ready");

        Ok(UploadedAsset {
            mime_type: if file.mime_type.is_empty() {
                mime_type.to_string()
            } else {
                file.mime_type
            },
            name: file.name,
            uri: file.uri,
        })
    }

    #[instrument(skip(self, asset, prompt), fields(asset = %asset.name))]
    async fn generate_with_asset(
        &self,
        asset: &UploadedAsset,
        prompt: &str,
    ) -> Result<GeneratedReply, ApplicationError> {
        let request = GenerateRequest {
            parts: vec![
                ContentPart::File {
                    mime_type: asset.mime_type.clone(),
                    uri: asset.uri.clone(),
                },
                ContentPart::Text(prompt.to_string()),
            ],
            grounded: false,
        };

        let response = self
            .engine
            .generate(request)
            .await
            .map_err(Self::map_error)?;

        let text = response
            .first_text()
            .ok_or_else(|| ApplicationError::Inference("Empty response".to_string()))?
            .to_string();

        Ok(GeneratedReply::new(text, response.model))
    }

    #[instrument(skip(self, asset), fields(asset = %asset.name))]
    async fn delete_asset(&self, asset: &UploadedAsset) -> Result<(), ApplicationError> {
        self.engine
            .delete_file(&asset.name)
            .await
            .map_err(Self::map_error)
    }
}

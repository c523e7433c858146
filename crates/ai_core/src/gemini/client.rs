//! Gemini REST client implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, info, instrument, warn};

use super::types::{
    GenerateContentRequest, GenerateContentResponse, UploadFileMetadata, UploadResponse,
    UploadStartRequest,
};
use crate::config::GeminiConfig;
use crate::error::InferenceError;
use crate::ports::{FileState, GenerateRequest, GenerateResponse, GenerativeEngine, RemoteFile};

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";

/// Gemini engine using the Generative Language REST API
pub struct GeminiClient {
    client: Client,
    config: GeminiConfig,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(config: GeminiConfig) -> Result<Self, InferenceError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| InferenceError::ConnectionFailed(e.to_string()))?;

        info!(
            base_url = %config.base_url,
            model = %config.model,
            "Initialized Gemini client"
        );

        Ok(Self { client, config })
    }

    fn base_url(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    /// Build a `v1beta` URL for a resource path
    fn api_url(&self, path: &str) -> String {
        format!("{}/v1beta/{}", self.base_url(), path.trim_start_matches('/'))
    }

    fn upload_url(&self) -> String {
        format!("{}/upload/v1beta/files", self.base_url())
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(API_KEY_HEADER, &self.config.api_key)
    }

    /// Map a non-success response to a server error
    async fn check(response: Response) -> Result<Response, InferenceError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, body = %body, "Gemini request failed");
        Err(InferenceError::ServerError(format!("Status {status}: {body}")))
    }

    /// Fetch the current metadata of an uploaded file
    #[instrument(skip(self))]
    pub async fn get_file(&self, name: &str) -> Result<RemoteFile, InferenceError> {
        let response = self
            .authorized(self.client.get(self.api_url(name)))
            .send()
            .await?;

        Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl GenerativeEngine for GeminiClient {
    #[instrument(skip(self, request), fields(model = %self.config.model, grounded = request.grounded))]
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, InferenceError> {
        let body =
            GenerateContentRequest::build(&request, self.config.system_instruction.as_deref());

        debug!(parts = request.parts.len(), "Sending generateContent request");

        let response = self
            .authorized(self.client.post(self.api_url(&format!(
                "models/{}:generateContent",
                self.config.model
            ))))
            .json(&body)
            .send()
            .await?;

        let parsed: GenerateContentResponse = Self::check(response)
            .await?
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        let candidate = parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| InferenceError::InvalidResponse("response has no candidates".into()))?;

        let texts: Vec<String> = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter(|part| !part.thought)
            .filter_map(|part| part.text)
            .collect();

        if texts.is_empty() {
            return Err(InferenceError::InvalidResponse(
                "response has no text part".into(),
            ));
        }

        let usage = parsed.usage_metadata.map(Into::into);
        debug!(tokens = ?usage, "Generation completed");

        Ok(GenerateResponse {
            texts,
            model: parsed
                .model_version
                .unwrap_or_else(|| self.config.model.clone()),
            usage,
            finish_reason: candidate.finish_reason,
        })
    }

    #[instrument(skip(self, data), fields(size = data.len()))]
    async fn upload_file(
        &self,
        data: Vec<u8>,
        mime_type: &str,
        display_name: &str,
    ) -> Result<RemoteFile, InferenceError> {
        let start = self
            .authorized(self.client.post(self.upload_url()))
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", data.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&UploadStartRequest {
                file: UploadFileMetadata { display_name },
            })
            .send()
            .await?;

        let start = Self::check(start).await?;
        let session_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .ok_or_else(|| {
                InferenceError::UploadFailed("start response has no upload URL".into())
            })?;

        let finalize = self
            .authorized(self.client.post(&session_url))
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(data)
            .send()
            .await?;

        // The file exists from here on; a body we cannot read leaves it unnamed
        let uploaded: UploadResponse = Self::check(finalize)
            .await?
            .json()
            .await
            .map_err(|e| {
                warn!(upload_url = %session_url, error = %e, "Uploaded file has unreadable metadata");
                InferenceError::UploadFailed(e.to_string())
            })?;

        debug!(name = %uploaded.file.name, state = ?uploaded.file.state, "Uploaded file");
        Ok(uploaded.file)
    }

    #[instrument(skip(self, file), fields(name = %file.name))]
    async fn wait_until_active(&self, file: RemoteFile) -> Result<RemoteFile, InferenceError> {
        let mut file = file;
        let mut attempts = 0;

        loop {
            match file.state {
                FileState::Active | FileState::StateUnspecified | FileState::Unknown => {
                    return Ok(file);
                },
                FileState::Failed => {
                    return Err(InferenceError::UploadFailed(format!(
                        "{} failed processing",
                        file.name
                    )));
                },
                FileState::Processing => {},
            }

            if attempts >= self.config.file_poll_max_attempts {
                return Err(InferenceError::AssetNotReady {
                    name: file.name,
                    attempts,
                });
            }

            attempts += 1;
            debug!(attempts, "File still processing");
            tokio::time::sleep(Duration::from_millis(self.config.file_poll_interval_ms)).await;
            file = self.get_file(&file.name).await?;
        }
    }

    #[instrument(skip(self))]
    async fn delete_file(&self, name: &str) -> Result<(), InferenceError> {
        let response = self
            .authorized(self.client.delete(self.api_url(name)))
            .send()
            .await?;

        Self::check(response).await?;
        debug!("Deleted file");
        Ok(())
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with_base(base_url: &str) -> GeminiClient {
        GeminiClient::new(GeminiConfig {
            api_key: "key".to_string(),
            base_url: base_url.to_string(),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn builds_api_urls() {
        let client = client_with_base("https://generativelanguage.googleapis.com/");

        assert_eq!(
            client.api_url("files/abc"),
            "https://generativelanguage.googleapis.com/v1beta/files/abc"
        );
        assert_eq!(
            client.api_url("/models/m:generateContent"),
            "https://generativelanguage.googleapis.com/v1beta/models/m:generateContent"
        );
        assert_eq!(
            client.upload_url(),
            "https://generativelanguage.googleapis.com/upload/v1beta/files"
        );
    }

    #[test]
    fn model_comes_from_config() {
        let client = client_with_base("http://localhost");
        assert_eq!(client.model(), "gemini-2.5-flash-preview-05-20");
    }

    #[test]
    fn debug_does_not_leak_key() {
        let client = client_with_base("http://localhost");
        let debug = format!("{client:?}");
        assert!(!debug.contains("\"key\""));
        assert!(debug.contains("[REDACTED]"));
    }
}

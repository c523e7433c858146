//! AI relay - Sends text or a staged file to the generative model
//!
//! Asset mode always follows upload, infer, delete. The delete runs
//! whether or not inference succeeded, and only for the asset this call
//! uploaded.

use std::{fmt, path::Path, sync::Arc};

use domain::{MediaKind, TextIntent};
use tracing::{debug, instrument, warn};

use crate::{
    error::ApplicationError,
    ports::{GeneratedReply, GenerativePort, UploadedAsset},
    services::RequestScope,
};

/// Prompt for images and audio
pub const MEDIA_PROMPT: &str = "Analyze and reply directly based on this content.";

/// Prompt for video
pub const VIDEO_PROMPT: &str = "Summarize this video in 3 sentences.";

/// Prompt used for a single media attachment of the given kind
pub const fn prompt_for(kind: MediaKind) -> &'static str {
    match kind {
        MediaKind::Video => VIDEO_PROMPT,
        MediaKind::Image | MediaKind::Audio | MediaKind::Document => MEDIA_PROMPT,
    }
}

/// Relay between the dispatcher and the generative model
#[derive(Clone)]
pub struct AiRelay {
    generative: Arc<dyn GenerativePort>,
}

impl fmt::Debug for AiRelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiRelay").finish_non_exhaustive()
    }
}

impl AiRelay {
    pub fn new(generative: Arc<dyn GenerativePort>) -> Self {
        Self { generative }
    }

    /// The underlying generative port
    pub fn generative(&self) -> &dyn GenerativePort {
        self.generative.as_ref()
    }

    /// Answer a text message
    ///
    /// Search intent enables web search and URL context tooling.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn reply_to_text(&self, text: &str) -> Result<GeneratedReply, ApplicationError> {
        let intent = TextIntent::classify(text);
        debug!(?intent, "Classified text message");
        self.generative.generate_text(text, intent).await
    }

    /// Upload a file, ask `prompt` about it and delete the upload
    #[instrument(skip(self, scope, prompt), fields(scope = %scope.id()))]
    pub async fn analyze_file(
        &self,
        scope: &RequestScope,
        path: &Path,
        mime_type: &str,
        prompt: &str,
    ) -> Result<String, ApplicationError> {
        let display_name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |n| n.to_string_lossy().into_owned());

        let asset = self
            .generative
            .upload_asset(path, mime_type, &display_name)
            .await?;
        scope.track_asset(asset.clone()).await;

        let result = self.generative.generate_with_asset(&asset, prompt).await;
        self.release(scope, &asset).await;

        result.map(|reply| reply.text)
    }

    async fn release(&self, scope: &RequestScope, asset: &UploadedAsset) {
        match self.generative.delete_asset(asset).await {
            Ok(()) => debug!(asset = %asset.name, "Released asset"),
            Err(e) => warn!(asset = %asset.name, error = %e, "Failed to release asset"),
        }
        scope.forget_asset(&asset.name).await;
    }
}

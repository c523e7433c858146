//! Dispatch service - Routes one inbound message to a single reply
//!
//! Text goes straight to the AI relay. Media is downloaded into a request
//! scope, analyzed (documents page by page) and the scope released. Every
//! stage returns a typed error; [`DispatchService::dispatch`] is the only
//! place that turns one into the generic error notice.
//!
//! [`DispatchService::dispatch_detached`] runs the pipeline on its own task
//! so a dropped caller cannot interrupt it between upload and cleanup.

use std::{fmt, path::PathBuf, sync::Arc};

use domain::{InboundMessage, MediaKind, MessageContent, PhoneNumber, ScopeId};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{error, info, instrument, warn};

use crate::{
    error::{ApplicationError, FailureStage},
    ports::{GenerativePort, MessengerPort, PageRasterizerPort},
    services::{AiRelay, DocumentSummarizer, RequestScope, prompt_for},
};

/// Notice sent when a message fails at any stage
pub const ERROR_NOTICE: &str = "❌ Error processing your request.";

/// Notice sent for message types the relay cannot handle
pub const UNSUPPORTED_NOTICE: &str = "Unsupported media type.";

/// Result of dispatching one message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    TextHandled,
    MediaHandled,
    DocumentHandled,
    Unsupported,
    Failed(FailureStage),
}

impl DispatchOutcome {
    /// Status string reported to the webhook caller
    pub const fn status(&self) -> &'static str {
        match self {
            Self::TextHandled => "text handled",
            Self::MediaHandled => "media handled",
            Self::DocumentHandled => "pdf handled",
            Self::Unsupported => "unsupported",
            Self::Failed(_) => "error",
        }
    }

    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Tuning for the dispatch pipeline
#[derive(Debug, Clone, Default)]
pub struct DispatchConfig {
    /// Pages summarized at once for documents
    pub page_concurrency: usize,
    /// Directory request scopes are created in; system temp dir when unset
    pub workspace_root: Option<PathBuf>,
}

/// Service that handles one inbound message end to end
pub struct DispatchService {
    messenger: Arc<dyn MessengerPort>,
    relay: AiRelay,
    summarizer: DocumentSummarizer,
    recipient: PhoneNumber,
    config: DispatchConfig,
    /// Read-held by every detached dispatch; writing waits for all of them
    in_flight: Arc<RwLock<()>>,
}

impl fmt::Debug for DispatchService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchService")
            .field("recipient", &self.recipient)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DispatchService {
    /// Create a dispatch service with default configuration
    pub fn new(
        messenger: Arc<dyn MessengerPort>,
        generative: Arc<dyn GenerativePort>,
        rasterizer: Arc<dyn PageRasterizerPort>,
        recipient: PhoneNumber,
    ) -> Self {
        Self::with_config(
            messenger,
            generative,
            rasterizer,
            recipient,
            DispatchConfig::default(),
        )
    }

    /// Create a dispatch service with custom configuration
    pub fn with_config(
        messenger: Arc<dyn MessengerPort>,
        generative: Arc<dyn GenerativePort>,
        rasterizer: Arc<dyn PageRasterizerPort>,
        recipient: PhoneNumber,
        config: DispatchConfig,
    ) -> Self {
        let relay = AiRelay::new(generative);
        let summarizer = DocumentSummarizer::new(rasterizer, relay.clone())
            .with_page_concurrency(config.page_concurrency);

        Self {
            messenger,
            relay,
            summarizer,
            recipient,
            config,
            in_flight: Arc::new(RwLock::new(())),
        }
    }

    /// Dispatch on a separate task and wait for its outcome
    ///
    /// Dropping the returned future does not cancel the dispatch, so its
    /// request scope is always closed and every uploaded asset deleted.
    pub async fn dispatch_detached(
        self: &Arc<Self>,
        message: InboundMessage,
        scope_id: ScopeId,
    ) -> DispatchOutcome {
        let guard = Arc::clone(&self.in_flight).read_owned().await;
        let service = Arc::clone(self);

        let task = tokio::spawn(async move {
            let outcome = service.dispatch(&message, scope_id).await;
            drop(guard);
            outcome
        });

        match task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => {
                error!(scope = %scope_id, error = %e, "Dispatch task cancelled");
                DispatchOutcome::Failed(FailureStage::Workspace)
            },
        }
    }

    /// Wait until every detached dispatch has finished
    pub async fn drain(&self) {
        drop(self.in_flight.write().await);
    }

    /// Handle one message and send exactly one reply
    ///
    /// Never fails: errors become [`DispatchOutcome::Failed`] after the
    /// generic error notice has been attempted.
    #[instrument(skip(self, message), fields(
        scope = %scope_id,
        message_type = message.message_type(),
        message_id = ?message.message_id
    ))]
    pub async fn dispatch(&self, message: &InboundMessage, scope_id: ScopeId) -> DispatchOutcome {
        match self.process(message, scope_id).await {
            Ok(outcome) => {
                info!(status = outcome.status(), "Message handled");
                outcome
            },
            Err(e) => {
                let stage = e.stage();
                error!(stage = %stage, error = %e, "Message processing failed");
                if let Err(notify_err) = self.notify(ERROR_NOTICE).await {
                    error!(error = %notify_err, "Failed to deliver error notice");
                }
                DispatchOutcome::Failed(stage)
            },
        }
    }

    async fn process(
        &self,
        message: &InboundMessage,
        scope_id: ScopeId,
    ) -> Result<DispatchOutcome, ApplicationError> {
        match &message.content {
            MessageContent::Text { body } => {
                let reply = self.relay.reply_to_text(body).await?;
                self.notify(&reply.text).await?;
                Ok(DispatchOutcome::TextHandled)
            },
            MessageContent::Media {
                kind,
                media_id,
                mime_type,
            } => {
                if mime_type
                    .as_deref()
                    .is_some_and(|mime| !kind.accepts_mime_type(mime))
                {
                    warn!(kind = %kind, mime_type = ?mime_type, "Media type not processable");
                    return self.reject_unsupported().await;
                }
                self.process_media(scope_id, *kind, media_id, mime_type.as_deref())
                    .await
            },
            MessageContent::Unsupported { message_type } => {
                warn!(message_type = %message_type, "Unsupported message type");
                self.reject_unsupported().await
            },
        }
    }

    async fn reject_unsupported(&self) -> Result<DispatchOutcome, ApplicationError> {
        self.notify(UNSUPPORTED_NOTICE).await?;
        Ok(DispatchOutcome::Unsupported)
    }

    async fn process_media(
        &self,
        scope_id: ScopeId,
        kind: MediaKind,
        media_id: &str,
        webhook_mime: Option<&str>,
    ) -> Result<DispatchOutcome, ApplicationError> {
        let scope = match &self.config.workspace_root {
            Some(root) => RequestScope::create_in(scope_id, root)?,
            None => RequestScope::create(scope_id)?,
        };

        let result = self.analyze_media(&scope, kind, media_id, webhook_mime).await;
        let result = match result {
            Ok(reply) => self.notify(&reply).await.map(|()| match kind {
                MediaKind::Document => DispatchOutcome::DocumentHandled,
                MediaKind::Image | MediaKind::Audio | MediaKind::Video => {
                    DispatchOutcome::MediaHandled
                },
            }),
            Err(e) => Err(e),
        };

        scope.close(self.relay.generative()).await;
        result
    }

    async fn analyze_media(
        &self,
        scope: &RequestScope,
        kind: MediaKind,
        media_id: &str,
        webhook_mime: Option<&str>,
    ) -> Result<String, ApplicationError> {
        let media = self.messenger.download_media(media_id).await?;
        let mime_type = resolve_mime_type(kind, media.mime_type.as_deref(), webhook_mime);

        let file_name = format!("{}.{}", kind.as_str(), kind.file_extension());
        let path = scope.write_file(&file_name, &media.data).await?;

        let result = match kind {
            MediaKind::Document => self.summarizer.summarize(scope, &path).await,
            MediaKind::Image | MediaKind::Audio | MediaKind::Video => {
                self.relay
                    .analyze_file(scope, &path, &mime_type, prompt_for(kind))
                    .await
            },
        };
        scope.remove_file(&path).await;

        result
    }

    async fn notify(&self, text: &str) -> Result<(), ApplicationError> {
        self.messenger
            .send_text(&self.recipient, text)
            .await
            .map(|_| ())
    }
}

/// Pick the MIME type to declare on upload
///
/// Platform metadata wins over the webhook value, which wins over the
/// kind's default. Parameters are stripped.
fn resolve_mime_type(kind: MediaKind, fetched: Option<&str>, webhook: Option<&str>) -> String {
    fetched
        .or(webhook)
        .and_then(|mime| mime.split(';').next())
        .map(str::trim)
        .filter(|mime| !mime.is_empty())
        .unwrap_or_else(|| kind.default_mime_type())
        .to_string()
}

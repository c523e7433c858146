//! Messenger port - Outbound text and inbound media for the chat platform
//!
//! The relay sends every reply as text and only ever downloads media that
//! an inbound webhook referenced.

#[cfg(test)]
use mockall::automock;

use async_trait::async_trait;
use domain::PhoneNumber;

use crate::error::ApplicationError;

/// Media bytes resolved from a platform media id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedMedia {
    /// Raw bytes
    pub data: Vec<u8>,
    /// MIME type reported by the platform, if any
    pub mime_type: Option<String>,
}

/// Port for messaging platform operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessengerPort: Send + Sync {
    /// Send a text message
    ///
    /// Returns the platform's message ID for the sent message. Failures are
    /// reported as [`ApplicationError::Notify`].
    async fn send_text(
        &self,
        recipient: &PhoneNumber,
        text: &str,
    ) -> Result<String, ApplicationError>;

    /// Resolve a media id and download its bytes
    ///
    /// Failures are reported as [`ApplicationError::MediaFetch`].
    async fn download_media(&self, media_id: &str) -> Result<DownloadedMedia, ApplicationError>;
}

//! WhatsApp messenger adapter
//!
//! Implements the `MessengerPort` trait using the WhatsApp integration crate.

use application::error::ApplicationError;
use application::ports::{DownloadedMedia, MessengerPort};
use async_trait::async_trait;
use domain::PhoneNumber;
use integration_whatsapp::{WhatsAppClient, WhatsAppClientConfig, WhatsAppError};
use tracing::{debug, instrument};

/// Adapter that implements `MessengerPort` using `WhatsAppClient`
#[derive(Debug)]
pub struct WhatsAppMessengerAdapter {
    client: WhatsAppClient,
}

impl WhatsAppMessengerAdapter {
    /// Create a new WhatsApp messenger adapter
    ///
    /// # Errors
    /// Returns an error if the client configuration is invalid.
    pub fn new(config: WhatsAppClientConfig) -> Result<Self, WhatsAppError> {
        Ok(Self {
            client: WhatsAppClient::new(config)?,
        })
    }

    /// Wrap an existing client
    pub const fn from_client(client: WhatsAppClient) -> Self {
        Self { client }
    }

    /// Get a reference to the underlying client for advanced operations
    #[must_use]
    pub const fn client(&self) -> &WhatsAppClient {
        &self.client
    }
}

#[async_trait]
impl MessengerPort for WhatsAppMessengerAdapter {
    #[instrument(skip(self, recipient, text), fields(recipient = %recipient, text_len = text.len()))]
    async fn send_text(
        &self,
        recipient: &PhoneNumber,
        text: &str,
    ) -> Result<String, ApplicationError> {
        let response = self
            .client
            .send_message(recipient.digits(), text)
            .await
            .map_err(|e| ApplicationError::Notify(format!("WhatsApp send failed: {e}")))?;

        let message_id = response
            .messages
            .first()
            .map(|m| m.id.clone())
            .ok_or_else(|| ApplicationError::Notify("No message ID in response".to_string()))?;

        debug!(message_id = %message_id, "WhatsApp text message sent");
        Ok(message_id)
    }

    #[instrument(skip(self), fields(media_id = %media_id))]
    async fn download_media(&self, media_id: &str) -> Result<DownloadedMedia, ApplicationError> {
        let media = self
            .client
            .download_media(media_id)
            .await
            .map_err(|e| ApplicationError::MediaFetch(format!("WhatsApp download failed: {e}")))?;

        Ok(DownloadedMedia {
            data: media.data,
            mime_type: media.mime_type,
        })
    }
}

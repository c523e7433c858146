//! WhatsApp webhook payload
//!
//! Deserializes the Cloud API change notification and turns its first
//! message into a domain [`InboundMessage`]. Every field is optional on the
//! wire, so an odd payload degrades to "no message" instead of a parse error.

use domain::{InboundMessage, MediaKind, MessageContent};
use serde::Deserialize;
use tracing::debug;

/// WhatsApp webhook notification
#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default)]
    pub entry: Vec<WebhookEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub changes: Vec<WebhookChange>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookChange {
    #[serde(default)]
    pub value: WebhookValue,
    #[serde(default)]
    pub field: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookValue {
    #[serde(default)]
    pub messaging_product: Option<String>,
    #[serde(default)]
    pub messages: Vec<WebhookMessage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookMessage {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(rename = "type", default)]
    pub msg_type: Option<String>,
    #[serde(default)]
    pub text: Option<TextMessage>,
    #[serde(default)]
    pub image: Option<MediaObject>,
    #[serde(default)]
    pub audio: Option<MediaObject>,
    #[serde(default)]
    pub video: Option<MediaObject>,
    #[serde(default)]
    pub document: Option<MediaObject>,
}

#[derive(Debug, Deserialize)]
pub struct TextMessage {
    pub body: String,
}

/// Media attachment reference
#[derive(Debug, Deserialize)]
pub struct MediaObject {
    pub id: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
}

impl WebhookMessage {
    fn media_object(&self, kind: MediaKind) -> Option<&MediaObject> {
        match kind {
            MediaKind::Image => self.image.as_ref(),
            MediaKind::Audio => self.audio.as_ref(),
            MediaKind::Video => self.video.as_ref(),
            MediaKind::Document => self.document.as_ref(),
        }
    }

    /// Convert into a domain message
    ///
    /// Returns `None` when the message is malformed: no `type`, a text
    /// message without a body, or a media message without its media object.
    pub fn to_inbound(&self) -> Option<InboundMessage> {
        let msg_type = self.msg_type.as_deref()?;

        let content = if msg_type == "text" {
            MessageContent::Text {
                body: self.text.as_ref()?.body.clone(),
            }
        } else if let Ok(kind) = msg_type.parse::<MediaKind>() {
            let media = self.media_object(kind)?;
            MessageContent::Media {
                kind,
                media_id: media.id.clone(),
                mime_type: media.mime_type.clone(),
            }
        } else {
            MessageContent::Unsupported {
                message_type: msg_type.to_string(),
            }
        };

        let mut message = InboundMessage::from_content(content);
        message.message_id.clone_from(&self.id);
        message.from.clone_from(&self.from);
        Some(message)
    }
}

/// The message the relay acts on: first entry, first change, first message
pub fn first_message(payload: &WebhookPayload) -> Option<&WebhookMessage> {
    payload
        .entry
        .first()?
        .changes
        .first()?
        .value
        .messages
        .first()
}

/// Parse a raw webhook body and extract the message to process
///
/// Invalid JSON and payloads without a usable message both yield `None`.
pub fn extract_inbound_message(body: &[u8]) -> Option<InboundMessage> {
    let payload: WebhookPayload = match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(e) => {
            debug!(error = %e, "Webhook body is not a valid payload");
            return None;
        },
    };

    first_message(&payload)?.to_inbound()
}

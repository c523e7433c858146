//! Inbound message - One message delivered by the WhatsApp webhook

use serde::{Deserialize, Serialize};

use crate::value_objects::MediaKind;

/// What the user sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageContent {
    /// Plain text body
    Text { body: String },
    /// Attachment referenced by a platform media id
    Media {
        kind: MediaKind,
        media_id: String,
        /// MIME type as reported in the webhook, if any
        #[serde(default, skip_serializing_if = "Option::is_none")]
        mime_type: Option<String>,
    },
    /// Any other message type (sticker, location, contacts, ...)
    Unsupported { message_type: String },
}

/// A single inbound message, created per webhook call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Platform message id (`wamid...`), when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Sender as reported by the platform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub content: MessageContent,
}

impl InboundMessage {
    /// Create a text message
    #[must_use]
    pub fn text(body: impl Into<String>) -> Self {
        Self::from_content(MessageContent::Text { body: body.into() })
    }

    /// Create a media message without a reported MIME type
    #[must_use]
    pub fn media(kind: MediaKind, media_id: impl Into<String>) -> Self {
        Self::from_content(MessageContent::Media {
            kind,
            media_id: media_id.into(),
            mime_type: None,
        })
    }

    /// Create a message of a type the relay does not handle
    #[must_use]
    pub fn unsupported(message_type: impl Into<String>) -> Self {
        Self::from_content(MessageContent::Unsupported {
            message_type: message_type.into(),
        })
    }

    /// Wrap already-built content
    #[must_use]
    pub const fn from_content(content: MessageContent) -> Self {
        Self {
            message_id: None,
            from: None,
            content,
        }
    }

    /// Attach the platform message id
    #[must_use]
    pub fn with_message_id(mut self, message_id: impl Into<String>) -> Self {
        self.message_id = Some(message_id.into());
        self
    }

    /// Attach the sender
    #[must_use]
    pub fn with_sender(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// Attach a MIME type (only meaningful for media content)
    #[must_use]
    pub fn with_mime_type(mut self, mime: impl Into<String>) -> Self {
        if let MessageContent::Media { mime_type, .. } = &mut self.content {
            *mime_type = Some(mime.into());
        }
        self
    }

    /// The WhatsApp `type` this message was delivered as
    #[must_use]
    pub fn message_type(&self) -> &str {
        match &self.content {
            MessageContent::Text { .. } => "text",
            MessageContent::Media { kind, .. } => kind.as_str(),
            MessageContent::Unsupported { message_type } => message_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_message() {
        let msg = InboundMessage::text("hello");
        assert_eq!(msg.message_type(), "text");
        assert_eq!(
            msg.content,
            MessageContent::Text {
                body: "hello".to_string()
            }
        );
        assert!(msg.message_id.is_none());
    }

    #[test]
    fn media_message_with_mime_type() {
        let msg = InboundMessage::media(MediaKind::Image, "123").with_mime_type("image/png");
        assert_eq!(msg.message_type(), "image");
        match msg.content {
            MessageContent::Media {
                kind,
                media_id,
                mime_type,
            } => {
                assert_eq!(kind, MediaKind::Image);
                assert_eq!(media_id, "123");
                assert_eq!(mime_type.as_deref(), Some("image/png"));
            },
            other => unreachable!("Expected media content, got {other:?}"),
        }
    }

    #[test]
    fn mime_type_ignored_for_text() {
        let msg = InboundMessage::text("hi").with_mime_type("text/plain");
        assert_eq!(msg, InboundMessage::text("hi"));
    }

    #[test]
    fn unsupported_message_keeps_type() {
        let msg = InboundMessage::unsupported("sticker");
        assert_eq!(msg.message_type(), "sticker");
    }

    #[test]
    fn builder_sets_metadata() {
        let msg = InboundMessage::text("hi")
            .with_message_id("wamid.1")
            .with_sender("201001234567");
        assert_eq!(msg.message_id.as_deref(), Some("wamid.1"));
        assert_eq!(msg.from.as_deref(), Some("201001234567"));
    }

    #[test]
    fn content_serializes_with_type_tag() {
        let json = serde_json::to_value(InboundMessage::media(MediaKind::Video, "v1")).unwrap();
        assert_eq!(json["content"]["type"], "media");
        assert_eq!(json["content"]["kind"], "video");
        assert!(json["content"].get("mime_type").is_none());
    }
}

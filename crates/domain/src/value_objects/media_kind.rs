//! Media kind - The attachment types the relay knows how to analyze

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// MIME type of the only document format that can be split into pages
pub const PDF_MIME_TYPE: &str = "application/pdf";

/// WhatsApp attachment kinds handled by the media path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Audio,
    Video,
    /// Paged document (PDF), summarized page by page
    Document,
}

impl MediaKind {
    /// All kinds, in webhook order
    pub const ALL: [Self; 4] = [Self::Image, Self::Audio, Self::Video, Self::Document];

    /// The `type` value WhatsApp uses for this kind
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Document => "document",
        }
    }

    /// MIME type to fall back on when the platform does not report one
    #[must_use]
    pub const fn default_mime_type(&self) -> &'static str {
        match self {
            Self::Image => "image/jpeg",
            Self::Audio => "audio/mpeg",
            Self::Video => "video/mp4",
            Self::Document => PDF_MIME_TYPE,
        }
    }

    /// File extension used for the request-scoped temp file
    #[must_use]
    pub const fn file_extension(&self) -> &'static str {
        match self {
            Self::Image => "jpg",
            Self::Audio => "mp3",
            Self::Video => "mp4",
            Self::Document => "pdf",
        }
    }

    /// Whether a reported MIME type can be processed for this kind
    ///
    /// Only documents are restricted: they must be PDFs. Parameters such as
    /// `; charset=binary` are ignored.
    #[must_use]
    pub fn accepts_mime_type(&self, mime_type: &str) -> bool {
        match self {
            Self::Document => mime_type
                .split(';')
                .next()
                .is_some_and(|base| base.trim().eq_ignore_ascii_case(PDF_MIME_TYPE)),
            Self::Image | Self::Audio | Self::Video => true,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| DomainError::UnknownMediaKind(s.to_string()))
    }
}

//! WhatsApp client for sending messages and fetching media
//!
//! Uses the Meta Graph API.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// WhatsApp API errors
#[derive(Debug, Error)]
pub enum WhatsAppError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {code} - {message}")]
    Api { code: i32, message: String },

    #[error("Missing configuration: {0}")]
    Configuration(String),

    #[error("Invalid phone number: {0}")]
    InvalidPhoneNumber(String),

    #[error("Media {0} has no download URL")]
    MissingMediaUrl(String),
}

/// WhatsApp client configuration
#[derive(Debug, Clone)]
pub struct WhatsAppClientConfig {
    /// Meta Graph API access token
    pub access_token: String,
    /// Phone number ID from WhatsApp Business (the sender)
    pub phone_number_id: String,
    /// API version (default: v18.0)
    pub api_version: String,
    /// Graph API base URL, overridable for tests
    pub base_url: String,
    /// Per-request timeout in milliseconds
    pub timeout_ms: u64,
}

impl Default for WhatsAppClientConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            phone_number_id: String::new(),
            api_version: "v18.0".to_string(),
            base_url: "https://graph.facebook.com".to_string(),
            timeout_ms: 30_000,
        }
    }
}

/// WhatsApp client for the Meta Graph API
#[derive(Debug, Clone)]
pub struct WhatsAppClient {
    client: Client,
    config: WhatsAppClientConfig,
    api_root: String,
}

/// Message send request
#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    msg_type: &'static str,
    text: TextContent<'a>,
}

#[derive(Debug, Serialize)]
struct TextContent<'a> {
    body: &'a str,
}

/// API response for sent message
#[derive(Debug, Deserialize)]
pub struct SendMessageResponse {
    pub messaging_product: String,
    #[serde(default)]
    pub contacts: Vec<ContactInfo>,
    #[serde(default)]
    pub messages: Vec<MessageInfo>,
}

#[derive(Debug, Deserialize)]
pub struct ContactInfo {
    pub input: String,
    pub wa_id: String,
}

#[derive(Debug, Deserialize)]
pub struct MessageInfo {
    pub id: String,
}

/// Media metadata returned when resolving a media id
#[derive(Debug, Deserialize)]
pub struct MediaUrlResponse {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub id: Option<String>,
}

/// Downloaded media payload
#[derive(Debug, Clone)]
pub struct DownloadedMedia {
    /// Raw bytes
    pub data: Vec<u8>,
    /// MIME type reported by the metadata endpoint
    pub mime_type: Option<String>,
}

/// API error response
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    code: i32,
    message: String,
}

impl WhatsAppClient {
    /// Create a new WhatsApp client
    pub fn new(config: WhatsAppClientConfig) -> Result<Self, WhatsAppError> {
        if config.access_token.is_empty() {
            return Err(WhatsAppError::Configuration(
                "access_token is required".to_string(),
            ));
        }
        if config.phone_number_id.is_empty() {
            return Err(WhatsAppError::Configuration(
                "phone_number_id is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        let api_root = format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            config.api_version
        );

        Ok(Self {
            client,
            config,
            api_root,
        })
    }

    /// Send a text message
    ///
    /// `to` may carry a leading `+`; the API wants digits only.
    #[instrument(skip(self, message), fields(to = %to, message_len = message.len()))]
    pub async fn send_message(
        &self,
        to: &str,
        message: &str,
    ) -> Result<SendMessageResponse, WhatsAppError> {
        let phone = to.trim_start_matches('+');
        if phone.len() < 7 || !phone.chars().all(|c| c.is_ascii_digit()) {
            return Err(WhatsAppError::InvalidPhoneNumber(to.to_string()));
        }

        let request = SendMessageRequest {
            messaging_product: "whatsapp",
            to: phone,
            msg_type: "text",
            text: TextContent { body: message },
        };

        debug!("Sending WhatsApp message");

        let response = self
            .client
            .post(format!(
                "{}/{}/messages",
                self.api_root, self.config.phone_number_id
            ))
            .bearer_auth(&self.config.access_token)
            .json(&request)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    /// Resolve a media id to its short-lived download URL
    #[instrument(skip(self))]
    pub async fn get_media_url(&self, media_id: &str) -> Result<MediaUrlResponse, WhatsAppError> {
        let response = self
            .client
            .get(format!("{}/{}/", self.api_root, media_id))
            .bearer_auth(&self.config.access_token)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    /// Resolve and download a media attachment
    #[instrument(skip(self))]
    pub async fn download_media(&self, media_id: &str) -> Result<DownloadedMedia, WhatsAppError> {
        let meta = self.get_media_url(media_id).await?;
        let url = meta
            .url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| WhatsAppError::MissingMediaUrl(media_id.to_string()))?;

        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.config.access_token)
            .send()
            .await?;

        let data = Self::check(response).await?.bytes().await?.to_vec();

        debug!(
            size = data.len(),
            mime_type = ?meta.mime_type,
            "Downloaded WhatsApp media"
        );

        Ok(DownloadedMedia {
            data,
            mime_type: meta.mime_type,
        })
    }

    /// Get the configured sender phone number id
    #[must_use]
    pub fn phone_number_id(&self) -> &str {
        &self.config.phone_number_id
    }

    /// Turn a non-success response into an API error
    async fn check(response: Response) -> Result<Response, WhatsAppError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, "WhatsApp API returned an error");

        Err(match serde_json::from_str::<ApiErrorResponse>(&body) {
            Ok(error) => WhatsAppError::Api {
                code: error.error.code,
                message: error.error.message,
            },
            Err(_) => WhatsAppError::Api {
                code: i32::from(status.as_u16()),
                message: body,
            },
        })
    }
}

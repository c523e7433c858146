//! Application configuration
//!
//! Split into focused sub-modules:
//! - `server`: HTTP server settings
//! - `messenger`: WhatsApp Cloud API credentials and recipient
//! - `gemini`: Generative model settings
//! - `document`: PDF rasterization

mod document;
mod gemini;
mod messenger;
mod server;

use std::collections::HashMap;

use domain::PhoneNumber;
use integration_whatsapp::WhatsAppClientConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use document::DocumentConfig;
pub use gemini::GeminiAppConfig;
pub use messenger::WhatsAppConfig;
pub use server::{LogFormat, ServerConfig};

/// Prefix for structured environment variables (`MINDBOT_SERVER__PORT`)
pub const ENV_PREFIX: &str = "MINDBOT";

/// Flat variable names accepted for the required settings
pub const LEGACY_ENV_KEYS: [(&str, &str); 4] = [
    ("WA_TOKEN", "whatsapp.access_token"),
    ("PHONE_ID", "whatsapp.phone_number_id"),
    ("PHONE_NUMBER", "whatsapp.recipient"),
    ("GEN_API", "gemini.api_key"),
];

/// Configuration that loaded but cannot run the service
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("Invalid value for {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub whatsapp: WhatsAppConfig,

    #[serde(default)]
    pub gemini: GeminiAppConfig,

    #[serde(default)]
    pub document: DocumentConfig,
}

impl AppConfig {
    /// Load configuration from `.env`, environment and optional `config.toml`
    pub fn load() -> Result<Self, config::ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
            Err(e) if e.not_found() => {},
            Err(e) => warn!(error = %e, "Failed to read .env file"),
        }

        Self::from_sources(Some("config"), std::env::vars().collect())
    }

    /// Build configuration from an optional file and an explicit environment
    ///
    /// `file` is a path without extension, resolved by the `config` crate.
    pub fn from_sources(
        file: Option<&str>,
        env: HashMap<String, String>,
    ) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            // Start with defaults
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("whatsapp.verify_token", "BOT")?;

        if let Some(file) = file {
            builder = builder.add_source(config::File::with_name(file).required(false));
        }

        let legacy: Vec<(&str, String)> = LEGACY_ENV_KEYS
            .iter()
            .filter_map(|(var, key)| {
                env.get(*var)
                    .filter(|value| !value.trim().is_empty())
                    .map(|value| (*key, value.clone()))
            })
            .collect();

        // Override with environment variables (e.g., MINDBOT_SERVER__PORT)
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(Some(env.into_iter().collect())),
        );

        for (key, value) in legacy {
            builder = builder.set_override(key, value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Check that every setting the service cannot run without is present
    ///
    /// All missing fields are reported together.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let mut missing = Vec::new();

        if is_blank(self.whatsapp.access_token_str()) {
            missing.push("whatsapp.access_token");
        }
        if is_blank(self.whatsapp.phone_number_id.as_deref()) {
            missing.push("whatsapp.phone_number_id");
        }
        if is_blank(self.whatsapp.recipient.as_deref()) {
            missing.push("whatsapp.recipient");
        }
        if is_blank(self.gemini.api_key_str()) {
            missing.push("gemini.api_key");
        }

        if !missing.is_empty() {
            return Err(ConfigValidationError::Missing(missing));
        }

        self.recipient_number()?;

        if self.document.page_concurrency == 0 {
            return Err(ConfigValidationError::Invalid {
                field: "document.page_concurrency",
                message: "must be at least 1".to_string(),
            });
        }

        Ok(())
    }

    /// The fixed number every reply is sent to
    pub fn recipient_number(&self) -> Result<PhoneNumber, ConfigValidationError> {
        let raw = self
            .whatsapp
            .recipient
            .as_deref()
            .ok_or(ConfigValidationError::Missing(vec!["whatsapp.recipient"]))?;

        PhoneNumber::new(raw).map_err(|e| ConfigValidationError::Invalid {
            field: "whatsapp.recipient",
            message: e.to_string(),
        })
    }

    /// WhatsApp client configuration with the token exposed
    pub fn whatsapp_client_config(&self) -> WhatsAppClientConfig {
        WhatsAppClientConfig {
            access_token: self
                .whatsapp
                .access_token_str()
                .unwrap_or_default()
                .to_string(),
            phone_number_id: self.whatsapp.phone_number_id.clone().unwrap_or_default(),
            api_version: self.whatsapp.api_version.clone(),
            base_url: self.whatsapp.base_url.clone(),
            timeout_ms: self.whatsapp.timeout_ms,
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

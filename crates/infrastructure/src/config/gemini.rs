//! Gemini configuration.

use ai_core::GeminiConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Generative model configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiAppConfig {
    /// API key (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Instruction sent with every request
    #[serde(default)]
    pub system_instruction: Option<String>,

    /// Delay between checks while an upload is processing
    #[serde(default = "default_file_poll_interval_ms")]
    pub file_poll_interval_ms: u64,

    /// Checks before an upload that is still processing is given up
    #[serde(default = "default_file_poll_max_attempts")]
    pub file_poll_max_attempts: u32,
}

impl std::fmt::Debug for GeminiAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiAppConfig")
            .field(
                "api_key",
                &if self.api_key.is_some() {
                    Some("[REDACTED]")
                } else {
                    None
                },
            )
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_ms", &self.timeout_ms)
            .field("system_instruction", &self.system_instruction.is_some())
            .field("file_poll_interval_ms", &self.file_poll_interval_ms)
            .field("file_poll_max_attempts", &self.file_poll_max_attempts)
            .finish()
    }
}

fn default_base_url() -> String {
    GeminiConfig::default().base_url
}

fn default_model() -> String {
    GeminiConfig::default().model
}

fn default_timeout_ms() -> u64 {
    GeminiConfig::default().timeout_ms
}

fn default_file_poll_interval_ms() -> u64 {
    GeminiConfig::default().file_poll_interval_ms
}

fn default_file_poll_max_attempts() -> u32 {
    GeminiConfig::default().file_poll_max_attempts
}

impl Default for GeminiAppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            timeout_ms: default_timeout_ms(),
            system_instruction: None,
            file_poll_interval_ms: default_file_poll_interval_ms(),
            file_poll_max_attempts: default_file_poll_max_attempts(),
        }
    }
}

impl GeminiAppConfig {
    /// Get the API key as a string reference (for API calls)
    #[must_use]
    pub fn api_key_str(&self) -> Option<&str> {
        self.api_key.as_ref().map(ExposeSecret::expose_secret)
    }

    /// Client configuration with the key exposed
    pub fn to_client_config(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.api_key_str().unwrap_or_default().to_string(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            timeout_ms: self.timeout_ms,
            system_instruction: self.system_instruction.clone(),
            file_poll_interval_ms: self.file_poll_interval_ms,
            file_poll_max_attempts: self.file_poll_max_attempts,
        }
    }
}

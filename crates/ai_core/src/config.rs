//! Configuration for the Gemini client

use std::fmt;

use serde::{Deserialize, Serialize};

/// Configuration for the Gemini generative API
#[derive(Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key sent as `x-goog-api-key`
    #[serde(default, skip_serializing)]
    pub api_key: String,

    /// Base URL of the Generative Language API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used for every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// System instruction sent with every request
    #[serde(default)]
    pub system_instruction: Option<String>,

    /// Delay between file state polls while an upload is processing
    #[serde(default = "default_file_poll_interval_ms")]
    pub file_poll_interval_ms: u64,

    /// Number of polls before giving up on a processing upload
    #[serde(default = "default_file_poll_max_attempts")]
    pub file_poll_max_attempts: u32,
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_model() -> String {
    "gemini-2.5-flash-preview-05-20".to_string()
}

const fn default_timeout_ms() -> u64 {
    120_000 // video and multi-page requests are slow
}

const fn default_file_poll_interval_ms() -> u64 {
    2_000
}

const fn default_file_poll_max_attempts() -> u32 {
    30
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            model: default_model(),
            timeout_ms: default_timeout_ms(),
            system_instruction: None,
            file_poll_interval_ms: default_file_poll_interval_ms(),
            file_poll_max_attempts: default_file_poll_max_attempts(),
        }
    }
}

impl fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiConfig")
            .field(
                "api_key",
                &if self.api_key.is_empty() {
                    None
                } else {
                    Some("[REDACTED]")
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

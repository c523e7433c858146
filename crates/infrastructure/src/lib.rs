//! Infrastructure layer - Adapters for external systems
//!
//! Implements ports defined in the application layer: WhatsApp messaging,
//! Gemini generation and PDF rasterization. Also owns configuration loading
//! and logging setup.

pub mod adapters;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use config::{
    AppConfig, ConfigValidationError, DocumentConfig, GeminiAppConfig, LogFormat, ServerConfig,
    WhatsAppConfig,
};
pub use telemetry::{DEFAULT_LOG_FILTER, TelemetryError, init_tracing};

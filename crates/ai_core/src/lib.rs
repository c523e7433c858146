//! AI Core - Generative model client
//!
//! Provides the generative engine abstraction and its Google Gemini
//! implementation, including file upload for media inference.

pub mod config;
pub mod error;
pub mod gemini;
pub mod ports;

pub use config::GeminiConfig;
pub use error::InferenceError;
pub use gemini::GeminiClient;
pub use ports::{
    ContentPart, FileState, GenerateRequest, GenerateResponse, GenerativeEngine, RemoteFile,
    TokenUsage,
};

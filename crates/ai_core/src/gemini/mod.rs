//! Google Gemini engine implementation
//!
//! Talks to the Generative Language REST API: `generateContent` for
//! inference and the resumable Files API for media.

mod client;
mod types;

pub use client::GeminiClient;

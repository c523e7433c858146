//! WhatsApp integration
//!
//! Parses WhatsApp Cloud API webhooks, sends text replies and fetches media.

pub mod client;
pub mod webhook;

pub use client::{DownloadedMedia, WhatsAppClient, WhatsAppClientConfig, WhatsAppError};
pub use webhook::{WebhookPayload, extract_inbound_message, first_message};

//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod gemini_adapter;
mod pdf_rasterizer;
mod whatsapp_adapter;

pub use gemini_adapter::GeminiGenerativeAdapter;
pub use pdf_rasterizer::PdfRasterizer;
pub use whatsapp_adapter::WhatsAppMessengerAdapter;

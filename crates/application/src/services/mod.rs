//! Application services - Use case implementations

mod ai_relay;
mod dispatch_service;
mod document_summarizer;
mod request_scope;

pub use ai_relay::{AiRelay, MEDIA_PROMPT, VIDEO_PROMPT, prompt_for};
pub use dispatch_service::{
    DispatchConfig, DispatchOutcome, DispatchService, ERROR_NOTICE, UNSUPPORTED_NOTICE,
};
pub use document_summarizer::{DocumentSummarizer, PAGE_PROMPT, PAGE_SEPARATOR};
pub use request_scope::RequestScope;

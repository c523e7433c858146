//! Value Objects - Immutable, identity-less domain primitives

mod media_kind;
mod phone_number;
mod scope_id;
mod text_intent;

pub use media_kind::{MediaKind, PDF_MIME_TYPE};
pub use phone_number::PhoneNumber;
pub use scope_id::ScopeId;
pub use text_intent::{SEARCH_PREFIX, TextIntent};

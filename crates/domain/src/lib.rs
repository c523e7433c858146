//! Domain layer for MindBot
//!
//! Request-scoped values that describe an inbound WhatsApp message and how
//! it should be routed. No I/O happens here.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;

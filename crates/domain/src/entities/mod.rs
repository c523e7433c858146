//! Domain entities - Request-scoped message values

mod inbound_message;

pub use inbound_message::{InboundMessage, MessageContent};

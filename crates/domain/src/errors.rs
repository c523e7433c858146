//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Invalid phone number format
    #[error("Invalid phone number: {0}")]
    InvalidPhoneNumber(String),

    /// Message type that is not a known media kind
    #[error("Unknown media kind: {0}")]
    UnknownMediaKind(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = DomainError::InvalidPhoneNumber("too short".to_string());
        assert_eq!(err.to_string(), "Invalid phone number: too short");

        let err = DomainError::UnknownMediaKind("sticker".to_string());
        assert!(err.to_string().contains("sticker"));
    }
}

//! Application-level errors

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Pipeline stage at which a message failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureStage {
    Fetch,
    Workspace,
    Rasterize,
    Inference,
    Notify,
    Configuration,
}

impl FailureStage {
    /// Stable name used in logs
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Fetch => "fetch",
            Self::Workspace => "workspace",
            Self::Rasterize => "rasterize",
            Self::Inference => "inference",
            Self::Notify => "notify",
            Self::Configuration => "configuration",
        }
    }
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Media id could not be resolved or downloaded
    #[error("Media fetch failed: {0}")]
    MediaFetch(String),

    /// Generative model call, upload or response failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// Document page counting or rendering failed
    #[error("Rasterization failed: {0}")]
    Rasterize(String),

    /// Request scope could not be created or written
    #[error("Workspace error: {0}")]
    Workspace(String),

    /// Outbound message could not be delivered
    #[error("Notification failed: {0}")]
    Notify(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// The stage this error belongs to
    pub const fn stage(&self) -> FailureStage {
        match self {
            Self::MediaFetch(_) => FailureStage::Fetch,
            Self::Inference(_) => FailureStage::Inference,
            Self::Rasterize(_) => FailureStage::Rasterize,
            Self::Workspace(_) => FailureStage::Workspace,
            Self::Notify(_) => FailureStage::Notify,
            Self::Configuration(_) => FailureStage::Configuration,
        }
    }
}

impl From<std::io::Error> for ApplicationError {
    fn from(err: std::io::Error) -> Self {
        Self::Workspace(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_error_maps_to_its_stage() {
        let cases = [
            (ApplicationError::MediaFetch("x".into()), "fetch"),
            (ApplicationError::Inference("x".into()), "inference"),
            (ApplicationError::Rasterize("x".into()), "rasterize"),
            (ApplicationError::Workspace("x".into()), "workspace"),
            (ApplicationError::Notify("x".into()), "notify"),
            (ApplicationError::Configuration("x".into()), "configuration"),
        ];

        for (error, stage) in cases {
            assert_eq!(error.stage().as_str(), stage);
        }
    }

    #[test]
    fn io_errors_are_workspace_errors() {
        let err: ApplicationError =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into();
        assert_eq!(err.stage(), FailureStage::Workspace);
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn stage_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&FailureStage::Rasterize).unwrap(),
            "\"rasterize\""
        );
        assert_eq!(FailureStage::Notify.to_string(), "notify");
    }
}

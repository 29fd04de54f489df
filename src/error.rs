use std::path::PathBuf;

/// Failure reported by a viewport capability.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AdapterError {
    #[error("viewport does not support `{0}`")]
    Unsupported(&'static str),

    #[error("viewport `{operation}` failed: {reason}")]
    Failed {
        operation: &'static str,
        reason: String,
    },
}

impl AdapterError {
    pub fn failed(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Failed {
            operation,
            reason: reason.into(),
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("preferences i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("preferences file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("preferences store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("{}: failed to read findings ({source})", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("findings payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

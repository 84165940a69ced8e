//! Pipeline error types.

/// Error raised by a single stage.
#[derive(Debug, thiserror::Error)]
pub enum StageError {
    /// Stage-specific failure.
    #[error("{0}")]
    Failed(String),

    /// A tree stage panicked.
    #[error("stage panicked: {0}")]
    Panicked(String),

    /// Tree serialization failed.
    #[error("failed to serialize tree: {0}")]
    Serialize(#[from] std::io::Error),
}

impl StageError {
    /// Stage failure with a message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// A stage aborted the pipeline.
#[derive(Debug, thiserror::Error)]
#[error("post-processing stage '{stage}' failed: {source}")]
pub struct ProcessingError {
    /// Name of the failing stage.
    pub stage: &'static str,
    #[source]
    pub source: StageError,
}

/// A tree representation name matched nothing.
#[derive(Debug, thiserror::Error)]
#[error("unknown tree representation '{0}' (expected one of: standard, rich)")]
pub struct UnknownTreeKind(pub String);

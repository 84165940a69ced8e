//! Unified error type.

use mkdown_config::ConfigError;
use mkdown_engines::EngineError;
use mkdown_pipeline::ProcessingError;
use mkdown_sanitize::SanitizerError;

/// Any failure surfaced by [`MarkdownConverter`](crate::MarkdownConverter).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Engine resolution or conversion failed.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// A post-processing stage aborted the pipeline.
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    /// No sanitizer could be resolved.
    #[error(transparent)]
    Sanitizer(#[from] SanitizerError),

    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Options could not be serialized into a cache key.
    #[error("failed to build converter cache key: {0}")]
    CacheKey(#[from] serde_json::Error),
}

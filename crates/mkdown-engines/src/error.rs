//! Error types for conversion engines.

/// Error resolving or running a conversion backend.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No adapter exists for the requested engine name.
    #[error("unsupported engine '{name}' (expected one of: {expected})")]
    UnsupportedEngine {
        /// Name as supplied by the caller.
        name: String,
        /// Comma-separated list of known engine names.
        expected: String,
    },

    /// An adapter exists but its backend was not compiled in.
    #[error("engine '{engine}' is not available: {remedy}")]
    EngineUnavailable {
        /// Stable engine identifier.
        engine: &'static str,
        /// How to make the engine available (e.g., the cargo feature to enable).
        remedy: String,
    },

    /// The backend reported a failure while converting.
    #[error("{engine} conversion failed: {message}")]
    Conversion {
        /// Stable engine identifier.
        engine: &'static str,
        /// Backend-provided failure description.
        message: String,
    },
}

impl EngineError {
    /// Build [`EngineError::EngineUnavailable`] for a backend gated by a cargo feature.
    pub(crate) fn unavailable(engine: &'static str, feature: &str) -> Self {
        Self::EngineUnavailable {
            engine,
            remedy: format!("rebuild mkdown with the `{feature}` cargo feature enabled"),
        }
    }
}

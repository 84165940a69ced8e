//! Error types for sanitizer selection.

/// Error resolving a sanitizer backend.
#[derive(Debug, thiserror::Error)]
pub enum SanitizerError {
    /// No backend could be resolved.
    #[error("no HTML sanitizer available; enable one of: {alternatives}")]
    NoSanitizerAvailable {
        /// Installable alternatives, most preferred first.
        alternatives: String,
    },

    /// The explicitly requested backend name is not known.
    #[error("unknown sanitizer '{name}' (expected one of: {expected})")]
    UnknownSanitizer {
        /// Name as supplied by the caller.
        name: String,
        /// Comma-separated list of known backend names.
        expected: String,
    },

    /// The explicitly requested backend cannot honor escape mode.
    #[error("sanitizer '{backend}' can only strip disallowed tags; set strip = true or use the `dom` sanitizer")]
    UnsupportedMode {
        /// Requested backend.
        backend: &'static str,
    },
}

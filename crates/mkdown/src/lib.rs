//! Backend-agnostic markdown conversion.
//!
//! [`MarkdownConverter`] renders markdown to HTML through one of several
//! interchangeable engines, runs the result through a priority-ordered
//! post-processing [`Pipeline`], and converts HTML back to markdown.
//!
//! - Engine options are described once with [`UnifiedOptions`] and translated
//!   for each backend; features a backend lacks are dropped, never rejected.
//! - Constructed converters are cached per (engine, options) and shared by
//!   clones of the converter.
//! - Sanitization, pretty-printing and title extraction are ordinary pipeline
//!   stages; callers can register their own.
//!
//! # Example
//!
//! ```
//! # #[cfg(feature = "comrak")]
//! # {
//! use mkdown::{ConverterSettings, MarkdownConverter, SanitizerOptions};
//!
//! let converter = MarkdownConverter::with_settings(
//!     ConverterSettings::default().with_sanitizer(SanitizerOptions::default()),
//! );
//! let output = converter.render("# Guide\n\nSome *text*.").unwrap();
//!
//! assert_eq!(output.metadata.title.as_deref(), Some("Guide"));
//! assert!(output.html.contains("<em>text</em>"));
//! # }
//! ```
//!
//! Backend discovery never instantiates anything:
//!
//! ```
//! println!("{}", mkdown::available_backends());
//! ```

mod converter;
mod discovery;
mod error;
mod settings;

pub use converter::MarkdownConverter;
pub use discovery::{BackendReport, available_backends};
pub use error::Error;
pub use settings::{ConverterSettings, SanitizeSettings};

pub use mkdown_cache::{CacheKey, ConverterCache};
pub use mkdown_config::{Config, ConfigError, Overrides};
pub use mkdown_engines::{
    EngineError, EngineRegistry, FeatureTag, HtmlEngine, HtmlToMarkdown, MarkdownStyle, Parser,
    ParserEngine, UnifiedOptions,
};
pub use mkdown_pipeline::{
    ExtractTitle, ExtractedMetadata, FailurePolicy, Pipeline, PipelineOutput, PostProcessor,
    Prettify, ProcessingError, SanitizeHtml, Stage, StageError, TreeChange, TreeKind,
    TreeProcessor,
};
pub use mkdown_sanitize::{
    AllowList, Sanitizer, SanitizerBackend, SanitizerError, SanitizerFactory, SanitizerOptions,
};

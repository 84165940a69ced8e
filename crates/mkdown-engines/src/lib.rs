//! Markdown conversion engines for mkdown.
//!
//! This crate owns the engine-independent option vocabulary and the adapters
//! that map it onto third-party backends:
//!
//! - [`UnifiedOptions`] / [`MarkdownStyle`]: what callers configure
//! - [`normalize()`]: pure translation into backend-native flag sets
//! - [`Parser`] / [`HtmlToMarkdown`]: capability traits, one adapter per backend
//! - [`EngineRegistry`]: resolves engine identifiers to adapters
//!
//! # Backends
//!
//! | Engine | Capability | Cargo feature |
//! |--------|------------|---------------|
//! | `comrak` | markdown → HTML | `comrak` |
//! | `pulldown-cmark` | markdown → HTML | `pulldown-cmark` |
//! | `htmd` | HTML → markdown | `htmd` |
//!
//! A known engine whose feature is disabled fails with
//! [`EngineError::EngineUnavailable`] naming the feature to enable.
//!
//! # Example
//!
//! ```
//! # #[cfg(feature = "comrak")]
//! # {
//! use mkdown_engines::{EngineRegistry, ParserEngine, UnifiedOptions};
//!
//! let parser = EngineRegistry::new()
//!     .create_parser(ParserEngine::Comrak, &UnifiedOptions::default().with_gfm(true))
//!     .unwrap();
//! let html = parser.convert("~~old~~ new").unwrap();
//! assert!(html.contains("<del>old</del>"));
//! # }
//! ```

mod admonition;
#[cfg(feature = "comrak")]
mod comrak;
mod engine;
mod error;
#[cfg(feature = "htmd")]
mod htmd;
mod normalize;
mod options;
#[cfg(feature = "pulldown-cmark")]
mod pulldown;
mod registry;
mod style;

pub use admonition::convert_admonitions;
#[cfg(feature = "comrak")]
pub use self::comrak::ComrakParser;
pub use engine::{HtmlEngine, HtmlToMarkdown, Parser, ParserEngine};
pub use error::EngineError;
#[cfg(feature = "htmd")]
pub use self::htmd::HtmdConverter;
pub use normalize::{
    COMRAK_EXTENSIONS, ComrakFlag, ComrakOptions, EngineOptions, PULLDOWN_EXTENSIONS,
    PulldownFlag, PulldownOptions, RawHtml, normalize, normalize_style,
};
pub use options::{FeatureTag, ListMarker, UnifiedOptions};
#[cfg(feature = "pulldown-cmark")]
pub use pulldown::PulldownParser;
pub use registry::EngineRegistry;
pub use style::{
    CodeBlockStyle, CodeFenceStyle, HeadingStyle, HorizontalRuleStyle, LineBreakStyle, LinkStyle,
    ListMarkerStyle, MarkdownStyle,
};

/// Run a backend call, reporting a backend panic as [`EngineError::Conversion`].
#[cfg(any(feature = "comrak", feature = "pulldown-cmark", feature = "htmd"))]
fn guard<T>(engine: &'static str, call: impl FnOnce() -> T) -> Result<T, EngineError> {
    std::panic::catch_unwind(std::panic::AssertUnwindSafe(call)).map_err(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "backend panicked".to_owned());
        tracing::warn!(engine, %message, "backend panicked during conversion");
        EngineError::Conversion { engine, message }
    })
}

#[cfg(all(test, feature = "comrak"))]
mod tests {
    use super::*;

    #[test]
    fn test_guard_reports_panic_as_conversion_error() {
        let result: Result<(), _> = guard("comrak", || panic!("boom"));

        let err = result.unwrap_err();
        assert!(
            matches!(err, EngineError::Conversion { engine: "comrak", ref message } if message == "boom"),
            "Expected Conversion, got {err:?}"
        );
    }
}

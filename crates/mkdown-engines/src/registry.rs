//! Engine registry.
//!
//! Resolves engine identifiers to adapter instances. A backend is available
//! when its cargo feature is compiled in and the registry has not been
//! restricted to exclude it.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::engine::{HtmlEngine, HtmlToMarkdown, Parser, ParserEngine};
use crate::error::EngineError;
use crate::normalize::{EngineOptions, normalize, normalize_style};
use crate::options::{FeatureTag, UnifiedOptions};
use crate::style::MarkdownStyle;

/// Factory for parser and HTML to markdown adapters.
#[derive(Clone, Debug, Default)]
pub struct EngineRegistry {
    parsers: Option<Vec<ParserEngine>>,
    html_engines: Option<Vec<HtmlEngine>>,
}

impl EngineRegistry {
    /// Registry exposing every compiled-in backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry exposing only the listed backends (still subject to compilation).
    #[must_use]
    pub fn restricted(
        parsers: impl IntoIterator<Item = ParserEngine>,
        html_engines: impl IntoIterator<Item = HtmlEngine>,
    ) -> Self {
        Self {
            parsers: Some(parsers.into_iter().collect()),
            html_engines: Some(html_engines.into_iter().collect()),
        }
    }

    /// Whether `engine` can be instantiated.
    #[must_use]
    pub fn is_parser_available(&self, engine: ParserEngine) -> bool {
        engine.is_compiled() && self.parsers.as_ref().is_none_or(|p| p.contains(&engine))
    }

    /// Whether `engine` can be instantiated.
    #[must_use]
    pub fn is_html_engine_available(&self, engine: HtmlEngine) -> bool {
        engine.is_compiled()
            && self
                .html_engines
                .as_ref()
                .is_none_or(|e| e.contains(&engine))
    }

    /// Available parsers in preference order.
    #[must_use]
    pub fn available_parsers(&self) -> Vec<ParserEngine> {
        ParserEngine::ALL
            .into_iter()
            .filter(|e| self.is_parser_available(*e))
            .collect()
    }

    /// Available HTML to markdown engines in preference order.
    #[must_use]
    pub fn available_html_engines(&self) -> Vec<HtmlEngine> {
        HtmlEngine::ALL
            .into_iter()
            .filter(|e| self.is_html_engine_available(*e))
            .collect()
    }

    /// Build a parser for `engine` configured by `options`.
    pub fn create_parser(
        &self,
        engine: ParserEngine,
        options: &UnifiedOptions,
    ) -> Result<Arc<dyn Parser>, EngineError> {
        if !self.is_parser_available(engine) {
            return Err(EngineError::unavailable(engine.name(), engine.feature()));
        }

        let parser = build_parser(normalize(options, engine))?;
        let dropped: BTreeSet<FeatureTag> = options
            .requested_features()
            .difference(&parser.supported_features())
            .copied()
            .collect();
        if !dropped.is_empty() {
            tracing::debug!(
                engine = engine.name(),
                dropped = ?dropped,
                "requested features not supported by engine"
            );
        }
        tracing::debug!(engine = engine.name(), "constructed parser");

        Ok(parser)
    }

    /// Build an HTML to markdown converter for `engine` producing `style`.
    pub fn create_html_converter(
        &self,
        engine: HtmlEngine,
        style: &MarkdownStyle,
    ) -> Result<Arc<dyn HtmlToMarkdown>, EngineError> {
        if !self.is_html_engine_available(engine) {
            return Err(EngineError::unavailable(engine.name(), engine.feature()));
        }

        let converter = build_html_converter(engine, normalize_style(style))?;
        tracing::debug!(engine = engine.name(), "constructed HTML to markdown converter");
        Ok(converter)
    }
}

fn build_parser(options: EngineOptions) -> Result<Arc<dyn Parser>, EngineError> {
    match options {
        #[cfg(feature = "comrak")]
        EngineOptions::Comrak(options) => Ok(Arc::new(crate::comrak::ComrakParser::new(options))),
        #[cfg(feature = "pulldown-cmark")]
        EngineOptions::PulldownCmark(options) => {
            Ok(Arc::new(crate::pulldown::PulldownParser::new(options)))
        }
        #[allow(unreachable_patterns)]
        other => {
            let engine = other.engine();
            Err(EngineError::unavailable(engine.name(), engine.feature()))
        }
    }
}

fn build_html_converter(
    engine: HtmlEngine,
    style: MarkdownStyle,
) -> Result<Arc<dyn HtmlToMarkdown>, EngineError> {
    match engine {
        #[cfg(feature = "htmd")]
        HtmlEngine::Htmd => Ok(Arc::new(crate::htmd::HtmdConverter::new(style))),
        #[allow(unreachable_patterns)]
        other => {
            let _ = style;
            Err(EngineError::unavailable(other.name(), other.feature()))
        }
    }
}

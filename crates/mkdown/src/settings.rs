//! Default conversion settings.

use mkdown_config::{Config, ConfigError};
use mkdown_engines::{HtmlEngine, MarkdownStyle, ParserEngine, UnifiedOptions};
use mkdown_pipeline::TreeKind;
use mkdown_sanitize::SanitizerOptions;

/// Sanitization stage settings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SanitizeSettings {
    pub options: SanitizerOptions,
    /// Preferred backend name; auto-selected when `None`, unknown or
    /// unavailable.
    pub backend: Option<String>,
}

/// Settings used by [`MarkdownConverter::render`] and
/// [`MarkdownConverter::to_markdown`].
///
/// [`MarkdownConverter::render`]: crate::MarkdownConverter::render
/// [`MarkdownConverter::to_markdown`]: crate::MarkdownConverter::to_markdown
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConverterSettings {
    pub engine: ParserEngine,
    pub options: UnifiedOptions,
    pub html_engine: HtmlEngine,
    pub style: MarkdownStyle,
    pub cache_enabled: bool,
    /// Add a sanitization stage when set.
    pub sanitize: Option<SanitizeSettings>,
    pub prettify: bool,
    pub extract_title: bool,
    /// Representation the title extraction stage runs on.
    pub tree: TreeKind,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        Self {
            engine: ParserEngine::Comrak,
            options: UnifiedOptions::default(),
            html_engine: HtmlEngine::Htmd,
            style: MarkdownStyle::default(),
            cache_enabled: true,
            sanitize: None,
            prettify: false,
            extract_title: true,
            tree: TreeKind::Standard,
        }
    }
}

impl ConverterSettings {
    /// Resolve settings from a loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if an engine or tree name is unknown.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let sanitize = if config.sanitizer.enabled {
            Some(SanitizeSettings {
                options: config.sanitizer.options(),
                backend: config.sanitizer.backend.clone(),
            })
        } else {
            None
        };

        Ok(Self {
            engine: config.convert.engine()?,
            options: config.convert.options.clone(),
            html_engine: config.html_to_markdown.engine()?,
            style: config.html_to_markdown.style.clone(),
            cache_enabled: config.convert.cache_enabled,
            sanitize,
            prettify: config.pipeline.prettify,
            extract_title: config.pipeline.extract_title,
            tree: config.pipeline.tree()?,
        })
    }

    #[must_use]
    pub fn with_engine(mut self, engine: ParserEngine) -> Self {
        self.engine = engine;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: UnifiedOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_sanitizer(mut self, options: SanitizerOptions) -> Self {
        self.sanitize = Some(SanitizeSettings {
            options,
            backend: None,
        });
        self
    }
}

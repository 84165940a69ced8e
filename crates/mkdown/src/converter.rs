//! Conversion entry points.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use mkdown_cache::{CacheKey, ConverterCache};
use mkdown_config::{Config, Overrides};
use mkdown_engines::{
    EngineRegistry, HtmlEngine, HtmlToMarkdown, MarkdownStyle, Parser, ParserEngine,
    UnifiedOptions,
};
use mkdown_pipeline::{
    ExtractTitle, Pipeline, PipelineOutput, Prettify, SanitizeHtml, Stage, TreeKind,
};
use mkdown_sanitize::{Sanitizer, SanitizerFactory, SanitizerOptions};

use crate::discovery::BackendReport;
use crate::error::Error;
use crate::settings::ConverterSettings;

/// Markdown to HTML (and back) converter with shared converter caches.
///
/// Cloning is cheap: clones share the converter caches.
#[derive(Clone)]
pub struct MarkdownConverter {
    settings: ConverterSettings,
    registry: EngineRegistry,
    sanitizers: SanitizerFactory,
    parsers: Arc<ConverterCache<dyn Parser>>,
    html_converters: Arc<ConverterCache<dyn HtmlToMarkdown>>,
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MarkdownConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkdownConverter")
            .field("settings", &self.settings)
            .field("registry", &self.registry)
            .field("sanitizers", &self.sanitizers)
            .field("cached_parsers", &self.parsers.len())
            .field("cached_html_converters", &self.html_converters.len())
            .finish()
    }
}

impl MarkdownConverter {
    /// Converter with default settings and every compiled-in backend.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(ConverterSettings::default())
    }

    #[must_use]
    pub fn with_settings(settings: ConverterSettings) -> Self {
        let cache_enabled = settings.cache_enabled;
        Self {
            settings,
            registry: EngineRegistry::new(),
            sanitizers: SanitizerFactory::new(),
            parsers: Arc::new(ConverterCache::with_enabled(cache_enabled)),
            html_converters: Arc::new(ConverterCache::with_enabled(cache_enabled)),
        }
    }

    /// Converter configured from a loaded [`Config`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if an engine or backend name is unknown.
    pub fn from_config(config: &Config) -> Result<Self, Error> {
        Ok(Self::with_settings(ConverterSettings::from_config(config)?))
    }

    /// Load `mkdown.toml` (explicit or discovered) and build a converter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if loading or validation fails.
    pub fn load(config_path: Option<&Path>, overrides: Option<&Overrides>) -> Result<Self, Error> {
        let config = Config::load(config_path, overrides)?;
        Self::from_config(&config)
    }

    /// Restrict which engines may be used.
    #[must_use]
    pub fn with_registry(mut self, registry: EngineRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Restrict which sanitizers may be used.
    #[must_use]
    pub fn with_sanitizer_factory(mut self, sanitizers: SanitizerFactory) -> Self {
        self.sanitizers = sanitizers;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &ConverterSettings {
        &self.settings
    }

    /// Backends this converter can use.
    #[must_use]
    pub fn available_backends(&self) -> BackendReport {
        BackendReport::probe(&self.registry, &self.sanitizers)
    }

    /// Parser for `engine` and `options`, built once per configuration.
    pub fn parser(
        &self,
        engine: ParserEngine,
        options: &UnifiedOptions,
    ) -> Result<Arc<dyn Parser>, Error> {
        let key = CacheKey::new(engine.name(), options)?;
        let parser = self
            .parsers
            .get_or_create(&key, || self.registry.create_parser(engine, options))?;
        Ok(parser)
    }

    /// HTML to markdown converter for `engine` and `style`, built once per
    /// configuration.
    pub fn html_converter(
        &self,
        engine: HtmlEngine,
        style: &MarkdownStyle,
    ) -> Result<Arc<dyn HtmlToMarkdown>, Error> {
        let key = CacheKey::new(engine.name(), style)?;
        let converter = self
            .html_converters
            .get_or_create(&key, || self.registry.create_html_converter(engine, style))?;
        Ok(converter)
    }

    /// Render markdown to HTML without post-processing.
    pub fn to_html(
        &self,
        markdown: &str,
        engine: ParserEngine,
        options: &UnifiedOptions,
    ) -> Result<String, Error> {
        Ok(self.parser(engine, options)?.convert(markdown)?)
    }

    /// Render markdown to HTML and run `pipeline` over the result.
    pub fn convert(
        &self,
        markdown: &str,
        engine: ParserEngine,
        options: &UnifiedOptions,
        pipeline: &mut Pipeline,
    ) -> Result<PipelineOutput, Error> {
        let html = self.to_html(markdown, engine, options)?;
        Ok(pipeline.run(&html)?)
    }

    /// Convert HTML to markdown.
    pub fn html_to_markdown(
        &self,
        html: &str,
        engine: HtmlEngine,
        style: &MarkdownStyle,
    ) -> Result<String, Error> {
        Ok(self.html_converter(engine, style)?.convert(html)?)
    }

    /// Render markdown with the configured engine, options and stages.
    pub fn render(&self, markdown: &str) -> Result<PipelineOutput, Error> {
        let mut pipeline = self.pipeline()?;
        self.convert(
            markdown,
            self.settings.engine,
            &self.settings.options,
            &mut pipeline,
        )
    }

    /// Convert HTML to markdown with the configured engine and style.
    pub fn to_markdown(&self, html: &str) -> Result<String, Error> {
        self.html_to_markdown(html, self.settings.html_engine, &self.settings.style)
    }

    /// Pipeline with the configured built-in stages.
    ///
    /// Stages keep per-run state, so a fresh pipeline is built for each call.
    pub fn pipeline(&self) -> Result<Pipeline, Error> {
        let mut pipeline = Pipeline::new();
        if let Some(sanitize) = &self.settings.sanitize {
            let sanitizer = self.sanitizer(&sanitize.options, sanitize.backend.as_deref())?;
            pipeline.push(Stage::html(SanitizeHtml::new(sanitizer)));
        }
        if self.settings.prettify {
            pipeline.push(Stage::html(Prettify::new()));
        }
        if self.settings.extract_title {
            let stage = match self.settings.tree {
                #[cfg(feature = "rich-tree")]
                TreeKind::Rich => Stage::rich(ExtractTitle::new()),
                kind => {
                    if kind != TreeKind::Standard {
                        tracing::debug!(tree = %kind, "tree not compiled in, using standard");
                    }
                    Stage::standard(ExtractTitle::new())
                }
            };
            pipeline.push(stage);
        }
        Ok(pipeline)
    }

    /// Resolve a sanitizer, preferring the backend named `backend` when it
    /// is known and available.
    pub fn sanitizer(
        &self,
        options: &SanitizerOptions,
        backend: Option<&str>,
    ) -> Result<Box<dyn Sanitizer>, Error> {
        Ok(self.sanitizers.create(options, backend)?)
    }
}

#[cfg(test)]
mod tests {
    use mkdown_engines::EngineError;
    use mkdown_pipeline::{PostProcessor, StageError};
    use mkdown_sanitize::SanitizerBackend;
    use pretty_assertions::assert_eq;

    use super::*;

    const SIMPLE_DOC: &str = "# Title\n\nSome *text*.";

    #[test]
    fn test_round_trip_on_every_available_engine() {
        let converter = MarkdownConverter::new();

        for engine in converter.available_backends().parsers {
            let mut pipeline = Pipeline::new().with_stage(Stage::standard(ExtractTitle::new()));
            let output = converter
                .convert(SIMPLE_DOC, engine, &UnifiedOptions::default(), &mut pipeline)
                .unwrap();

            assert_eq!(output.html.matches("<h1").count(), 1, "{engine}: {}", output.html);
            assert_eq!(output.html.matches("<em>text</em>").count(), 1, "{engine}");
            assert_eq!(output.metadata.title.as_deref(), Some("Title"), "{engine}");
        }
    }

    #[test]
    fn test_parser_is_cached_per_configuration() {
        let converter = MarkdownConverter::new();
        let Some(&engine) = converter.available_backends().parsers.first() else {
            return;
        };
        let gfm = UnifiedOptions::default().with_gfm(true);

        let first = converter.parser(engine, &gfm).unwrap();
        let again = converter.parser(engine, &gfm.clone()).unwrap();
        let other = converter.parser(engine, &UnifiedOptions::default()).unwrap();

        assert!(Arc::ptr_eq(&first, &again));
        assert!(!Arc::ptr_eq(&first, &other));
    }

    #[test]
    fn test_disabled_cache_builds_fresh_parsers() {
        let settings = ConverterSettings {
            cache_enabled: false,
            ..ConverterSettings::default()
        };
        let converter = MarkdownConverter::with_settings(settings);
        let Some(&engine) = converter.available_backends().parsers.first() else {
            return;
        };
        let options = UnifiedOptions::default();

        let first = converter.parser(engine, &options).unwrap();
        let second = converter.parser(engine, &options).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_clones_share_caches() {
        let converter = MarkdownConverter::new();
        let Some(&engine) = converter.available_backends().parsers.first() else {
            return;
        };
        let clone = converter.clone();
        let options = UnifiedOptions::default();

        let first = converter.parser(engine, &options).unwrap();
        let second = clone.parser(engine, &options).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_missing_backend_is_engine_unavailable() {
        let no_parsers: [ParserEngine; 0] = [];
        let no_html: [HtmlEngine; 0] = [];
        let converter =
            MarkdownConverter::new().with_registry(EngineRegistry::restricted(no_parsers, no_html));

        let err = converter
            .to_html(SIMPLE_DOC, ParserEngine::Comrak, &UnifiedOptions::default())
            .unwrap_err();
        assert!(
            matches!(err, Error::Engine(EngineError::EngineUnavailable { engine: "comrak", .. })),
            "Expected EngineUnavailable, got {err:?}"
        );

        let err = converter.to_markdown("<p>x</p>").unwrap_err();
        assert!(matches!(
            err,
            Error::Engine(EngineError::EngineUnavailable { engine: "htmd", .. })
        ));
    }

    #[test]
    fn test_unknown_engine_name_is_unsupported() {
        let err = "marko".parse::<ParserEngine>().map_err(Error::from).unwrap_err();

        assert!(matches!(err, Error::Engine(EngineError::UnsupportedEngine { .. })));
    }

    #[cfg(feature = "comrak")]
    #[test]
    fn test_render_sanitizes_and_extracts_title() {
        let settings = ConverterSettings::default()
            .with_options(UnifiedOptions::default().with_unsafe_html(true))
            .with_sanitizer(SanitizerOptions::default());
        let converter = MarkdownConverter::with_settings(settings);

        let output = converter
            .render("# Hello\n\n<script>alert(1)</script>\n\nBody <b onclick=\"x\">bold</b>\n")
            .unwrap();

        assert!(!output.html.contains("script"), "{}", output.html);
        assert!(!output.html.contains("onclick"), "{}", output.html);
        assert!(output.html.contains("<b>bold</b>"), "{}", output.html);
        assert_eq!(output.metadata.title.as_deref(), Some("Hello"));
    }

    #[cfg(feature = "comrak")]
    #[test]
    fn test_render_with_prettify() {
        let settings = ConverterSettings {
            prettify: true,
            ..ConverterSettings::default()
        };

        let output = MarkdownConverter::with_settings(settings)
            .render("# Hi\n")
            .unwrap();

        assert_eq!(output.html, "<h1>\n Hi\n</h1>\n");
        assert_eq!(output.metadata.title.as_deref(), Some("Hi"));
    }

    #[cfg(feature = "comrak")]
    #[test]
    fn test_unknown_sanitizer_name_uses_preferred_backend() {
        let mut settings = ConverterSettings::default()
            .with_options(UnifiedOptions::default().with_unsafe_html(true))
            .with_sanitizer(SanitizerOptions::default());
        if let Some(sanitize) = &mut settings.sanitize {
            sanitize.backend = Some("nh3".to_owned());
        }
        let converter = MarkdownConverter::with_settings(settings)
            .with_sanitizer_factory(SanitizerFactory::restricted([SanitizerBackend::Dom]));

        let output = converter.render("# T\n\nx <b onclick=\"y\">z</b>\n").unwrap();

        assert!(output.html.contains("<b>z</b>"), "{}", output.html);
    }

    #[cfg(all(feature = "comrak", feature = "rich-tree"))]
    #[test]
    fn test_rich_tree_setting_extracts_title() {
        let settings = ConverterSettings {
            tree: TreeKind::Rich,
            ..ConverterSettings::default()
        };
        let converter = MarkdownConverter::with_settings(settings);

        let output = converter.render("# Rich *title*\n").unwrap();

        assert_eq!(output.metadata.title.as_deref(), Some("Rich title"));
    }

    #[test]
    fn test_restricted_sanitizers_report_none_available() {
        let none: [SanitizerBackend; 0] = [];
        let converter = MarkdownConverter::with_settings(
            ConverterSettings::default().with_sanitizer(SanitizerOptions::default()),
        )
        .with_sanitizer_factory(SanitizerFactory::restricted(none));

        let err = converter.pipeline().unwrap_err();
        assert!(matches!(
            err,
            Error::Sanitizer(mkdown_sanitize::SanitizerError::NoSanitizerAvailable { .. })
        ));
    }

    struct AlwaysFails;

    impl PostProcessor for AlwaysFails {
        fn name(&self) -> &'static str {
            "always-fails"
        }

        fn priority(&self) -> i32 {
            5
        }

        fn process_html(&mut self, _html: &str) -> Result<String, StageError> {
            Err(StageError::failed("nope"))
        }
    }

    #[cfg(feature = "comrak")]
    #[test]
    fn test_failing_stage_surfaces_processing_error() {
        let converter = MarkdownConverter::new();
        let mut pipeline = Pipeline::new().with_stage(Stage::html(AlwaysFails));

        let err = converter
            .convert(SIMPLE_DOC, ParserEngine::Comrak, &UnifiedOptions::default(), &mut pipeline)
            .unwrap_err();

        assert!(matches!(err, Error::Processing(ref e) if e.stage == "always-fails"));
    }

    #[cfg(feature = "htmd")]
    #[test]
    fn test_to_markdown_uses_configured_style() {
        let converter = MarkdownConverter::new();

        let md = converter
            .to_markdown("<h1>Title</h1><p>Some <em>text</em>.</p>")
            .unwrap();

        assert!(md.starts_with("# Title"), "{md}");
        assert!(md.contains("*text*") || md.contains("_text_"), "{md}");
    }

    #[test]
    fn test_load_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mkdown.toml");
        std::fs::write(
            &path,
            "[convert]\nengine = \"pulldown-cmark\"\ncache_enabled = false\n[pipeline]\nextract_title = false\n",
        )
        .unwrap();

        let converter = MarkdownConverter::load(Some(&path), None).unwrap();

        assert_eq!(converter.settings().engine, ParserEngine::PulldownCmark);
        assert!(!converter.settings().cache_enabled);
        assert!(converter.pipeline().unwrap().is_empty());
    }
}

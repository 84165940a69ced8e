//! Configuration management for mkdown.
//!
//! Parses `mkdown.toml` with serde and discovers it in the current directory
//! or its parents. Command-line style settings are applied on top through
//! [`Overrides`].
//!
//! ```toml
//! [convert]
//! engine = "comrak"
//! cache_enabled = true
//!
//! [convert.options]
//! gfm = true
//!
//! [html_to_markdown]
//! engine = "htmd"
//!
//! [html_to_markdown.style]
//! heading_style = "atx"
//!
//! [sanitizer]
//! enabled = true
//! backend = "${MKDOWN_SANITIZER:-ammonia}"
//! strip = true
//! tags = ["p", "a"]
//!
//! [sanitizer.attributes]
//! a = ["href"]
//!
//! [pipeline]
//! prettify = false
//! extract_title = true
//! tree = "standard"
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `${VAR}` and `${VAR:-default}` are expanded in:
//! - `convert.engine`
//! - `html_to_markdown.engine`
//! - `sanitizer.backend`

mod expand;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use mkdown_engines::{HtmlEngine, MarkdownStyle, ParserEngine, UnifiedOptions};
use mkdown_pipeline::TreeKind;
use mkdown_sanitize::{AllowList, SanitizerOptions};
use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mkdown.toml";

/// Settings that override configuration file values.
///
/// Only `Some` fields override the loaded config.
#[derive(Debug, Default)]
pub struct Overrides {
    /// Override the markdown to HTML engine.
    pub engine: Option<String>,
    /// Override the HTML to markdown engine.
    pub html_engine: Option<String>,
    /// Override the converter cache switch.
    pub cache_enabled: Option<bool>,
    /// Override whether sanitization runs.
    pub sanitize: Option<bool>,
    /// Override the sanitizer backend.
    pub sanitizer_backend: Option<String>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub convert: ConvertConfig,
    pub html_to_markdown: HtmlToMarkdownConfig,
    pub sanitizer: SanitizerConfig,
    pub pipeline: PipelineConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Markdown to HTML settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Engine name, see [`ParserEngine`].
    pub engine: String,
    /// Reuse converters built for identical configurations.
    pub cache_enabled: bool,
    pub options: UnifiedOptions,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            engine: ParserEngine::Comrak.name().to_owned(),
            cache_enabled: true,
            options: UnifiedOptions::default(),
        }
    }
}

impl ConvertConfig {
    /// Resolved engine.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the engine name is unknown.
    pub fn engine(&self) -> Result<ParserEngine, ConfigError> {
        self.engine
            .parse()
            .map_err(|e| ConfigError::Validation(format!("convert.engine: {e}")))
    }
}

/// HTML to markdown settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HtmlToMarkdownConfig {
    /// Engine name, see [`HtmlEngine`].
    pub engine: String,
    pub style: MarkdownStyle,
}

impl Default for HtmlToMarkdownConfig {
    fn default() -> Self {
        Self {
            engine: HtmlEngine::Htmd.name().to_owned(),
            style: MarkdownStyle::default(),
        }
    }
}

impl HtmlToMarkdownConfig {
    /// Resolved engine.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the engine name is unknown.
    pub fn engine(&self) -> Result<HtmlEngine, ConfigError> {
        self.engine
            .parse()
            .map_err(|e| ConfigError::Validation(format!("html_to_markdown.engine: {e}")))
    }
}

/// Sanitizer settings.
///
/// Unset allow-list fields fall back to [`AllowList::default`].
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SanitizerConfig {
    /// Add a sanitization stage to the pipeline.
    pub enabled: bool,
    /// Preferred backend name; unknown or unavailable names fall back to
    /// auto-selection.
    pub backend: Option<String>,
    /// Remove disallowed tags (`true`) or escape them (`false`).
    pub strip: bool,
    pub strip_comments: bool,
    pub tags: Option<Vec<String>>,
    /// Tag name (or `"*"`) to allowed attributes.
    pub attributes: Option<BTreeMap<String, Vec<String>>>,
    pub protocols: Option<Vec<String>>,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            backend: None,
            strip: true,
            strip_comments: true,
            tags: None,
            attributes: None,
            protocols: None,
        }
    }
}

impl SanitizerConfig {
    /// Sanitizer options with unset allow-list fields taken from the default.
    #[must_use]
    pub fn options(&self) -> SanitizerOptions {
        let mut allow_list = AllowList::default();
        if let Some(tags) = &self.tags {
            allow_list.tags = normalize_names(tags);
        }
        if let Some(attributes) = &self.attributes {
            allow_list.attributes = attributes
                .iter()
                .map(|(tag, attrs)| (tag.trim().to_ascii_lowercase(), normalize_names(attrs)))
                .collect();
        }
        if let Some(protocols) = &self.protocols {
            allow_list.protocols = normalize_names(protocols);
        }

        SanitizerOptions {
            allow_list,
            strip: self.strip,
            strip_comments: self.strip_comments,
        }
    }
}

fn normalize_names(names: &[String]) -> BTreeSet<String> {
    names
        .iter()
        .map(|n| n.trim().to_ascii_lowercase())
        .filter(|n| !n.is_empty())
        .collect()
}

/// Built-in pipeline stages to enable.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Re-indent the rendered HTML.
    pub prettify: bool,
    /// Extract the first `<h1>` as the document title.
    pub extract_title: bool,
    /// Tree representation for tree stages, see [`TreeKind`].
    pub tree: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            prettify: false,
            extract_title: true,
            tree: TreeKind::Standard.name().to_owned(),
        }
    }
}

impl PipelineConfig {
    /// Resolved tree representation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if the name is unknown or the
    /// representation is not compiled in.
    pub fn tree(&self) -> Result<TreeKind, ConfigError> {
        let kind: TreeKind = self
            .tree
            .parse()
            .map_err(|e| ConfigError::Validation(format!("pipeline.tree: {e}")))?;
        if !kind.is_compiled() {
            return Err(ConfigError::Validation(format!(
                "pipeline.tree: '{kind}' is not available (enable the `rich-tree` feature)"
            )));
        }
        Ok(kind)
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`sanitizer.backend`").
        field: String,
        /// Error message (e.g., "${`MKDOWN_SANITIZER`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration with optional overrides.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `mkdown.toml` in the current directory and its parents, falling
    /// back to defaults when none exists.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `config_path` doesn't exist, parsing
    /// fails, or the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        overrides: Option<&Overrides>,
    ) -> Result<Self, ConfigError> {
        let discovered = match config_path {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => std::env::current_dir()
                .ok()
                .and_then(|cwd| Self::discover_config(&cwd)),
        };

        let mut config = match discovered {
            Some(path) => Self::load_from_file(&path)?,
            None => Self::default(),
        };

        if let Some(overrides) = overrides {
            config.apply_overrides(overrides);
        }
        config.validate()?;

        Ok(config)
    }

    /// Search for the config file in `start` and its parents.
    #[must_use]
    pub fn discover_config(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                tracing::debug!(path = %candidate.display(), "discovered config file");
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Apply overrides to the configuration.
    fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(engine) = &overrides.engine {
            self.convert.engine.clone_from(engine);
        }
        if let Some(engine) = &overrides.html_engine {
            self.html_to_markdown.engine.clone_from(engine);
        }
        if let Some(cache_enabled) = overrides.cache_enabled {
            self.convert.cache_enabled = cache_enabled;
        }
        if let Some(sanitize) = overrides.sanitize {
            self.sanitizer.enabled = sanitize;
        }
        if let Some(backend) = &overrides.sanitizer_backend {
            self.sanitizer.backend = Some(backend.clone());
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically by [`Config::load`].
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.convert.engine, "convert.engine")?;
        self.convert.engine()?;
        require_non_empty(&self.html_to_markdown.engine, "html_to_markdown.engine")?;
        self.html_to_markdown.engine()?;
        self.pipeline.tree()?;
        self.validate_sanitizer()
    }

    fn validate_sanitizer(&self) -> Result<(), ConfigError> {
        let sanitizer = &self.sanitizer;

        if sanitizer.tags.as_ref().is_some_and(Vec::is_empty) {
            return Err(ConfigError::Validation(
                "sanitizer.tags cannot be empty; omit it to use the default allow-list".to_owned(),
            ));
        }
        if let Some(protocols) = &sanitizer.protocols
            && let Some(bad) = protocols
                .iter()
                .find(|p| p.is_empty() || p.contains(':') || p.contains('/'))
        {
            return Err(ConfigError::Validation(format!(
                "sanitizer.protocols: '{bad}' is not a URL scheme"
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.convert.engine = expand::expand_env(&self.convert.engine, "convert.engine")?;
        self.html_to_markdown.engine =
            expand::expand_env(&self.html_to_markdown.engine, "html_to_markdown.engine")?;
        if let Some(backend) = &self.sanitizer.backend {
            self.sanitizer.backend = Some(expand::expand_env(backend, "sanitizer.backend")?);
        }
        Ok(())
    }
}

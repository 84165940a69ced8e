//! Feature normalization.
//!
//! Maps [`UnifiedOptions`] onto each backend's native flag set in one pass.
//! The result is an immutable value: adapters build their crate-native
//! configuration from it and nothing downstream ever sees a half-built
//! options object.
//!
//! Interaction rules applied here:
//!
//! - `gfm` implies the GFM extensions of the backend; flags are a set, so an
//!   extension requested both directly and through `gfm` is enabled once.
//! - `escape_html` wins over `unsafe_html`.
//! - Mutually exclusive native flags resolve to exactly one (comrak's
//!   `math_code` over dollar math, pulldown-cmark's `old_footnotes` over
//!   footnotes).
//! - Features a backend lacks are dropped, never rejected.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::engine::ParserEngine;
use crate::options::{ListMarker, UnifiedOptions};
use crate::style::MarkdownStyle;

/// What a backend does with raw HTML found in markdown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RawHtml {
    /// Replace with `<!-- raw HTML omitted -->`.
    #[default]
    Omit,
    /// Pass through unchanged.
    Render,
    /// Emit as escaped text.
    Escape,
}

impl RawHtml {
    fn from_unified(options: &UnifiedOptions) -> Self {
        if options.escape_html {
            Self::Escape
        } else if options.unsafe_html {
            Self::Render
        } else {
            Self::Omit
        }
    }
}

/// Boolean comrak switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComrakFlag {
    Strikethrough,
    Tagfilter,
    Table,
    Autolink,
    Tasklist,
    Superscript,
    Subscript,
    Footnotes,
    DescriptionLists,
    MultilineBlockQuotes,
    Alerts,
    MathDollars,
    MathCode,
    Wikilinks,
    Underline,
    Spoiler,
    Shortcodes,
    Greentext,
    Smart,
    RelaxedTasklistMatching,
    RelaxedAutolinks,
    Hardbreaks,
    GithubPreLang,
    FullInfoString,
    Sourcepos,
}

/// Native comrak configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ComrakOptions {
    pub flags: BTreeSet<ComrakFlag>,
    pub raw_html: RawHtml,
    pub header_ids: Option<String>,
    pub front_matter_delimiter: Option<String>,
    pub default_info_string: Option<String>,
    pub width: usize,
    pub list_style: ListMarker,
    pub admonitions: bool,
}

impl ComrakOptions {
    /// Whether `flag` is enabled.
    #[must_use]
    pub fn has(&self, flag: ComrakFlag) -> bool {
        self.flags.contains(&flag)
    }
}

/// pulldown-cmark parser switches (one per `Options::ENABLE_*` constant used).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PulldownFlag {
    Tables,
    Footnotes,
    OldFootnotes,
    Strikethrough,
    Tasklists,
    SmartPunctuation,
    HeadingAttributes,
    YamlMetadataBlocks,
    PlusesMetadataBlocks,
    Math,
    Gfm,
    DefinitionList,
    Superscript,
    Subscript,
    Wikilinks,
}

/// Native pulldown-cmark configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PulldownOptions {
    pub flags: BTreeSet<PulldownFlag>,
    pub raw_html: RawHtml,
    pub hardbreaks: bool,
    pub admonitions: bool,
}

impl PulldownOptions {
    /// Whether `flag` is enabled.
    #[must_use]
    pub fn has(&self, flag: PulldownFlag) -> bool {
        self.flags.contains(&flag)
    }
}

/// Backend-native options produced by [`normalize`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "engine", rename_all = "kebab-case")]
pub enum EngineOptions {
    Comrak(ComrakOptions),
    PulldownCmark(PulldownOptions),
}

impl EngineOptions {
    /// Engine these options target.
    #[must_use]
    pub fn engine(&self) -> ParserEngine {
        match self {
            Self::Comrak(_) => ParserEngine::Comrak,
            Self::PulldownCmark(_) => ParserEngine::PulldownCmark,
        }
    }
}

/// Comrak native extension names accepted in [`UnifiedOptions::extensions`].
pub const COMRAK_EXTENSIONS: &[&str] = &["greentext", "math_code"];

/// pulldown-cmark native extension names accepted in [`UnifiedOptions::extensions`].
pub const PULLDOWN_EXTENSIONS: &[&str] = &["old_footnotes", "yaml_metadata", "pluses_metadata"];

/// Translate unified options into `engine`'s native options.
///
/// Pure: equal inputs always produce equal outputs.
#[must_use]
pub fn normalize(unified: &UnifiedOptions, engine: ParserEngine) -> EngineOptions {
    log_unknown_extensions(unified, engine);
    match engine {
        ParserEngine::Comrak => EngineOptions::Comrak(normalize_comrak(unified)),
        ParserEngine::PulldownCmark => EngineOptions::PulldownCmark(normalize_pulldown(unified)),
    }
}

fn normalize_comrak(unified: &UnifiedOptions) -> ComrakOptions {
    use ComrakFlag as F;

    let gfm = unified.gfm;
    let math_code = unified.has_extension("math_code");
    let toggles = [
        (unified.strikethrough || gfm, F::Strikethrough),
        (unified.table || gfm, F::Table),
        (unified.autolink || gfm, F::Autolink),
        (unified.tasklist || gfm, F::Tasklist),
        (unified.tagfilter || gfm, F::Tagfilter),
        (unified.superscript, F::Superscript),
        (unified.subscript, F::Subscript),
        (unified.footnotes, F::Footnotes),
        (unified.description_lists, F::DescriptionLists),
        (unified.multiline_block_quotes, F::MultilineBlockQuotes),
        (unified.alerts || unified.admonitions, F::Alerts),
        (unified.math && !math_code, F::MathDollars),
        (math_code, F::MathCode),
        (unified.wikilinks, F::Wikilinks),
        (unified.underline, F::Underline),
        (unified.spoiler, F::Spoiler),
        (unified.shortcodes, F::Shortcodes),
        (unified.has_extension("greentext"), F::Greentext),
        (unified.smart_punctuation, F::Smart),
        (unified.relaxed_tasklist_matching, F::RelaxedTasklistMatching),
        (unified.relaxed_autolinks, F::RelaxedAutolinks),
        (unified.hardbreaks, F::Hardbreaks),
        (unified.github_pre_lang, F::GithubPreLang),
        (unified.full_info_string, F::FullInfoString),
        (unified.sourcepos, F::Sourcepos),
    ];

    ComrakOptions {
        flags: enabled(toggles),
        raw_html: RawHtml::from_unified(unified),
        header_ids: unified.heading_ids.clone(),
        front_matter_delimiter: unified.front_matter_delimiter.clone(),
        default_info_string: unified.default_info_string.clone(),
        width: unified.width,
        list_style: unified.list_style.unwrap_or_default(),
        admonitions: unified.admonitions,
    }
}

fn normalize_pulldown(unified: &UnifiedOptions) -> PulldownOptions {
    use PulldownFlag as F;

    let gfm = unified.gfm;
    let old_footnotes = unified.has_extension("old_footnotes");
    let delimiter = unified.front_matter_delimiter.as_deref();
    if let Some(other) = delimiter.filter(|d| !matches!(*d, "---" | "+++")) {
        tracing::debug!(
            engine = "pulldown-cmark",
            delimiter = other,
            "front matter delimiter not supported, dropping"
        );
    }

    let toggles = [
        (unified.table || gfm, F::Tables),
        (unified.strikethrough || gfm, F::Strikethrough),
        (unified.tasklist || gfm, F::Tasklists),
        (gfm || unified.alerts || unified.admonitions, F::Gfm),
        (unified.footnotes && !old_footnotes, F::Footnotes),
        (old_footnotes, F::OldFootnotes),
        (unified.smart_punctuation, F::SmartPunctuation),
        (unified.heading_attributes, F::HeadingAttributes),
        (
            delimiter == Some("---") || unified.has_extension("yaml_metadata"),
            F::YamlMetadataBlocks,
        ),
        (
            delimiter == Some("+++") || unified.has_extension("pluses_metadata"),
            F::PlusesMetadataBlocks,
        ),
        (unified.math, F::Math),
        (unified.description_lists, F::DefinitionList),
        (unified.superscript, F::Superscript),
        (unified.subscript, F::Subscript),
        (unified.wikilinks, F::Wikilinks),
    ];

    PulldownOptions {
        flags: enabled(toggles),
        raw_html: RawHtml::from_unified(unified),
        hardbreaks: unified.hardbreaks,
        admonitions: unified.admonitions,
    }
}

/// Native HTML to markdown style after normalization.
///
/// Skip tags are lowercased and trimmed so `"Script"` and `"script "` share a
/// cache entry.
#[must_use]
pub fn normalize_style(style: &MarkdownStyle) -> MarkdownStyle {
    MarkdownStyle {
        skip_tags: style
            .skip_tags
            .iter()
            .map(|tag| tag.trim().to_ascii_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect(),
        ..style.clone()
    }
}

fn enabled<F: Ord, const N: usize>(toggles: [(bool, F); N]) -> BTreeSet<F> {
    toggles
        .into_iter()
        .filter_map(|(on, flag)| on.then_some(flag))
        .collect()
}

fn log_unknown_extensions(unified: &UnifiedOptions, engine: ParserEngine) {
    let known = match engine {
        ParserEngine::Comrak => COMRAK_EXTENSIONS,
        ParserEngine::PulldownCmark => PULLDOWN_EXTENSIONS,
    };
    for name in unified
        .extensions
        .iter()
        .filter(|name| !known.contains(&name.as_str()))
    {
        tracing::debug!(engine = engine.name(), extension = %name, "unknown native extension, dropping");
    }
}

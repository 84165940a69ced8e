//! Engine-independent option vocabulary.
//!
//! [`UnifiedOptions`] names every feature any backend might support. A backend
//! that cannot honor a field ignores it; field names and meaning never change
//! between engines.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Bullet list marker used when a backend re-renders lists.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListMarker {
    /// `-`
    #[default]
    Dash,
    /// `+`
    Plus,
    /// `*`
    Star,
}

/// Unified markdown conversion options.
///
/// Defaults enable GitHub-style alerts and leave everything else off, which
/// renders plain `CommonMark` with raw HTML omitted.
///
/// # Example
///
/// ```
/// use mkdown_engines::UnifiedOptions;
///
/// let options = UnifiedOptions::default()
///     .with_gfm(true)
///     .with_extension("greentext");
/// assert!(options.gfm);
/// assert!(options.extensions.contains("greentext"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct UnifiedOptions {
    /// `~~deleted~~` text.
    pub strikethrough: bool,
    /// Pipe tables.
    pub table: bool,
    /// Bare URL and email autolinks.
    pub autolink: bool,
    /// `- [ ]` task list items.
    pub tasklist: bool,
    /// `[^1]` footnotes.
    pub footnotes: bool,
    /// `$inline$` and `$$display$$` math.
    pub math: bool,
    /// `^superscript^`.
    pub superscript: bool,
    /// `~subscript~`.
    pub subscript: bool,
    /// `__underline__`.
    pub underline: bool,
    /// `||spoiler||`.
    pub spoiler: bool,
    /// `:emoji:` shortcodes.
    pub shortcodes: bool,
    /// Definition lists.
    pub description_lists: bool,
    /// `> [!NOTE]` alert blockquotes.
    pub alerts: bool,
    /// `[[wiki links]]`.
    pub wikilinks: bool,
    /// `>>>` fenced block quotes.
    pub multiline_block_quotes: bool,
    /// `# Heading {#id .class}` attributes.
    pub heading_attributes: bool,
    /// Full GitHub Flavored Markdown feature set.
    pub gfm: bool,
    /// Smart quotes, dashes and ellipses.
    pub smart_punctuation: bool,
    /// Generate heading anchors using this id prefix.
    pub heading_ids: Option<String>,
    /// Front matter delimiter (e.g., `---`).
    pub front_matter_delimiter: Option<String>,
    /// Info string applied to fenced code blocks without one.
    pub default_info_string: Option<String>,
    /// Relaxed autolink recognition.
    pub relaxed_autolinks: bool,
    /// Accept any character as a task list check mark.
    pub relaxed_tasklist_matching: bool,
    /// Render soft line breaks as hard breaks.
    pub hardbreaks: bool,
    /// Emit `<pre lang="x">` instead of a language class.
    pub github_pre_lang: bool,
    /// Keep the full info string of fenced code blocks.
    pub full_info_string: bool,
    /// Emit `data-sourcepos` attributes.
    pub sourcepos: bool,
    /// Pass raw HTML through unchanged.
    pub unsafe_html: bool,
    /// Escape raw HTML instead of omitting it.
    pub escape_html: bool,
    /// Filter dangerous tags (`<script>`, `<iframe>`, ...) per GFM.
    pub tagfilter: bool,
    /// Wrap column for re-rendered output (0 = no wrapping).
    pub width: usize,
    /// Bullet marker for re-rendered lists (`None` = backend default).
    pub list_style: Option<ListMarker>,
    /// Convert `!!! type "title"` admonitions into alert blockquotes first.
    pub admonitions: bool,
    /// Backend-native extension names (e.g., `greentext`, `old_footnotes`).
    pub extensions: BTreeSet<String>,
}

impl Default for UnifiedOptions {
    fn default() -> Self {
        Self {
            strikethrough: false,
            table: false,
            autolink: false,
            tasklist: false,
            footnotes: false,
            math: false,
            superscript: false,
            subscript: false,
            underline: false,
            spoiler: false,
            shortcodes: false,
            description_lists: false,
            alerts: true,
            wikilinks: false,
            multiline_block_quotes: false,
            heading_attributes: false,
            gfm: false,
            smart_punctuation: false,
            heading_ids: None,
            front_matter_delimiter: None,
            default_info_string: None,
            relaxed_autolinks: false,
            relaxed_tasklist_matching: false,
            hardbreaks: false,
            github_pre_lang: false,
            full_info_string: false,
            sourcepos: false,
            unsafe_html: false,
            escape_html: false,
            tagfilter: false,
            width: 0,
            list_style: None,
            admonitions: false,
            extensions: BTreeSet::new(),
        }
    }
}

impl UnifiedOptions {
    /// Enable or disable the full GFM feature set.
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Pass raw HTML through unchanged.
    #[must_use]
    pub fn with_unsafe_html(mut self, enabled: bool) -> Self {
        self.unsafe_html = enabled;
        self
    }

    /// Add a backend-native extension name.
    #[must_use]
    pub fn with_extension(mut self, name: impl Into<String>) -> Self {
        self.extensions.insert(name.into());
        self
    }

    /// Whether a backend-native extension name was requested.
    #[must_use]
    pub fn has_extension(&self, name: &str) -> bool {
        self.extensions.contains(name)
    }

    /// Features this option set asks for, in unified vocabulary.
    ///
    /// `gfm` is expanded into the features it implies so callers can compare
    /// the result against an adapter's [`supported_features`].
    ///
    /// [`supported_features`]: crate::Parser::supported_features
    #[must_use]
    pub fn requested_features(&self) -> BTreeSet<FeatureTag> {
        let toggles = [
            (self.strikethrough || self.gfm, FeatureTag::Strikethrough),
            (self.table || self.gfm, FeatureTag::Table),
            (self.autolink || self.gfm, FeatureTag::Autolink),
            (self.tasklist || self.gfm, FeatureTag::Tasklist),
            (self.tagfilter || self.gfm, FeatureTag::Tagfilter),
            (self.footnotes, FeatureTag::Footnotes),
            (self.math, FeatureTag::Math),
            (self.superscript, FeatureTag::Superscript),
            (self.subscript, FeatureTag::Subscript),
            (self.underline, FeatureTag::Underline),
            (self.spoiler, FeatureTag::Spoiler),
            (self.shortcodes, FeatureTag::Shortcodes),
            (self.description_lists, FeatureTag::DescriptionLists),
            (self.alerts || self.admonitions, FeatureTag::Alerts),
            (self.wikilinks, FeatureTag::Wikilinks),
            (self.multiline_block_quotes, FeatureTag::MultilineBlockQuotes),
            (self.heading_attributes, FeatureTag::HeadingAttributes),
            (self.smart_punctuation, FeatureTag::SmartPunctuation),
            (self.heading_ids.is_some(), FeatureTag::HeadingIds),
            (self.front_matter_delimiter.is_some(), FeatureTag::FrontMatter),
            (self.default_info_string.is_some(), FeatureTag::DefaultInfoString),
            (self.relaxed_autolinks, FeatureTag::RelaxedAutolinks),
            (self.relaxed_tasklist_matching, FeatureTag::RelaxedTasklistMatching),
            (self.hardbreaks, FeatureTag::Hardbreaks),
            (self.github_pre_lang, FeatureTag::GithubPreLang),
            (self.full_info_string, FeatureTag::FullInfoString),
            (self.sourcepos, FeatureTag::Sourcepos),
            (self.unsafe_html, FeatureTag::UnsafeHtml),
            (self.escape_html, FeatureTag::EscapeHtml),
            (self.width > 0, FeatureTag::Width),
            (self.list_style.is_some(), FeatureTag::ListStyle),
            (self.admonitions, FeatureTag::Admonitions),
        ];
        toggles
            .into_iter()
            .filter_map(|(enabled, tag)| enabled.then_some(tag))
            .collect()
    }
}

/// A capability an adapter can report through `supported_features()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureTag {
    BasicMarkdown,
    FencedCode,
    Strikethrough,
    Table,
    Autolink,
    Tasklist,
    Tagfilter,
    Footnotes,
    Math,
    Superscript,
    Subscript,
    Underline,
    Spoiler,
    Shortcodes,
    DescriptionLists,
    Alerts,
    Wikilinks,
    MultilineBlockQuotes,
    HeadingAttributes,
    SmartPunctuation,
    HeadingIds,
    FrontMatter,
    DefaultInfoString,
    RelaxedAutolinks,
    RelaxedTasklistMatching,
    Hardbreaks,
    GithubPreLang,
    FullInfoString,
    Sourcepos,
    UnsafeHtml,
    EscapeHtml,
    Width,
    ListStyle,
    Admonitions,
}

impl FeatureTag {
    /// Stable `snake_case` name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BasicMarkdown => "basic_markdown",
            Self::FencedCode => "fenced_code",
            Self::Strikethrough => "strikethrough",
            Self::Table => "table",
            Self::Autolink => "autolink",
            Self::Tasklist => "tasklist",
            Self::Tagfilter => "tagfilter",
            Self::Footnotes => "footnotes",
            Self::Math => "math",
            Self::Superscript => "superscript",
            Self::Subscript => "subscript",
            Self::Underline => "underline",
            Self::Spoiler => "spoiler",
            Self::Shortcodes => "shortcodes",
            Self::DescriptionLists => "description_lists",
            Self::Alerts => "alerts",
            Self::Wikilinks => "wikilinks",
            Self::MultilineBlockQuotes => "multiline_block_quotes",
            Self::HeadingAttributes => "heading_attributes",
            Self::SmartPunctuation => "smart_punctuation",
            Self::HeadingIds => "heading_ids",
            Self::FrontMatter => "front_matter",
            Self::DefaultInfoString => "default_info_string",
            Self::RelaxedAutolinks => "relaxed_autolinks",
            Self::RelaxedTasklistMatching => "relaxed_tasklist_matching",
            Self::Hardbreaks => "hardbreaks",
            Self::GithubPreLang => "github_pre_lang",
            Self::FullInfoString => "full_info_string",
            Self::Sourcepos => "sourcepos",
            Self::UnsafeHtml => "unsafe_html",
            Self::EscapeHtml => "escape_html",
            Self::Width => "width",
            Self::ListStyle => "list_style",
            Self::Admonitions => "admonitions",
        }
    }
}

impl fmt::Display for FeatureTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

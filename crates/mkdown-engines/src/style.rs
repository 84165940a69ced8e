//! Output style for HTML to markdown conversion.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Heading syntax.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingStyle {
    /// `# Heading`
    #[default]
    Atx,
    /// Underlined with `===` / `---`.
    Setext,
}

/// Link syntax.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStyle {
    /// `[text](url)`
    #[default]
    Inline,
    /// `[text][1]` with definitions at the end.
    Reference,
}

/// Code block syntax.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeBlockStyle {
    /// Fenced with backticks or tildes.
    #[default]
    Fenced,
    /// Indented by four spaces.
    Indented,
}

/// Fence characters for fenced code blocks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeFenceStyle {
    #[default]
    Backticks,
    Tildes,
}

/// Bullet list marker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListMarkerStyle {
    #[default]
    Asterisk,
    Dash,
}

/// Hard line break syntax.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineBreakStyle {
    /// Two trailing spaces.
    #[default]
    Spaces,
    /// Trailing backslash.
    Backslash,
}

/// Thematic break syntax.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HorizontalRuleStyle {
    /// `* * *`
    #[default]
    Asterisks,
    /// `- - -`
    Dashes,
    /// `_ _ _`
    Underscores,
}

/// Markdown style produced by HTML to markdown conversion.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkdownStyle {
    pub heading_style: HeadingStyle,
    pub link_style: LinkStyle,
    pub code_block_style: CodeBlockStyle,
    pub code_fence_style: CodeFenceStyle,
    pub list_marker_style: ListMarkerStyle,
    pub line_break_style: LineBreakStyle,
    pub hr_style: HorizontalRuleStyle,
    /// Keep whitespace of `<pre>` content verbatim.
    pub preformatted_code: bool,
    /// Tags dropped together with their content.
    pub skip_tags: BTreeSet<String>,
}

impl MarkdownStyle {
    /// Drop `tag` and its content during conversion.
    #[must_use]
    pub fn with_skip_tag(mut self, tag: impl Into<String>) -> Self {
        self.skip_tags.insert(tag.into());
        self
    }
}

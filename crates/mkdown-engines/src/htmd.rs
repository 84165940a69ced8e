//! htmd backend for HTML to markdown conversion.

use htmd::HtmlToMarkdown as Htmd;
use htmd::options::{
    BrStyle, BulletListMarker, CodeBlockFence, CodeBlockStyle as HtmdCodeBlockStyle,
    HeadingStyle as HtmdHeadingStyle, HrStyle, LinkStyle as HtmdLinkStyle, Options,
};

use crate::engine::HtmlToMarkdown;
use crate::error::EngineError;
use crate::style::{
    CodeBlockStyle, CodeFenceStyle, HeadingStyle, HorizontalRuleStyle, LineBreakStyle,
    LinkStyle, ListMarkerStyle, MarkdownStyle,
};

const NAME: &str = "htmd";

/// HTML to markdown converter backed by htmd.
#[derive(Clone, Debug)]
pub struct HtmdConverter {
    style: MarkdownStyle,
}

impl HtmdConverter {
    #[must_use]
    pub fn new(style: MarkdownStyle) -> Self {
        Self { style }
    }

    fn options(&self) -> Options {
        let s = &self.style;
        Options {
            heading_style: match s.heading_style {
                HeadingStyle::Atx => HtmdHeadingStyle::Atx,
                HeadingStyle::Setext => HtmdHeadingStyle::Setex,
            },
            hr_style: match s.hr_style {
                HorizontalRuleStyle::Asterisks => HrStyle::Asterisks,
                HorizontalRuleStyle::Dashes => HrStyle::Dashes,
                HorizontalRuleStyle::Underscores => HrStyle::Underscores,
            },
            br_style: match s.line_break_style {
                LineBreakStyle::Spaces => BrStyle::TwoSpaces,
                LineBreakStyle::Backslash => BrStyle::Backslash,
            },
            link_style: match s.link_style {
                LinkStyle::Inline => HtmdLinkStyle::Inlined,
                LinkStyle::Reference => HtmdLinkStyle::Referenced,
            },
            code_block_style: match s.code_block_style {
                CodeBlockStyle::Fenced => HtmdCodeBlockStyle::Fenced,
                CodeBlockStyle::Indented => HtmdCodeBlockStyle::Indented,
            },
            code_block_fence: match s.code_fence_style {
                CodeFenceStyle::Backticks => CodeBlockFence::Backticks,
                CodeFenceStyle::Tildes => CodeBlockFence::Tildes,
            },
            bullet_list_marker: match s.list_marker_style {
                ListMarkerStyle::Asterisk => BulletListMarker::Asterisk,
                ListMarkerStyle::Dash => BulletListMarker::Dash,
            },
            preformatted_code: s.preformatted_code,
            ..Options::default()
        }
    }
}

impl HtmlToMarkdown for HtmdConverter {
    fn name(&self) -> &'static str {
        NAME
    }

    fn convert(&self, html: &str) -> Result<String, EngineError> {
        let skip_tags: Vec<&str> = self.style.skip_tags.iter().map(String::as_str).collect();
        let converter = Htmd::builder()
            .options(self.options())
            .skip_tags(skip_tags)
            .build();

        crate::guard(NAME, || converter.convert(html))?.map_err(|e| EngineError::Conversion {
            engine: NAME,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "<h1>Title</h1><p>Some <em>text</em> and <a href=\"https://example.com\">a link</a>.</p>";

    #[test]
    fn test_default_style_uses_atx_and_inline_links() {
        let md = HtmdConverter::new(MarkdownStyle::default()).convert(DOC).unwrap();

        assert!(md.starts_with("# Title"), "got {md}");
        assert!(md.contains("text"));
        assert!(md.contains("[a link](https://example.com)"), "got {md}");
    }

    #[test]
    fn test_setext_headings() {
        let style = MarkdownStyle {
            heading_style: HeadingStyle::Setext,
            ..MarkdownStyle::default()
        };
        let md = HtmdConverter::new(style).convert(DOC).unwrap();

        assert!(md.starts_with("Title\n="), "got {md}");
    }

    #[test]
    fn test_list_marker_and_fences() {
        let style = MarkdownStyle {
            list_marker_style: ListMarkerStyle::Dash,
            code_fence_style: CodeFenceStyle::Tildes,
            ..MarkdownStyle::default()
        };
        let md = HtmdConverter::new(style)
            .convert("<ul><li>one</li></ul><pre><code>let x = 1;</code></pre>")
            .unwrap();

        assert!(md.contains("- one"), "got {md}");
        assert!(md.contains("~~~"), "got {md}");
    }

    #[test]
    fn test_skip_tags_drop_content() {
        let style = MarkdownStyle::default().with_skip_tag("aside");
        let md = HtmdConverter::new(style)
            .convert("<p>keep</p><aside>drop me</aside>")
            .unwrap();

        assert!(md.contains("keep"));
        assert!(!md.contains("drop me"), "got {md}");
    }
}

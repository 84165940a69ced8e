//! pulldown-cmark backend.
//!
//! pulldown-cmark has no render-time options, so raw HTML policy and hard
//! breaks are applied by rewriting the event stream before `push_html`.

use std::collections::BTreeSet;

use pulldown_cmark::{CowStr, Event, Options, Parser as EventParser, Tag, TagEnd, html};

use crate::admonition::convert_admonitions;
use crate::engine::Parser;
use crate::error::EngineError;
use crate::normalize::{PulldownFlag as F, PulldownOptions, RawHtml};
use crate::options::FeatureTag;

const NAME: &str = "pulldown-cmark";
const OMITTED: &str = "<!-- raw HTML omitted -->";

/// Markdown parser backed by pulldown-cmark.
#[derive(Clone, Debug)]
pub struct PulldownParser {
    options: PulldownOptions,
}

impl PulldownParser {
    #[must_use]
    pub fn new(options: PulldownOptions) -> Self {
        Self { options }
    }

    /// Get parser options for the enabled flags.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        self.options
            .flags
            .iter()
            .fold(Options::empty(), |acc, flag| acc | flag_option(*flag))
    }

    fn render(&self, markdown: &str) -> String {
        let raw_html = self.options.raw_html;
        let hardbreaks = self.options.hardbreaks;
        let mut in_html_block = false;

        let events = EventParser::new_ext(markdown, self.parser_options()).filter_map(|event| {
            match event {
                Event::Start(Tag::HtmlBlock) => {
                    in_html_block = true;
                    match raw_html {
                        RawHtml::Omit => Some(Event::Html(CowStr::Borrowed(OMITTED))),
                        RawHtml::Render | RawHtml::Escape => Some(event),
                    }
                }
                Event::End(TagEnd::HtmlBlock) => {
                    in_html_block = false;
                    match raw_html {
                        RawHtml::Omit => Some(Event::Html(CowStr::Borrowed("\n"))),
                        RawHtml::Render | RawHtml::Escape => Some(event),
                    }
                }
                Event::Html(text) => match raw_html {
                    RawHtml::Render => Some(Event::Html(text)),
                    RawHtml::Escape => Some(Event::Text(text)),
                    RawHtml::Omit => None,
                },
                Event::InlineHtml(text) => match raw_html {
                    RawHtml::Render => Some(Event::InlineHtml(text)),
                    RawHtml::Escape => Some(Event::Text(text)),
                    RawHtml::Omit if in_html_block => None,
                    RawHtml::Omit => Some(Event::InlineHtml(CowStr::Borrowed(OMITTED))),
                },
                Event::SoftBreak if hardbreaks => Some(Event::HardBreak),
                other => Some(other),
            }
        });

        let mut output = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut output, events);
        output
    }
}

fn flag_option(flag: F) -> Options {
    match flag {
        F::Tables => Options::ENABLE_TABLES,
        F::Footnotes => Options::ENABLE_FOOTNOTES,
        F::OldFootnotes => Options::ENABLE_OLD_FOOTNOTES,
        F::Strikethrough => Options::ENABLE_STRIKETHROUGH,
        F::Tasklists => Options::ENABLE_TASKLISTS,
        F::SmartPunctuation => Options::ENABLE_SMART_PUNCTUATION,
        F::HeadingAttributes => Options::ENABLE_HEADING_ATTRIBUTES,
        F::YamlMetadataBlocks => Options::ENABLE_YAML_STYLE_METADATA_BLOCKS,
        F::PlusesMetadataBlocks => Options::ENABLE_PLUSES_DELIMITED_METADATA_BLOCKS,
        F::Math => Options::ENABLE_MATH,
        F::Gfm => Options::ENABLE_GFM,
        F::DefinitionList => Options::ENABLE_DEFINITION_LIST,
        F::Superscript => Options::ENABLE_SUPERSCRIPT,
        F::Subscript => Options::ENABLE_SUBSCRIPT,
        F::Wikilinks => Options::ENABLE_WIKILINKS,
    }
}

impl Parser for PulldownParser {
    fn name(&self) -> &'static str {
        NAME
    }

    fn supported_features(&self) -> BTreeSet<FeatureTag> {
        use FeatureTag as T;

        BTreeSet::from([
            T::BasicMarkdown,
            T::FencedCode,
            T::Strikethrough,
            T::Table,
            T::Tasklist,
            T::Footnotes,
            T::Math,
            T::Superscript,
            T::Subscript,
            T::DescriptionLists,
            T::Alerts,
            T::Wikilinks,
            T::HeadingAttributes,
            T::SmartPunctuation,
            T::FrontMatter,
            T::Hardbreaks,
            T::UnsafeHtml,
            T::EscapeHtml,
            T::Admonitions,
        ])
    }

    fn convert(&self, markdown: &str) -> Result<String, EngineError> {
        let source = if self.options.admonitions {
            convert_admonitions(markdown)
        } else {
            markdown.into()
        };
        crate::guard(NAME, || self.render(&source))
    }
}

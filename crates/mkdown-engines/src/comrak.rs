//! comrak backend.

use std::collections::BTreeSet;

use comrak::{ListStyleType, Options};

use crate::admonition::convert_admonitions;
use crate::engine::Parser;
use crate::error::EngineError;
use crate::normalize::{ComrakFlag as F, ComrakOptions, RawHtml};
use crate::options::{FeatureTag, ListMarker};

const NAME: &str = "comrak";

/// Markdown parser backed by comrak.
///
/// Holds the normalized flag set and builds comrak's `Options` on each call.
#[derive(Clone, Debug)]
pub struct ComrakParser {
    options: ComrakOptions,
}

impl ComrakParser {
    #[must_use]
    pub fn new(options: ComrakOptions) -> Self {
        Self { options }
    }

    /// Build comrak's native options.
    fn native(&self) -> Options<'static> {
        let o = &self.options;
        let mut options = Options::default();

        let ext = &mut options.extension;
        ext.strikethrough = o.has(F::Strikethrough);
        ext.tagfilter = o.has(F::Tagfilter);
        ext.table = o.has(F::Table);
        ext.autolink = o.has(F::Autolink);
        ext.tasklist = o.has(F::Tasklist);
        ext.superscript = o.has(F::Superscript);
        ext.subscript = o.has(F::Subscript);
        ext.footnotes = o.has(F::Footnotes);
        ext.description_lists = o.has(F::DescriptionLists);
        ext.multiline_block_quotes = o.has(F::MultilineBlockQuotes);
        ext.alerts = o.has(F::Alerts);
        ext.math_dollars = o.has(F::MathDollars);
        ext.math_code = o.has(F::MathCode);
        ext.wikilinks_title_after_pipe = o.has(F::Wikilinks);
        ext.underline = o.has(F::Underline);
        ext.spoiler = o.has(F::Spoiler);
        ext.shortcodes = o.has(F::Shortcodes);
        ext.greentext = o.has(F::Greentext);
        ext.header_ids.clone_from(&o.header_ids);
        ext.front_matter_delimiter.clone_from(&o.front_matter_delimiter);

        let parse = &mut options.parse;
        parse.smart = o.has(F::Smart);
        parse.relaxed_tasklist_matching = o.has(F::RelaxedTasklistMatching);
        parse.relaxed_autolinks = o.has(F::RelaxedAutolinks);
        parse.default_info_string.clone_from(&o.default_info_string);

        let render = &mut options.render;
        render.hardbreaks = o.has(F::Hardbreaks);
        render.github_pre_lang = o.has(F::GithubPreLang);
        render.full_info_string = o.has(F::FullInfoString);
        render.sourcepos = o.has(F::Sourcepos);
        render.width = o.width;
        render.unsafe_ = o.raw_html == RawHtml::Render;
        render.escape = o.raw_html == RawHtml::Escape;
        render.list_style = match o.list_style {
            ListMarker::Dash => ListStyleType::Dash,
            ListMarker::Plus => ListStyleType::Plus,
            ListMarker::Star => ListStyleType::Star,
        };

        options
    }
}

impl Parser for ComrakParser {
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
            T::Autolink,
            T::Tasklist,
            T::Tagfilter,
            T::Footnotes,
            T::Math,
            T::Superscript,
            T::Subscript,
            T::Underline,
            T::Spoiler,
            T::Shortcodes,
            T::DescriptionLists,
            T::Alerts,
            T::Wikilinks,
            T::MultilineBlockQuotes,
            T::SmartPunctuation,
            T::HeadingIds,
            T::FrontMatter,
            T::DefaultInfoString,
            T::RelaxedAutolinks,
            T::RelaxedTasklistMatching,
            T::Hardbreaks,
            T::GithubPreLang,
            T::FullInfoString,
            T::Sourcepos,
            T::UnsafeHtml,
            T::EscapeHtml,
            T::Width,
            T::ListStyle,
            T::Admonitions,
        ])
    }

    fn convert(&self, markdown: &str) -> Result<String, EngineError> {
        let source = if self.options.admonitions {
            convert_admonitions(markdown)
        } else {
            markdown.into()
        };
        let options = self.native();
        crate::guard(NAME, || comrak::markdown_to_html(&source, &options))
    }
}

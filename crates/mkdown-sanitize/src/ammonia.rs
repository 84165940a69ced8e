//! ammonia backend.
//!
//! ammonia always removes disallowed tags, so this backend only serves strip
//! mode. The factory routes escape mode elsewhere.

use std::collections::{HashMap, HashSet};

use ammonia::Builder;

use crate::markup::restore_leading_newlines;
use crate::{ANY_TAG, Sanitizer, SanitizerOptions};

const NAME: &str = "ammonia";

/// Tags removed together with their content when not allowed.
const CLEAN_CONTENT_TAGS: &[&str] = &["script", "style"];

/// Sanitizer backed by ammonia.
#[derive(Clone, Debug)]
pub struct AmmoniaSanitizer {
    options: SanitizerOptions,
}

impl AmmoniaSanitizer {
    #[must_use]
    pub fn new(options: SanitizerOptions) -> Self {
        Self { options }
    }

    fn builder(&self) -> Builder<'_> {
        let allow = &self.options.allow_list;

        let clean_content: HashSet<&str> = CLEAN_CONTENT_TAGS
            .iter()
            .copied()
            .filter(|tag| !allow.allows_tag(tag))
            .collect();
        let generic: HashSet<&str> = allow
            .attributes
            .get(ANY_TAG)
            .map(|attrs| attrs.iter().map(String::as_str).collect())
            .unwrap_or_default();
        // ammonia rejects attribute entries for clean-content tags.
        let per_tag: HashMap<&str, HashSet<&str>> = allow
            .attributes
            .iter()
            .filter(|(tag, _)| tag.as_str() != ANY_TAG && !clean_content.contains(tag.as_str()))
            .map(|(tag, attrs)| (tag.as_str(), attrs.iter().map(String::as_str).collect()))
            .collect();

        let mut builder = Builder::empty();
        builder
            .tags(allow.tags.iter().map(String::as_str).collect())
            .clean_content_tags(clean_content)
            .generic_attributes(generic)
            .tag_attributes(per_tag)
            .url_schemes(allow.protocols.iter().map(String::as_str).collect())
            .link_rel(None)
            .strip_comments(self.options.strip_comments);
        builder
    }
}

impl Sanitizer for AmmoniaSanitizer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn sanitize(&self, html: &str) -> String {
        // ammonia's serializer drops the newline the parser swallows after <pre>.
        restore_leading_newlines(&self.builder().clean(html).to_string())
    }
}

//! HTML sanitization for mkdown.
//!
//! Every backend implements the same allow-list contract, so the observable
//! result depends on the [`AllowList`] and not on the backend:
//!
//! - only allow-listed tags survive; attributes survive only when allowed for
//!   that tag (or for every tag through the `"*"` entry)
//! - URL attributes survive only with a relative URL or an allowed protocol
//! - disallowed tags are removed with their markup kept as text content when
//!   `strip` is set, or re-emitted as escaped text otherwise; `script` and
//!   `style` content is dropped entirely in strip mode
//! - comments are removed when `strip_comments` is set
//! - SVG and MathML content is removed together with its text
//!
//! Backends are resolved at runtime by [`SanitizerFactory`].
//!
//! # Example
//!
//! ```
//! use mkdown_sanitize::{SanitizerFactory, SanitizerOptions};
//!
//! let sanitizer = SanitizerFactory::new()
//!     .create(&SanitizerOptions::default(), None)
//!     .unwrap();
//! let clean = sanitizer.sanitize("<p onclick=\"x()\">Hi<script>alert(1)</script></p>");
//! assert_eq!(clean, "<p>Hi</p>");
//! ```

#[cfg(feature = "ammonia")]
mod ammonia;
mod dom;
mod error;
mod factory;
pub mod markup;

use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "ammonia")]
pub use self::ammonia::AmmoniaSanitizer;
pub use dom::DomSanitizer;
pub use error::SanitizerError;
pub use factory::{SanitizerBackend, SanitizerFactory};

/// Attribute key that applies to every allowed tag.
pub const ANY_TAG: &str = "*";

/// Attributes checked against the protocol allow-list.
pub(crate) const URL_ATTRIBUTES: &[&str] = &["href", "src", "cite", "action", "poster"];

/// Removes everything outside an allow-list from an HTML fragment.
pub trait Sanitizer: Send + Sync {
    /// Stable backend identifier.
    fn name(&self) -> &'static str;

    /// Sanitize `html`.
    ///
    /// Sanitizing already sanitized output with the same options returns it
    /// unchanged.
    fn sanitize(&self, html: &str) -> String;
}

/// Tags, attributes and URL protocols allowed through sanitization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllowList {
    pub tags: BTreeSet<String>,
    /// Tag name (or [`ANY_TAG`]) to allowed attribute names.
    pub attributes: BTreeMap<String, BTreeSet<String>>,
    pub protocols: BTreeSet<String>,
}

impl Default for AllowList {
    /// Everything the markdown backends emit for ordinary documents.
    fn default() -> Self {
        const TAGS: &[&str] = &[
            "a", "abbr", "b", "blockquote", "br", "code", "dd", "del", "details", "div", "dl",
            "dt", "em", "figcaption", "figure", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "i",
            "img", "input", "ins", "kbd", "li", "mark", "ol", "p", "pre", "s", "section", "span",
            "strong", "sub", "summary", "sup", "table", "tbody", "td", "tfoot", "th", "thead",
            "tr", "u", "ul",
        ];
        let attributes = [
            (ANY_TAG, &["class", "id", "title"][..]),
            ("a", &["href", "title"][..]),
            ("img", &["src", "alt", "title", "width", "height"][..]),
            ("input", &["type", "checked", "disabled"][..]),
            ("ol", &["start"][..]),
            ("td", &["align", "colspan", "rowspan"][..]),
            ("th", &["align", "colspan", "rowspan"][..]),
        ];

        Self {
            tags: TAGS.iter().map(|t| (*t).to_owned()).collect(),
            attributes: attributes
                .into_iter()
                .map(|(tag, attrs)| {
                    (
                        tag.to_owned(),
                        attrs.iter().map(|a| (*a).to_owned()).collect(),
                    )
                })
                .collect(),
            protocols: ["http", "https", "mailto"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

impl AllowList {
    /// Whether `tag` survives sanitization.
    #[must_use]
    pub fn allows_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Whether attribute `attr` survives on `tag`.
    #[must_use]
    pub fn allows_attribute(&self, tag: &str, attr: &str) -> bool {
        [tag, ANY_TAG].iter().any(|key| {
            self.attributes
                .get(*key)
                .is_some_and(|attrs| attrs.contains(attr))
        })
    }

    /// Whether `url` is relative or uses an allowed protocol.
    ///
    /// ASCII whitespace and control characters are ignored when detecting the
    /// scheme, as browsers do (`java\tscript:` is `javascript:`).
    #[must_use]
    pub fn allows_url(&self, url: &str) -> bool {
        let compact: String = url
            .chars()
            .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
            .collect();
        match url_scheme(&compact) {
            Some(scheme) => self.protocols.contains(&scheme.to_ascii_lowercase()),
            None => true,
        }
    }
}

/// Extract the scheme of an absolute URL, `None` for relative URLs.
fn url_scheme(url: &str) -> Option<&str> {
    let colon = url.find(':')?;
    let candidate = &url[..colon];
    let mut chars = candidate.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    valid.then_some(candidate)
}

/// Options shared by every sanitizer backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SanitizerOptions {
    pub allow_list: AllowList,
    /// Remove disallowed tags (`true`) or escape them (`false`).
    pub strip: bool,
    /// Remove HTML comments.
    pub strip_comments: bool,
}

impl Default for SanitizerOptions {
    fn default() -> Self {
        Self {
            allow_list: AllowList::default(),
            strip: true,
            strip_comments: true,
        }
    }
}

impl SanitizerOptions {
    /// Escape disallowed tags instead of stripping them.
    #[must_use]
    pub fn escaping(mut self) -> Self {
        self.strip = false;
        self
    }
}

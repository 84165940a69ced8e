//! Tree representations handed to tree stages.
//!
//! [`StandardTree`] is the html5ever reference DOM and is always available.
//! [`RichTree`] wraps kuchikikiki, which adds CSS selectors and in-place
//! mutation helpers, behind the `rich-tree` feature.
//!
//! Both parse the input as a full document and serialize the children of
//! `<body>` back, so fragments round-trip as fragments.

use std::fmt;
use std::str::FromStr;

use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use html5ever::tendril::TendrilSink;
use html5ever::{ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

use crate::error::{StageError, UnknownTreeKind};

/// A parsed HTML tree.
pub trait Tree: Sized {
    /// Representation identifier used in logs.
    const KIND: &'static str;

    /// Parse `html` into a tree. HTML parsing never fails.
    fn parse(html: &str) -> Self;

    /// Serialize the body content back to HTML.
    fn to_html(&self) -> Result<String, StageError>;
}

/// Selects a tree representation by name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TreeKind {
    #[default]
    Standard,
    Rich,
}

impl TreeKind {
    pub const ALL: [Self; 2] = [Self::Standard, Self::Rich];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Standard => StandardTree::KIND,
            Self::Rich => "rich",
        }
    }

    /// Whether the representation was compiled into this build.
    #[must_use]
    pub fn is_compiled(self) -> bool {
        match self {
            Self::Standard => true,
            Self::Rich => cfg!(feature = "rich-tree"),
        }
    }
}

impl fmt::Display for TreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TreeKind {
    type Err = UnknownTreeKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == normalized)
            .ok_or_else(|| UnknownTreeKind(s.to_owned()))
    }
}

/// html5ever reference DOM.
pub struct StandardTree {
    dom: RcDom,
}

impl StandardTree {
    /// Document root.
    #[must_use]
    pub fn document(&self) -> &Handle {
        &self.dom.document
    }

    /// The `<body>` element; html5ever always synthesizes one.
    #[must_use]
    pub fn body(&self) -> Option<Handle> {
        self.find_first("body")
    }

    /// First element named `tag` in document order.
    #[must_use]
    pub fn find_first(&self, tag: &str) -> Option<Handle> {
        find_first(&self.dom.document, tag)
    }

    /// Concatenated text of `node` and its descendants.
    #[must_use]
    pub fn text_content(node: &Handle) -> String {
        let mut out = String::new();
        collect_text(node, &mut out);
        out
    }

    /// Serialize `node` including its own tag.
    pub fn outer_html(node: &Handle) -> Result<String, StageError> {
        serialize_handle(node, TraversalScope::IncludeNode)
    }
}

impl Tree for StandardTree {
    const KIND: &'static str = "standard";

    fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);
        Self { dom }
    }

    fn to_html(&self) -> Result<String, StageError> {
        match self.body() {
            Some(body) => serialize_handle(&body, TraversalScope::ChildrenOnly(None)),
            None => Ok(String::new()),
        }
    }
}

fn find_first(node: &Handle, tag: &str) -> Option<Handle> {
    if let NodeData::Element { name, .. } = &node.data
        && name.local.as_ref() == tag
    {
        return Some(node.clone());
    }
    node.children
        .borrow()
        .iter()
        .find_map(|child| find_first(child, tag))
}

fn collect_text(node: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &node.data {
        out.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        collect_text(child, out);
    }
}

fn serialize_handle(node: &Handle, traversal_scope: TraversalScope) -> Result<String, StageError> {
    let mut buf = Vec::new();
    let opts = SerializeOpts {
        traversal_scope,
        ..SerializeOpts::default()
    };
    serialize(&mut buf, &SerializableHandle::from(node.clone()), opts)?;
    String::from_utf8(buf)
        .map_err(|e| StageError::Serialize(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// kuchikikiki DOM with CSS selector support.
#[cfg(feature = "rich-tree")]
pub struct RichTree {
    document: kuchikikiki::NodeRef,
}

#[cfg(feature = "rich-tree")]
impl RichTree {
    /// Document root.
    #[must_use]
    pub fn document(&self) -> &kuchikikiki::NodeRef {
        &self.document
    }
}

#[cfg(feature = "rich-tree")]
impl Tree for RichTree {
    const KIND: &'static str = "rich";

    fn parse(html: &str) -> Self {
        use kuchikikiki::traits::TendrilSink;

        Self {
            document: kuchikikiki::parse_html().one(html),
        }
    }

    fn to_html(&self) -> Result<String, StageError> {
        let Ok(body) = self.document.select_first("body") else {
            return Ok(String::new());
        };
        let mut buf = Vec::new();
        for child in body.as_node().children() {
            child.serialize(&mut buf)?;
        }
        String::from_utf8(buf)
            .map_err(|e| StageError::Serialize(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const FRAGMENT: &str = "<h1 id=\"t\">Title</h1><p>Some <em>text</em> &amp; more<br></p>";

    #[test]
    fn test_standard_tree_round_trips_fragment() {
        let tree = StandardTree::parse(FRAGMENT);

        assert_eq!(tree.to_html().unwrap(), FRAGMENT);
    }

    #[test]
    fn test_standard_tree_queries() {
        let tree = StandardTree::parse(FRAGMENT);
        let p = tree.find_first("p").unwrap();

        assert_eq!(StandardTree::text_content(&p), "Some text & more");
        assert_eq!(
            StandardTree::outer_html(&tree.find_first("em").unwrap()).unwrap(),
            "<em>text</em>"
        );
        assert!(tree.find_first("table").is_none());
    }

    #[cfg(feature = "rich-tree")]
    #[test]
    fn test_rich_tree_round_trips_fragment() {
        let tree = RichTree::parse(FRAGMENT);

        assert_eq!(tree.to_html().unwrap(), FRAGMENT);
        assert_eq!(
            tree.document().select_first("em").unwrap().text_contents(),
            "text"
        );
    }

    #[test]
    fn test_parse_tree_kind() {
        assert_eq!(" Rich ".parse::<TreeKind>().unwrap(), TreeKind::Rich);
        assert_eq!("standard".parse::<TreeKind>().unwrap(), TreeKind::Standard);

        let err = "lxml".parse::<TreeKind>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unknown tree representation 'lxml' (expected one of: standard, rich)"
        );
    }
}

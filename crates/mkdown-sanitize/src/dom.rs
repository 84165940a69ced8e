//! Sanitizer built on the html5ever reference DOM.
//!
//! Parses the input as a `<div>` fragment and re-serializes it while walking
//! the tree, so everything not emitted explicitly is dropped. Supports both
//! strip and escape mode. SVG and MathML subtrees are dropped in both modes.

use html5ever::tendril::TendrilSink;
use html5ever::{ParseOpts, QualName, local_name, ns, parse_fragment};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::markup::{
    LEADING_NEWLINE_ELEMENTS, RAW_TEXT_ELEMENTS, VOID_ELEMENTS, escape_attribute, escape_text,
};
use crate::{Sanitizer, SanitizerOptions, URL_ATTRIBUTES};

const NAME: &str = "dom";

/// Elements removed together with their content in strip mode.
const CLEAN_CONTENT_ELEMENTS: &[&str] = &["script", "style"];

/// Tree-walking sanitizer with no dependencies beyond the HTML parser.
#[derive(Clone, Debug)]
pub struct DomSanitizer {
    options: SanitizerOptions,
}

impl DomSanitizer {
    #[must_use]
    pub fn new(options: SanitizerOptions) -> Self {
        Self { options }
    }

    fn walk_children(&self, node: &Handle, raw: bool, out: &mut String) {
        for child in node.children.borrow().iter() {
            self.walk(child, raw, out);
        }
    }

    fn walk(&self, node: &Handle, raw: bool, out: &mut String) {
        match &node.data {
            NodeData::Text { contents } => {
                let text = contents.borrow();
                if raw {
                    out.push_str(&text);
                } else {
                    escape_text(&text, out);
                }
            }
            NodeData::Comment { contents } => {
                if !self.options.strip_comments {
                    out.push_str("<!--");
                    out.push_str(contents);
                    out.push_str("-->");
                }
            }
            NodeData::Element { name, .. } if name.ns != ns!(html) => {}
            NodeData::Element { name, attrs, .. } => {
                let tag = name.local.as_ref();
                let allow = &self.options.allow_list;

                if allow.allows_tag(tag) {
                    out.push('<');
                    out.push_str(tag);
                    for attr in attrs.borrow().iter() {
                        let attr_name = attr.name.local.as_ref();
                        if !allow.allows_attribute(tag, attr_name) {
                            continue;
                        }
                        if URL_ATTRIBUTES.contains(&attr_name) && !allow.allows_url(&attr.value) {
                            continue;
                        }
                        out.push(' ');
                        out.push_str(attr_name);
                        out.push_str("=\"");
                        escape_attribute(&attr.value, out);
                        out.push('"');
                    }
                    out.push('>');
                    if VOID_ELEMENTS.contains(&tag) {
                        return;
                    }
                    if LEADING_NEWLINE_ELEMENTS.contains(&tag) && starts_with_newline(node) {
                        out.push('\n');
                    }
                    self.walk_children(node, RAW_TEXT_ELEMENTS.contains(&tag), out);
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                } else if self.options.strip {
                    if !CLEAN_CONTENT_ELEMENTS.contains(&tag) {
                        self.walk_children(node, false, out);
                    }
                } else {
                    let mut open = format!("<{tag}");
                    for attr in attrs.borrow().iter() {
                        open.push(' ');
                        open.push_str(attr.name.local.as_ref());
                        open.push_str("=\"");
                        escape_attribute(&attr.value, &mut open);
                        open.push('"');
                    }
                    open.push('>');
                    escape_text(&open, out);
                    if VOID_ELEMENTS.contains(&tag) {
                        return;
                    }
                    self.walk_children(node, false, out);
                    escape_text(&format!("</{tag}>"), out);
                }
            }
            _ => {}
        }
    }
}

impl Sanitizer for DomSanitizer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn sanitize(&self, html: &str) -> String {
        let context = QualName::new(None, ns!(html), local_name!("div"));
        let dom = parse_fragment(RcDom::default(), ParseOpts::default(), context, vec![], false)
            .one(html);

        let mut out = String::with_capacity(html.len());
        // Fragment parsing places the content under a synthetic <html> root.
        for root in dom.document.children.borrow().iter() {
            if matches!(&root.data, NodeData::Element { .. }) {
                self.walk_children(root, false, &mut out);
            }
        }
        out
    }
}

fn starts_with_newline(node: &Handle) -> bool {
    node.children.borrow().first().is_some_and(|child| {
        matches!(&child.data, NodeData::Text { contents } if contents.borrow().starts_with('\n'))
    })
}

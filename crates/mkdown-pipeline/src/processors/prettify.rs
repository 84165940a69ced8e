//! Pretty-printing stage.

use markup5ever_rcdom::{Handle, NodeData};
use mkdown_sanitize::markup::{
    VOID_ELEMENTS, escape_attribute, escape_text, restore_leading_newlines,
};

use crate::error::StageError;
use crate::stage::PostProcessor;
use crate::tree::{StandardTree, Tree};

/// Elements emitted verbatim because whitespace inside them is significant.
const PRESERVE_ELEMENTS: &[&str] = &["pre", "textarea", "script", "style"];

/// Re-indents HTML with one node per line.
///
/// Text is trimmed and whitespace-only text nodes are dropped, so the output
/// is for reading, not for byte-exact comparison.
pub struct Prettify {
    indent: usize,
    priority: i32,
}

impl Default for Prettify {
    fn default() -> Self {
        Self {
            indent: 1,
            priority: Self::DEFAULT_PRIORITY,
        }
    }
}

impl Prettify {
    pub const DEFAULT_PRIORITY: i32 = 40;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spaces per nesting level.
    #[must_use]
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    fn write_node(&self, node: &Handle, depth: usize, out: &mut String) -> Result<(), StageError> {
        let pad = " ".repeat(depth * self.indent);
        match &node.data {
            NodeData::Text { contents } => {
                let text = contents.borrow();
                let text = text.trim();
                if !text.is_empty() {
                    out.push_str(&pad);
                    escape_text(text, out);
                    out.push('\n');
                }
            }
            NodeData::Comment { contents } => {
                out.push_str(&pad);
                out.push_str("<!--");
                out.push_str(contents);
                out.push_str("-->\n");
            }
            NodeData::Element { name, attrs, .. } => {
                let tag = name.local.as_ref();
                out.push_str(&pad);
                if PRESERVE_ELEMENTS.contains(&tag) {
                    out.push_str(&restore_leading_newlines(&StandardTree::outer_html(node)?));
                    out.push('\n');
                    return Ok(());
                }

                out.push('<');
                out.push_str(tag);
                for attr in attrs.borrow().iter() {
                    out.push(' ');
                    out.push_str(attr.name.local.as_ref());
                    out.push_str("=\"");
                    escape_attribute(&attr.value, out);
                    out.push('"');
                }
                out.push_str(">\n");
                if VOID_ELEMENTS.contains(&tag) {
                    return Ok(());
                }

                for child in node.children.borrow().iter() {
                    self.write_node(child, depth + 1, out)?;
                }
                out.push_str(&pad);
                out.push_str("</");
                out.push_str(tag);
                out.push_str(">\n");
            }
            _ => {}
        }
        Ok(())
    }
}

impl PostProcessor for Prettify {
    fn name(&self) -> &'static str {
        "prettify"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn process_html(&mut self, html: &str) -> Result<String, StageError> {
        let tree = StandardTree::parse(html);
        let mut out = String::with_capacity(html.len() * 2);
        if let Some(body) = tree.body() {
            for child in body.children.borrow().iter() {
                self.write_node(child, 0, &mut out)?;
            }
        }
        Ok(out)
    }
}

//! Title extraction stage.
//!
//! The title is the text of the first `<h1>`. A trailing anchor (the
//! permalink many renderers append to headings) is left out when nothing but
//! whitespace follows it. Runs of whitespace collapse to single spaces. The
//! tree itself is never modified.

use markup5ever_rcdom::{Handle, NodeData};

use crate::error::StageError;
use crate::metadata::ExtractedMetadata;
use crate::stage::{FailurePolicy, TreeChange, TreeProcessor};
use crate::tree::StandardTree;
#[cfg(feature = "rich-tree")]
use crate::tree::RichTree;

/// Extracts the document title from the first `<h1>`.
///
/// Failures are logged and skipped rather than aborting the conversion.
#[derive(Debug)]
pub struct ExtractTitle {
    title: Option<String>,
    priority: i32,
}

impl Default for ExtractTitle {
    fn default() -> Self {
        Self {
            title: None,
            priority: Self::DEFAULT_PRIORITY,
        }
    }
}

impl ExtractTitle {
    pub const DEFAULT_PRIORITY: i32 = -10;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Title found by the last run.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    fn record(&mut self, text: Option<String>) {
        self.title = text
            .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|t| !t.is_empty());
        match &self.title {
            Some(title) => tracing::debug!(%title, "extracted title"),
            None => tracing::debug!("no title found"),
        }
    }

    fn metadata_for(&self) -> ExtractedMetadata {
        ExtractedMetadata {
            title: self.title.clone(),
            ..ExtractedMetadata::default()
        }
    }
}

impl TreeProcessor<StandardTree> for ExtractTitle {
    fn name(&self) -> &'static str {
        "extract-title"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn process_tree(&mut self, tree: &mut StandardTree) -> Result<TreeChange, StageError> {
        let text = tree.find_first("h1").map(|h1| standard_heading_text(&h1));
        self.record(text);
        Ok(TreeChange::Unchanged)
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Skip
    }

    fn metadata(&self) -> ExtractedMetadata {
        self.metadata_for()
    }
}

fn standard_heading_text(h1: &Handle) -> String {
    let children = h1.children.borrow();
    let is_element = |node: &Handle| matches!(node.data, NodeData::Element { .. });
    let trailing_anchor = children.iter().rposition(is_element).filter(|&i| {
        matches!(&children[i].data, NodeData::Element { name, .. } if name.local.as_ref() == "a")
            && children[i + 1..]
                .iter()
                .all(|n| StandardTree::text_content(n).trim().is_empty())
    });

    children
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != trailing_anchor)
        .map(|(_, node)| StandardTree::text_content(node))
        .collect()
}

#[cfg(feature = "rich-tree")]
impl TreeProcessor<RichTree> for ExtractTitle {
    fn name(&self) -> &'static str {
        "extract-title"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn process_tree(&mut self, tree: &mut RichTree) -> Result<TreeChange, StageError> {
        let text = tree
            .document()
            .select_first("h1")
            .ok()
            .map(|h1| rich_heading_text(h1.as_node()));
        self.record(text);
        Ok(TreeChange::Unchanged)
    }

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Skip
    }

    fn metadata(&self) -> ExtractedMetadata {
        self.metadata_for()
    }
}

#[cfg(feature = "rich-tree")]
fn rich_heading_text(h1: &kuchikikiki::NodeRef) -> String {
    let children: Vec<_> = h1.children().collect();
    let trailing_anchor = children
        .iter()
        .rposition(|n| n.as_element().is_some())
        .filter(|&i| {
            children[i]
                .as_element()
                .is_some_and(|e| AsRef::<str>::as_ref(&e.name.local) == "a")
                && children[i + 1..]
                    .iter()
                    .all(|n| n.text_contents().trim().is_empty())
        });

    children
        .iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != trailing_anchor)
        .map(|(_, node)| node.text_contents())
        .collect()
}

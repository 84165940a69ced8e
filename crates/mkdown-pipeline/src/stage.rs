//! Stage contracts.

use crate::error::StageError;
use crate::metadata::ExtractedMetadata;
#[cfg(feature = "rich-tree")]
use crate::tree::RichTree;
use crate::tree::StandardTree;

/// Transforms an HTML string.
pub trait PostProcessor: Send {
    fn name(&self) -> &'static str;

    /// Higher runs earlier.
    fn priority(&self) -> i32;

    fn process_html(&mut self, html: &str) -> Result<String, StageError>;

    /// Metadata gathered by the last run.
    fn metadata(&self) -> ExtractedMetadata {
        ExtractedMetadata::default()
    }
}

/// Whether a tree stage changed the tree it was given.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TreeChange {
    /// The tree is untouched; the pipeline keeps the input HTML as is.
    Unchanged,
    /// The tree was mutated and must be serialized.
    Modified,
}

/// What the pipeline does when a tree stage fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort the pipeline with a `ProcessingError`.
    #[default]
    Propagate,
    /// Log a warning and continue with the tree unchanged.
    Skip,
}

/// Inspects or mutates a parsed tree of representation `T`.
pub trait TreeProcessor<T>: Send {
    fn name(&self) -> &'static str;

    /// Higher runs earlier.
    fn priority(&self) -> i32;

    fn process_tree(&mut self, tree: &mut T) -> Result<TreeChange, StageError>;

    fn failure_policy(&self) -> FailurePolicy {
        FailurePolicy::Propagate
    }

    /// Metadata gathered by the last run.
    fn metadata(&self) -> ExtractedMetadata {
        ExtractedMetadata::default()
    }
}

/// A registered pipeline stage.
///
/// Tree stages are tagged with their representation, so a processor only
/// ever receives the tree type it implements.
pub enum Stage {
    Html(Box<dyn PostProcessor>),
    Standard(Box<dyn TreeProcessor<StandardTree>>),
    #[cfg(feature = "rich-tree")]
    Rich(Box<dyn TreeProcessor<RichTree>>),
}

impl Stage {
    pub fn html(processor: impl PostProcessor + 'static) -> Self {
        Self::Html(Box::new(processor))
    }

    pub fn standard(processor: impl TreeProcessor<StandardTree> + 'static) -> Self {
        Self::Standard(Box::new(processor))
    }

    #[cfg(feature = "rich-tree")]
    pub fn rich(processor: impl TreeProcessor<RichTree> + 'static) -> Self {
        Self::Rich(Box::new(processor))
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Html(p) => p.name(),
            Self::Standard(p) => p.name(),
            #[cfg(feature = "rich-tree")]
            Self::Rich(p) => p.name(),
        }
    }

    #[must_use]
    pub fn priority(&self) -> i32 {
        match self {
            Self::Html(p) => p.priority(),
            Self::Standard(p) => p.priority(),
            #[cfg(feature = "rich-tree")]
            Self::Rich(p) => p.priority(),
        }
    }

    #[must_use]
    pub fn metadata(&self) -> ExtractedMetadata {
        match self {
            Self::Html(p) => p.metadata(),
            Self::Standard(p) => p.metadata(),
            #[cfg(feature = "rich-tree")]
            Self::Rich(p) => p.metadata(),
        }
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Self::Html(_) => "html",
            Self::Standard(_) => "standard",
            #[cfg(feature = "rich-tree")]
            Self::Rich(_) => "rich",
        };
        f.debug_struct("Stage")
            .field("name", &self.name())
            .field("kind", &kind)
            .field("priority", &self.priority())
            .finish()
    }
}

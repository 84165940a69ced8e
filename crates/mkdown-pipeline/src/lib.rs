//! Post-processing pipeline for rendered HTML.
//!
//! A [`Pipeline`] holds an ordered set of stages and runs them by descending
//! priority, feeding each stage the output of the previous one:
//!
//! - [`PostProcessor`] stages transform the HTML string directly
//! - [`TreeProcessor`] stages receive a parsed tree, either a
//!   [`StandardTree`] or (with the `rich-tree` feature) a [`RichTree`]
//!
//! A failing stage aborts the run with a [`ProcessingError`] naming it. Tree
//! stages declaring [`FailurePolicy::Skip`] are the exception: their failures
//! are logged and the HTML passes through unchanged.
//!
//! # Example
//!
//! ```
//! use mkdown_pipeline::{ExtractTitle, Pipeline, Prettify, Stage};
//!
//! let mut pipeline = Pipeline::new()
//!     .with_stage(Stage::standard(ExtractTitle::new()))
//!     .with_stage(Stage::html(Prettify::new()));
//!
//! let output = pipeline.run("<h1>Guide</h1><p>Intro</p>").unwrap();
//! assert_eq!(output.metadata.title.as_deref(), Some("Guide"));
//! assert!(output.html.starts_with("<h1>\n Guide\n</h1>"));
//! ```

mod error;
mod metadata;
mod pipeline;
mod processors;
mod stage;
mod tree;

pub use error::{ProcessingError, StageError, UnknownTreeKind};
pub use metadata::ExtractedMetadata;
pub use pipeline::{Pipeline, PipelineOutput};
pub use processors::{ExtractTitle, Prettify, SanitizeHtml};
pub use stage::{FailurePolicy, PostProcessor, Stage, TreeChange, TreeProcessor};
#[cfg(feature = "rich-tree")]
pub use tree::RichTree;
pub use tree::{StandardTree, Tree, TreeKind};

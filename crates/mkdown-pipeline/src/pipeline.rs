//! Stage runner.

use std::any::Any;
use std::cmp::Reverse;
use std::panic::{AssertUnwindSafe, catch_unwind};

use crate::error::{ProcessingError, StageError};
use crate::metadata::ExtractedMetadata;
use crate::stage::{FailurePolicy, Stage, TreeChange, TreeProcessor};
use crate::tree::Tree;

/// Final HTML plus metadata collected from the stages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PipelineOutput {
    pub html: String,
    pub metadata: ExtractedMetadata,
}

/// Ordered chain of post-processing stages.
///
/// Stages run by descending priority. Stages with equal priority run in
/// registration order.
#[derive(Debug, Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a stage.
    #[must_use]
    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.push(stage);
        self
    }

    /// Register a stage.
    pub fn push(&mut self, stage: Stage) {
        self.stages.push(stage);
        self.stages.sort_by_key(|s| Reverse(s.priority()));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stage names in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(Stage::name).collect()
    }

    /// Run every stage over `html`.
    ///
    /// The first failing stage aborts the run, except tree stages with
    /// [`FailurePolicy::Skip`], which are logged and treated as no-ops. A
    /// panicking tree stage counts as a failing one.
    pub fn run(&mut self, html: &str) -> Result<PipelineOutput, ProcessingError> {
        let mut current = html.to_owned();

        for stage in &mut self.stages {
            let name = stage.name();
            let result = match stage {
                Stage::Html(processor) => processor.process_html(&current),
                Stage::Standard(processor) => run_tree(processor.as_mut(), &current),
                #[cfg(feature = "rich-tree")]
                Stage::Rich(processor) => run_tree(processor.as_mut(), &current),
            };
            match result {
                Ok(html) => current = html,
                Err(source) => return Err(ProcessingError { stage: name, source }),
            }
        }

        let mut metadata = ExtractedMetadata::default();
        for stage in &self.stages {
            metadata.merge(stage.metadata());
        }

        Ok(PipelineOutput {
            html: current,
            metadata,
        })
    }
}

fn run_tree<T: Tree>(processor: &mut dyn TreeProcessor<T>, html: &str) -> Result<String, StageError> {
    let mut tree = T::parse(html);
    let outcome = catch_unwind(AssertUnwindSafe(|| processor.process_tree(&mut tree)))
        .unwrap_or_else(|payload| Err(StageError::Panicked(panic_message(payload.as_ref()))))
        .and_then(|change| match change {
            TreeChange::Unchanged => Ok(html.to_owned()),
            TreeChange::Modified => tree.to_html(),
        });

    match outcome {
        Err(error) if processor.failure_policy() == FailurePolicy::Skip => {
            tracing::warn!(
                stage = processor.name(),
                tree = T::KIND,
                %error,
                "tree stage failed, continuing with unchanged HTML"
            );
            Ok(html.to_owned())
        }
        other => other,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_owned())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::stage::PostProcessor;
    use crate::tree::StandardTree;

    type Log = Arc<Mutex<Vec<String>>>;

    /// Appends its label to the HTML and records that it ran.
    struct Recorder {
        label: &'static str,
        priority: i32,
        log: Log,
        fail: bool,
    }

    impl Recorder {
        fn new(label: &'static str, priority: i32, log: &Log) -> Self {
            Self {
                label,
                priority,
                log: Arc::clone(log),
                fail: false,
            }
        }

        fn failing(mut self) -> Self {
            self.fail = true;
            self
        }
    }

    impl PostProcessor for Recorder {
        fn name(&self) -> &'static str {
            self.label
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn process_html(&mut self, html: &str) -> Result<String, StageError> {
            self.log.lock().unwrap().push(self.label.to_owned());
            if self.fail {
                return Err(StageError::failed("boom"));
            }
            Ok(format!("{html}[{}]", self.label))
        }
    }

    struct FailingTree {
        policy: FailurePolicy,
    }

    impl TreeProcessor<StandardTree> for FailingTree {
        fn name(&self) -> &'static str {
            "failing-tree"
        }

        fn priority(&self) -> i32 {
            0
        }

        fn process_tree(&mut self, _tree: &mut StandardTree) -> Result<TreeChange, StageError> {
            Err(StageError::failed("tree exploded"))
        }

        fn failure_policy(&self) -> FailurePolicy {
            self.policy
        }
    }

    struct PanickingTree {
        policy: FailurePolicy,
    }

    impl TreeProcessor<StandardTree> for PanickingTree {
        fn name(&self) -> &'static str {
            "panicking-tree"
        }

        fn priority(&self) -> i32 {
            0
        }

        fn process_tree(&mut self, _tree: &mut StandardTree) -> Result<TreeChange, StageError> {
            let headings: Vec<&str> = Vec::new();
            Err(StageError::failed(headings[0]))
        }

        fn failure_policy(&self) -> FailurePolicy {
            self.policy
        }
    }

    #[test]
    fn test_stages_run_by_descending_priority_then_registration() {
        let log = Log::default();
        let mut pipeline = Pipeline::new()
            .with_stage(Stage::html(Recorder::new("one", 1, &log)))
            .with_stage(Stage::html(Recorder::new("five-a", 5, &log)))
            .with_stage(Stage::html(Recorder::new("ten", 10, &log)))
            .with_stage(Stage::html(Recorder::new("five-b", 5, &log)));

        let output = pipeline.run("x").unwrap();

        assert_eq!(*log.lock().unwrap(), ["ten", "five-a", "five-b", "one"]);
        assert_eq!(output.html, "x[ten][five-a][five-b][one]");
        assert_eq!(pipeline.stage_names(), ["ten", "five-a", "five-b", "one"]);
    }

    #[test]
    fn test_failing_stage_aborts_pipeline() {
        let log = Log::default();
        let mut pipeline = Pipeline::new()
            .with_stage(Stage::html(Recorder::new("ten", 10, &log)))
            .with_stage(Stage::html(Recorder::new("five", 5, &log).failing()))
            .with_stage(Stage::html(Recorder::new("one", 1, &log)));

        let err = pipeline.run("x").unwrap_err();

        assert_eq!(err.stage, "five");
        assert!(matches!(err.source, StageError::Failed(ref m) if m == "boom"));
        assert_eq!(*log.lock().unwrap(), ["ten", "five"]);
    }

    #[test]
    fn test_skip_policy_leaves_html_unchanged() {
        let mut pipeline = Pipeline::new().with_stage(Stage::standard(FailingTree {
            policy: FailurePolicy::Skip,
        }));

        let output = pipeline.run("<p>kept</p>").unwrap();

        assert_eq!(output.html, "<p>kept</p>");
    }

    #[test]
    fn test_skip_policy_survives_panicking_stage() {
        let log = Log::default();
        let mut pipeline = Pipeline::new()
            .with_stage(Stage::standard(PanickingTree {
                policy: FailurePolicy::Skip,
            }))
            .with_stage(Stage::html(Recorder::new("after", -1, &log)));

        let output = pipeline.run("<p>x</p>").unwrap();

        assert_eq!(output.html, "<p>x</p>[after]");
        assert_eq!(*log.lock().unwrap(), ["after"]);
    }

    #[test]
    fn test_propagate_policy_reports_panic_as_error() {
        let mut pipeline = Pipeline::new().with_stage(Stage::standard(PanickingTree {
            policy: FailurePolicy::Propagate,
        }));

        let err = pipeline.run("<p>x</p>").unwrap_err();

        assert_eq!(err.stage, "panicking-tree");
        assert!(
            matches!(err.source, StageError::Panicked(ref m) if m.contains("index out of bounds")),
            "Expected Panicked, got {err:?}"
        );
    }

    #[test]
    fn test_propagate_policy_surfaces_tree_failure() {
        let mut pipeline = Pipeline::new().with_stage(Stage::standard(FailingTree {
            policy: FailurePolicy::Propagate,
        }));

        let err = pipeline.run("<p>x</p>").unwrap_err();

        assert_eq!(err.stage, "failing-tree");
        assert!(err.to_string().contains("tree exploded"));
    }

    #[test]
    fn test_empty_pipeline_returns_input() {
        let output = Pipeline::new().run("<p>x</p>").unwrap();

        assert_eq!(output, PipelineOutput {
            html: "<p>x</p>".to_owned(),
            metadata: ExtractedMetadata::default(),
        });
    }
}

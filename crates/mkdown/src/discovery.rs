//! Backend availability report.

use std::fmt;
use std::sync::OnceLock;

use mkdown_engines::{EngineRegistry, HtmlEngine, ParserEngine};
use mkdown_sanitize::{SanitizerBackend, SanitizerFactory};

/// Backends that can be used, per capability, in preference order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackendReport {
    pub parsers: Vec<ParserEngine>,
    pub html_to_markdown: Vec<HtmlEngine>,
    pub sanitizers: Vec<SanitizerBackend>,
    /// Whether tree stages can use the rich tree representation.
    pub rich_tree: bool,
}

impl BackendReport {
    /// Probe `registry` and `sanitizers` without instantiating any backend.
    #[must_use]
    pub fn probe(registry: &EngineRegistry, sanitizers: &SanitizerFactory) -> Self {
        Self {
            parsers: registry.available_parsers(),
            html_to_markdown: registry.available_html_engines(),
            sanitizers: sanitizers.available(),
            rich_tree: cfg!(feature = "rich-tree"),
        }
    }
}

impl fmt::Display for BackendReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list<T: fmt::Display>(items: &[T]) -> String {
            if items.is_empty() {
                return "none".to_owned();
            }
            items
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        }

        writeln!(f, "markdown to HTML: {}", list(&self.parsers))?;
        writeln!(f, "HTML to markdown: {}", list(&self.html_to_markdown))?;
        writeln!(f, "sanitizers: {}", list(&self.sanitizers))?;
        write!(f, "rich tree: {}", if self.rich_tree { "yes" } else { "no" })
    }
}

/// Backends compiled into this build.
///
/// Probed on first call and reused for the rest of the process.
pub fn available_backends() -> &'static BackendReport {
    static REPORT: OnceLock<BackendReport> = OnceLock::new();
    REPORT.get_or_init(|| {
        let report = BackendReport::probe(&EngineRegistry::new(), &SanitizerFactory::new());
        tracing::debug!(
            parsers = ?report.parsers,
            html_to_markdown = ?report.html_to_markdown,
            sanitizers = ?report.sanitizers,
            "probed available backends"
        );
        report
    })
}

//! Sanitization stage.

use mkdown_sanitize::Sanitizer;

use crate::error::StageError;
use crate::stage::PostProcessor;

/// Runs a [`Sanitizer`] over the rendered HTML.
pub struct SanitizeHtml {
    sanitizer: Box<dyn Sanitizer>,
    priority: i32,
}

impl SanitizeHtml {
    pub const DEFAULT_PRIORITY: i32 = 50;

    #[must_use]
    pub fn new(sanitizer: Box<dyn Sanitizer>) -> Self {
        Self {
            sanitizer,
            priority: Self::DEFAULT_PRIORITY,
        }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

impl PostProcessor for SanitizeHtml {
    fn name(&self) -> &'static str {
        "sanitize"
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn process_html(&mut self, html: &str) -> Result<String, StageError> {
        tracing::debug!(backend = self.sanitizer.name(), "sanitizing HTML");
        Ok(self.sanitizer.sanitize(html))
    }
}

#[cfg(test)]
mod tests {
    use mkdown_sanitize::{SanitizerFactory, SanitizerOptions};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_sanitizes_html() {
        let sanitizer = SanitizerFactory::new()
            .create(&SanitizerOptions::default(), None)
            .unwrap();
        let mut stage = SanitizeHtml::new(sanitizer);

        let html = stage
            .process_html("<p>ok<script>alert(1)</script></p>")
            .unwrap();

        assert_eq!(html, "<p>ok</p>");
        assert_eq!(stage.priority(), 50);
        assert_eq!(stage.with_priority(7).priority(), 7);
    }
}

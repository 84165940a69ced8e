//! Side-channel output collected from stages.

use std::collections::BTreeMap;

/// Metadata produced by stages alongside the HTML.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExtractedMetadata {
    /// Document title, if a stage extracted one.
    pub title: Option<String>,
    /// Free-form values keyed by name.
    pub values: BTreeMap<String, String>,
}

impl ExtractedMetadata {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.values.is_empty()
    }

    /// Fold `other` into `self`. The first title wins; later values override.
    pub(crate) fn merge(&mut self, other: Self) {
        if self.title.is_none() {
            self.title = other.title;
        }
        self.values.extend(other.values);
    }
}

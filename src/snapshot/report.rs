//! Failure reporting and per-run merge results.

use crate::ynab::YnabError;

/// Observability sink for lookups that failed. Fire-and-forget.
pub trait FailureReporter: Send + Sync {
    fn report_failure(&self, category_id: &str, error: &YnabError);
}

/// Logs each failed lookup as a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl FailureReporter for TracingReporter {
    fn report_failure(&self, category_id: &str, error: &YnabError) {
        tracing::warn!(
            category_id,
            transient = error.is_transient(),
            "Error loading category: {}",
            error
        );
    }
}

/// Outcome of one fetch-and-merge run.
///
/// Every dispatched category id appears exactly once, in either list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Categories whose month figures were merged, in completion order.
    pub merged: Vec<String>,
    /// Categories left unchanged because their lookup failed.
    pub failed: Vec<String>,
}

impl MergeReport {
    pub fn resolved(&self) -> usize {
        self.merged.len() + self.failed.len()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

//! One snapshot over every budget the token can see.

use super::SnapshotEngine;
use crate::month::Month;
use crate::sink::{visible_rows, CategorySink};
use crate::ynab::YnabError;

/// Counters for a finished snapshot run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub budgets: usize,
    pub budgets_failed: usize,
    pub rows: usize,
    pub lookups_merged: usize,
    pub lookups_failed: usize,
}

/// List budgets, merge `month` figures into each budget's categories and hand
/// the visible ones to `sink`.
///
/// # Errors
///
/// Only a failure to list budgets is returned. A budget whose categories
/// cannot be listed is logged and skipped; sink errors are logged per row.
pub async fn run_snapshot(
    engine: &SnapshotEngine,
    month: Month,
    sink: &mut dyn CategorySink,
    include_empty: bool,
) -> Result<RunSummary, YnabError> {
    let budgets = engine.client().list_budgets().await?;
    tracing::info!(count = budgets.len(), month = %month, "Loaded budgets");

    let mut summary = RunSummary::default();
    for budget in &budgets {
        summary.budgets += 1;

        let mut groups = match engine.client().list_categories(&budget.id).await {
            Ok(groups) => groups,
            Err(e) => {
                tracing::error!(budget_id = %budget.id, "Error listing categories: {}", e);
                summary.budgets_failed += 1;
                continue;
            }
        };

        let report = engine.merge_month(&budget.id, month, &mut groups).await;
        summary.lookups_merged += report.merged.len();
        summary.lookups_failed += report.failed.len();

        sink.begin_budget(budget);
        for row in visible_rows(budget, &groups, include_empty) {
            let category_id = row.category_id.clone();
            match sink.accept(row) {
                Ok(()) => summary.rows += 1,
                Err(e) => tracing::error!(%category_id, "Error writing snapshot row: {}", e),
            }
        }
    }

    tracing::info!(
        budgets = summary.budgets,
        budgets_failed = summary.budgets_failed,
        rows = summary.rows,
        "Snapshot finished"
    );
    Ok(summary)
}

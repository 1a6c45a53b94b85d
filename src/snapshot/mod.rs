//! Month snapshot engine.
//!
//! Given a budget's category tree (from the bulk listing) and a target month,
//! the engine fetches every category's figures for that month concurrently and
//! merges them back into the tree in place.
//!
//! ## Flow
//! 1. `current` month: return immediately, the listing already has the figures.
//! 2. Dispatch: one detached task per category, each admitted by a shared
//!    [`RateGovernor`] before it calls the API.
//! 3. Collect: poll the handles until every one has resolved, merging successes
//!    and reporting failures. A failed lookup never aborts the batch.

mod collect;
mod dispatch;
mod governor;
mod merge;
mod report;
mod run;

pub use collect::collect;
pub use dispatch::{dispatch, LookupHandle, LookupResult};
pub use governor::{IntervalGovernor, RateGovernor};
pub use merge::MergePolicy;
pub use report::{FailureReporter, MergeReport, TracingReporter};
pub use run::{run_snapshot, RunSummary};

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;
use crate::month::{Month, MonthError};
use crate::ynab::{CategoryGroup, YnabClient};

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    InvalidMonth(#[from] MonthError),
}

/// Tuning for a fetch-and-merge run.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Minimum spacing between outbound lookups.
    pub rate_interval: Duration,
    /// Pause between collector passes.
    pub poll_interval: Duration,
    pub merge_policy: MergePolicy,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            rate_interval: Duration::from_millis(50),
            poll_interval: Duration::from_millis(50),
            merge_policy: MergePolicy::Full,
        }
    }
}

impl From<&Config> for EngineOptions {
    fn from(config: &Config) -> Self {
        Self {
            rate_interval: config.rate_limit_interval,
            poll_interval: config.poll_interval,
            merge_policy: config.merge_policy,
        }
    }
}

pub struct SnapshotEngine {
    client: Arc<dyn YnabClient>,
    reporter: Arc<dyn FailureReporter>,
    options: EngineOptions,
}

impl SnapshotEngine {
    /// Create an engine that logs failed lookups through `tracing`.
    pub fn new(client: Arc<dyn YnabClient>, options: EngineOptions) -> Self {
        Self {
            client,
            reporter: Arc::new(TracingReporter),
            options,
        }
    }

    /// Replace the failure reporter.
    pub fn with_reporter(mut self, reporter: Arc<dyn FailureReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn client(&self) -> &Arc<dyn YnabClient> {
        &self.client
    }

    /// Fetch `month` figures for every category in `groups` and return the tree
    /// with the results merged in.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::InvalidMonth` if `month` is neither `current`
    /// nor `YYYY-MM`; nothing is dispatched in that case. Individual lookup
    /// failures are reported and never fail the operation.
    pub async fn fetch_and_merge(
        &self,
        budget_id: &str,
        month: &str,
        mut groups: Vec<CategoryGroup>,
    ) -> Result<Vec<CategoryGroup>, SnapshotError> {
        let month: Month = month.parse()?;
        self.merge_month(budget_id, month, &mut groups).await;
        Ok(groups)
    }

    /// Merge `month` figures into `groups` in place, with a fresh governor for
    /// this run.
    pub async fn merge_month(
        &self,
        budget_id: &str,
        month: Month,
        groups: &mut [CategoryGroup],
    ) -> MergeReport {
        if month.is_current() {
            tracing::debug!(budget_id, "Current month requested, using listing figures");
            return MergeReport::default();
        }
        let governor: Arc<dyn RateGovernor> =
            Arc::new(IntervalGovernor::new(self.options.rate_interval));
        self.merge_month_with_governor(budget_id, month, groups, governor)
            .await
    }

    /// Like [`merge_month`](Self::merge_month), admitting lookups through the
    /// given governor.
    pub async fn merge_month_with_governor(
        &self,
        budget_id: &str,
        month: Month,
        groups: &mut [CategoryGroup],
        governor: Arc<dyn RateGovernor>,
    ) -> MergeReport {
        if month.is_current() {
            return MergeReport::default();
        }

        let handles = dispatch(&self.client, &governor, budget_id, month, groups);
        tracing::info!(
            budget_id,
            month = %month,
            lookups = handles.len(),
            "Dispatched category lookups"
        );

        let report = collect(
            handles,
            self.options.merge_policy,
            self.reporter.as_ref(),
            self.options.poll_interval,
        )
        .await;

        if report.is_complete_success() {
            tracing::info!(budget_id, merged = report.merged.len(), "Merged month figures");
        } else {
            tracing::warn!(
                budget_id,
                merged = report.merged.len(),
                failed = report.failed.len(),
                "Merged month figures with failed lookups"
            );
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ynab::{Budget, Category, InMemoryYnabClient, YnabError};
    use async_trait::async_trait;
    use rand::Rng;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Instant;

    const MONTH: &str = "2024-03";

    fn month() -> Month {
        MONTH.parse().unwrap()
    }

    fn category(id: &str, group_id: &str, budgeted: i64, balance: i64) -> Category {
        Category {
            id: id.to_string(),
            category_group_id: group_id.to_string(),
            name: format!("Category {}", id),
            budgeted,
            balance,
            ..Default::default()
        }
    }

    /// `n` categories spread over two groups, all zeroed.
    fn tree(n: usize) -> Vec<CategoryGroup> {
        let mut groups = vec![
            CategoryGroup {
                id: "g1".to_string(),
                name: "Bills".to_string(),
                ..Default::default()
            },
            CategoryGroup {
                id: "g2".to_string(),
                name: "Fun".to_string(),
                ..Default::default()
            },
        ];
        for i in 0..n {
            let group = &mut groups[i % 2];
            let listed = category(&format!("c{}", i), &group.id, 0, 0);
            group.categories.push(listed);
        }
        groups
    }

    /// Month record for every category in `groups`: budgeted = 1000 * (i + 1).
    fn client_for(groups: &[CategoryGroup]) -> InMemoryYnabClient {
        let mut client = InMemoryYnabClient::new();
        for (i, listed) in groups.iter().flat_map(|g| g.categories.iter()).enumerate() {
            let mut fetched = listed.clone();
            fetched.budgeted = 1000 * (i as i64 + 1);
            fetched.balance = 500 * (i as i64 + 1);
            fetched.activity = -10;
            client = client.with_month_category(&month(), fetched);
        }
        client
    }

    fn fast_options() -> EngineOptions {
        EngineOptions {
            rate_interval: Duration::from_millis(1),
            poll_interval: Duration::from_millis(2),
            merge_policy: MergePolicy::Full,
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        failures: Mutex<Vec<(String, String)>>,
    }

    impl RecordingReporter {
        fn failures(&self) -> Vec<(String, String)> {
            self.failures.lock().unwrap().clone()
        }
    }

    impl FailureReporter for RecordingReporter {
        fn report_failure(&self, category_id: &str, error: &YnabError) {
            self.failures
                .lock()
                .unwrap()
                .push((category_id.to_string(), error.to_string()));
        }
    }

    #[derive(Default)]
    struct CountingGovernor {
        admitted: AtomicUsize,
    }

    #[async_trait]
    impl RateGovernor for CountingGovernor {
        async fn admit(&self) {
            self.admitted.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn test_merges_single_category_example() {
        let groups = vec![CategoryGroup {
            id: "g1".to_string(),
            name: "Bills".to_string(),
            categories: vec![category("c1", "g1", 0, 0)],
            ..Default::default()
        }];
        let client = InMemoryYnabClient::new()
            .with_month_category(&month(), category("c1", "g1", 5000, 3000));
        let engine = SnapshotEngine::new(Arc::new(client), fast_options());

        let merged = engine.fetch_and_merge("b1", MONTH, groups).await.unwrap();

        let c1 = &merged[0].categories[0];
        assert_eq!(c1.id, "c1");
        assert_eq!(c1.budgeted, 5000);
        assert_eq!(c1.balance, 3000);
    }

    #[tokio::test]
    async fn test_current_month_returns_tree_unchanged() {
        let groups = tree(6);
        let client = Arc::new(client_for(&groups));
        let engine = SnapshotEngine::new(client.clone(), fast_options());

        let result = engine
            .fetch_and_merge("b1", "current", groups.clone())
            .await
            .unwrap();

        assert_eq!(result, groups);
        assert_eq!(client.lookup_count(), 0, "current month must not dispatch");
    }

    #[tokio::test]
    async fn test_all_lookups_succeed() {
        let groups = tree(8);
        let client = client_for(&groups);
        let expected: Vec<Category> = {
            let mut tree = groups.clone();
            for c in tree.iter_mut().flat_map(|g| g.categories.iter_mut()) {
                let fetched = client
                    .fetch_category_for_month("b1", &c.id, &month())
                    .await
                    .unwrap();
                *c = fetched;
            }
            tree.into_iter().flat_map(|g| g.categories).collect()
        };
        let client = Arc::new(client);
        let engine = SnapshotEngine::new(client.clone(), fast_options());

        let mut merged = groups.clone();
        let report = engine.merge_month("b1", month(), &mut merged).await;

        assert_eq!(report.merged.len(), 8);
        assert!(report.failed.is_empty());
        let actual: Vec<Category> = merged.into_iter().flat_map(|g| g.categories).collect();
        assert_eq!(actual, expected);
        // 8 direct lookups above plus 8 from the engine.
        assert_eq!(client.lookup_count(), 16);
    }

    #[tokio::test]
    async fn test_single_failure_leaves_category_unchanged() {
        let mut groups = tree(5);
        groups[0].categories[1].budgeted = 777;
        let failing_id = groups[0].categories[1].id.clone();
        let before = groups[0].categories[1].clone();

        let client = client_for(&groups).with_lookup_failure(
            &failing_id,
            YnabError::from_status(503, "Service Unavailable".to_string()),
        );
        let reporter = Arc::new(RecordingReporter::default());
        let engine = SnapshotEngine::new(Arc::new(client), fast_options())
            .with_reporter(reporter.clone());

        let merged = engine.fetch_and_merge("b1", MONTH, groups).await.unwrap();

        let updated = merged
            .iter()
            .flat_map(|g| g.categories.iter())
            .filter(|c| c.activity == -10)
            .count();
        assert_eq!(updated, 4);
        assert_eq!(merged[0].categories[1], before);

        let failures = reporter.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, failing_id);
        assert!(failures[0].1.contains("503"));
    }

    #[tokio::test]
    async fn test_lookups_respect_rate_limit() {
        let period = Duration::from_millis(25);
        let groups = tree(10);
        let client = Arc::new(client_for(&groups));
        let options = EngineOptions {
            rate_interval: period,
            ..fast_options()
        };
        let engine = SnapshotEngine::new(client.clone(), options);

        let start = Instant::now();
        let mut merged = groups;
        let report = engine.merge_month("b1", month(), &mut merged).await;

        assert_eq!(report.merged.len(), 10);
        let instants = client.lookup_instants().await;
        assert_eq!(instants.len(), 10);
        let last = instants.into_iter().max().unwrap();
        assert!(
            last.duration_since(start) >= period * 9,
            "10 lookups admitted within {:?}",
            last.duration_since(start)
        );
    }

    #[tokio::test]
    async fn test_each_category_merged_once_under_random_latency() {
        let groups = tree(20);
        let mut client = client_for(&groups);
        let mut rng = rand::thread_rng();
        for c in groups.iter().flat_map(|g| g.categories.iter()) {
            client = client.with_latency(&c.id, Duration::from_millis(rng.gen_range(0..40)));
        }
        let governor = Arc::new(CountingGovernor::default());
        let engine = SnapshotEngine::new(Arc::new(client), fast_options());

        let mut merged = groups.clone();
        let report = engine
            .merge_month_with_governor("b1", month(), &mut merged, governor.clone())
            .await;

        assert_eq!(governor.admitted.load(Ordering::SeqCst), 20);
        assert_eq!(report.resolved(), 20);
        let unique: HashSet<&String> = report.merged.iter().collect();
        assert_eq!(unique.len(), report.merged.len(), "a category merged twice");

        let ids: HashSet<String> = groups
            .iter()
            .flat_map(|g| g.categories.iter().map(|c| c.id.clone()))
            .collect();
        assert_eq!(unique.into_iter().cloned().collect::<HashSet<_>>(), ids);
    }

    #[tokio::test]
    async fn test_invalid_month_fails_before_dispatch() {
        let groups = tree(3);
        let client = Arc::new(client_for(&groups));
        let engine = SnapshotEngine::new(client.clone(), fast_options());

        let result = engine.fetch_and_merge("b1", "March 2024", groups).await;

        assert!(matches!(result, Err(SnapshotError::InvalidMonth(_))));
        assert_eq!(client.lookup_count(), 0);
    }

    #[tokio::test]
    async fn test_tree_without_categories_returns_immediately() {
        let client = Arc::new(InMemoryYnabClient::new());
        let options = EngineOptions {
            poll_interval: Duration::from_secs(30),
            ..fast_options()
        };
        let engine = SnapshotEngine::new(client.clone(), options);

        let start = Instant::now();
        let mut empty: Vec<CategoryGroup> = Vec::new();
        let report = engine.merge_month("b1", month(), &mut empty).await;
        assert_eq!(report, MergeReport::default());

        let mut hollow = tree(0);
        let report = engine.merge_month("b1", month(), &mut hollow).await;
        assert_eq!(report, MergeReport::default());
        assert_eq!(hollow, tree(0));

        assert_eq!(client.lookup_count(), 0);
        assert!(start.elapsed() < Duration::from_secs(5), "collector waited a poll pass");
    }

    #[tokio::test]
    async fn test_monthly_policy_keeps_names() {
        let groups = tree(2);
        let mut renamed = groups[0].categories[0].clone();
        renamed.name = "Renamed later".to_string();
        renamed.budgeted = 42;
        let client = InMemoryYnabClient::new()
            .with_month_category(&month(), renamed)
            .with_month_category(&month(), groups[1].categories[0].clone());
        let options = EngineOptions {
            merge_policy: MergePolicy::MonthlyFigures,
            ..fast_options()
        };
        let engine = SnapshotEngine::new(Arc::new(client), options);

        let merged = engine.fetch_and_merge("b1", MONTH, groups).await.unwrap();

        assert_eq!(merged[0].categories[0].name, "Category c0");
        assert_eq!(merged[0].categories[0].budgeted, 42);
    }

    struct PanickingClient;

    #[async_trait]
    impl YnabClient for PanickingClient {
        async fn list_budgets(&self) -> Result<Vec<Budget>, YnabError> {
            Ok(vec![])
        }

        async fn list_categories(
            &self,
            _budget_id: &str,
        ) -> Result<Vec<CategoryGroup>, YnabError> {
            Ok(vec![])
        }

        async fn fetch_category_for_month(
            &self,
            _budget_id: &str,
            category_id: &str,
            _month: &Month,
        ) -> Result<Category, YnabError> {
            if category_id == "c0" {
                panic!("lookup blew up");
            }
            Ok(category(category_id, "g", 1, 1))
        }
    }

    #[tokio::test]
    async fn test_dead_lookup_task_is_reported_not_hung() {
        let reporter = Arc::new(RecordingReporter::default());
        let engine = SnapshotEngine::new(Arc::new(PanickingClient), fast_options())
            .with_reporter(reporter.clone());

        let mut groups = tree(3);
        let report = engine.merge_month("b1", month(), &mut groups).await;

        assert_eq!(report.failed, vec!["c0".to_string()]);
        assert_eq!(report.merged.len(), 2);
        assert_eq!(reporter.failures().len(), 1);
        assert_eq!(groups[0].categories[0].budgeted, 0);
    }
}

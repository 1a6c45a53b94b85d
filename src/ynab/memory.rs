//! In-memory YNAB client (fixture data, no network).

use super::{Budget, Category, CategoryGroup, YnabClient, YnabError};
use crate::month::Month;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// Serves budgets, category listings and month figures from memory.
///
/// Failures and latencies can be injected per category, and every month
/// lookup is counted and timestamped.
#[derive(Clone, Default)]
pub struct InMemoryYnabClient {
    budgets: Vec<Budget>,
    listings: HashMap<String, Vec<CategoryGroup>>,
    listing_failures: HashMap<String, YnabError>,
    month_figures: HashMap<(String, String), Category>,
    lookup_failures: HashMap<String, YnabError>,
    latencies: HashMap<String, Duration>,
    lookups: Arc<AtomicUsize>,
    lookup_started: Arc<RwLock<Vec<Instant>>>,
}

impl InMemoryYnabClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a budget together with its category listing.
    pub fn with_budget(mut self, budget: Budget, groups: Vec<CategoryGroup>) -> Self {
        self.listings.insert(budget.id.clone(), groups);
        self.budgets.push(budget);
        self
    }

    /// Make the category listing of `budget_id` fail.
    pub fn with_listing_failure(mut self, budget_id: &str, error: YnabError) -> Self {
        self.listing_failures.insert(budget_id.to_string(), error);
        self
    }

    /// Register the record returned by a month lookup of `category.id`.
    pub fn with_month_category(mut self, month: &Month, category: Category) -> Self {
        self.month_figures
            .insert((month.to_string(), category.id.clone()), category);
        self
    }

    /// Make every month lookup of `category_id` fail with `error`.
    pub fn with_lookup_failure(mut self, category_id: &str, error: YnabError) -> Self {
        self.lookup_failures.insert(category_id.to_string(), error);
        self
    }

    /// Delay month lookups of `category_id` by `latency`.
    pub fn with_latency(mut self, category_id: &str, latency: Duration) -> Self {
        self.latencies.insert(category_id.to_string(), latency);
        self
    }

    /// Number of month lookups issued so far.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// When each month lookup started, in call order.
    pub async fn lookup_instants(&self) -> Vec<Instant> {
        self.lookup_started.read().await.clone()
    }
}

#[async_trait]
impl YnabClient for InMemoryYnabClient {
    async fn list_budgets(&self) -> Result<Vec<Budget>, YnabError> {
        Ok(self.budgets.clone())
    }

    async fn list_categories(&self, budget_id: &str) -> Result<Vec<CategoryGroup>, YnabError> {
        if let Some(error) = self.listing_failures.get(budget_id) {
            return Err(error.clone());
        }
        self.listings
            .get(budget_id)
            .cloned()
            .ok_or_else(|| YnabError::from_status(404, format!("budget {} not found", budget_id)))
    }

    async fn fetch_category_for_month(
        &self,
        _budget_id: &str,
        category_id: &str,
        month: &Month,
    ) -> Result<Category, YnabError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.lookup_started.write().await.push(Instant::now());

        if let Some(latency) = self.latencies.get(category_id) {
            tokio::time::sleep(*latency).await;
        }
        if let Some(error) = self.lookup_failures.get(category_id) {
            return Err(error.clone());
        }
        self.month_figures
            .get(&(month.to_string(), category_id.to_string()))
            .cloned()
            .ok_or_else(|| {
                YnabError::from_status(404, format!("category {} not found", category_id))
            })
    }
}

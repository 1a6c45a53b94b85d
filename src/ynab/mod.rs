//! YNAB API data model and client abstraction.
//!
//! The snapshot engine only talks to YNAB through the [`YnabClient`] trait.
//! [`HttpYnabClient`] is the real REST implementation; [`InMemoryYnabClient`]
//! serves fixture data and is used by tests.

mod error;
mod http;
mod memory;

pub use error::{classify_http_status, YnabError, YnabErrorKind};
pub use http::{HttpYnabClient, DEFAULT_BASE_URL};
pub use memory::InMemoryYnabClient;

use crate::month::Month;
use async_trait::async_trait;
use serde::Deserialize;

/// How a budget's currency is displayed. Carried as plain data.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrencyFormat {
    #[serde(default)]
    pub iso_code: String,
    #[serde(default)]
    pub example_format: String,
    #[serde(default)]
    pub decimal_digits: u32,
    #[serde(default)]
    pub decimal_separator: String,
    #[serde(default)]
    pub symbol_first: bool,
    #[serde(default)]
    pub group_separator: String,
    #[serde(default)]
    pub currency_symbol: String,
    #[serde(default)]
    pub display_symbol: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DateFormat {
    #[serde(default)]
    pub format: String,
}

/// A YNAB budget.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Budget {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub last_modified_on: Option<String>,
    #[serde(default)]
    pub first_month: Option<String>,
    #[serde(default)]
    pub last_month: Option<String>,
    #[serde(default)]
    pub date_format: Option<DateFormat>,
    #[serde(default)]
    pub currency_format: Option<CurrencyFormat>,
}

/// A spending category. Monetary values are in milliunits.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Category {
    pub id: String,
    pub category_group_id: String,
    pub name: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub original_category_group_id: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub budgeted: i64,
    #[serde(default)]
    pub activity: i64,
    #[serde(default)]
    pub balance: i64,
    #[serde(default)]
    pub goal_type: Option<String>,
    #[serde(default)]
    pub goal_creation_month: Option<String>,
    #[serde(default)]
    pub goal_target: Option<i64>,
    #[serde(default)]
    pub goal_target_month: Option<String>,
    #[serde(default)]
    pub goal_percentage_complete: Option<i64>,
    #[serde(default)]
    pub deleted: bool,
}

/// A named group of categories, as returned by the category listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CategoryGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub categories: Vec<Category>,
}

/// Remote YNAB data source.
#[async_trait]
pub trait YnabClient: Send + Sync {
    /// List all budgets visible to the token.
    async fn list_budgets(&self) -> Result<Vec<Budget>, YnabError>;

    /// List category groups (with current-month figures) for a budget.
    async fn list_categories(&self, budget_id: &str) -> Result<Vec<CategoryGroup>, YnabError>;

    /// Fetch a single category's figures for a specific month.
    ///
    /// Performs exactly one remote call; there is no retry.
    async fn fetch_category_for_month(
        &self,
        budget_id: &str,
        category_id: &str,
        month: &Month,
    ) -> Result<Category, YnabError>;
}

//! YNAB REST client built on reqwest.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use super::error::YnabError;
use super::{Budget, Category, CategoryGroup, YnabClient};
use crate::month::Month;

pub const DEFAULT_BASE_URL: &str = "https://api.youneedabudget.com/v1";

/// YNAB API client. One request per call, no retry.
pub struct HttpYnabClient {
    client: Client,
    base_url: String,
    api_token: String,
}

impl HttpYnabClient {
    /// Create a client against the public YNAB API.
    pub fn new(api_token: String, timeout: Duration) -> Result<Self, YnabError> {
        Self::with_base_url(api_token, DEFAULT_BASE_URL.to_string(), timeout)
    }

    /// Create a client against a custom base URL (proxies, test servers).
    pub fn with_base_url(
        api_token: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, YnabError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| YnabError::network_error(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Execute a GET request and decode the `data` envelope.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, YnabError> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");

        let response = match self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                if e.is_timeout() {
                    return Err(YnabError::network_error(format!("Request timeout: {}", e)));
                } else if e.is_connect() {
                    return Err(YnabError::network_error(format!("Connection failed: {}", e)));
                } else {
                    return Err(YnabError::network_error(format!("Request failed: {}", e)));
                }
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(status.as_u16(), response.text().await));
        }

        let body = response
            .text()
            .await
            .map_err(|e| YnabError::parse_error(format!("Failed to read response body: {}", e)))?;

        let envelope: Envelope<T> = serde_json::from_str(&body).map_err(|e| {
            YnabError::parse_error(format!(
                "Failed to parse response: {}, body: {}",
                e,
                body.chars().take(500).collect::<String>()
            ))
        })?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl YnabClient for HttpYnabClient {
    async fn list_budgets(&self) -> Result<Vec<Budget>, YnabError> {
        let data: BudgetsData = self.get("/budgets").await?;
        Ok(data.budgets)
    }

    async fn list_categories(&self, budget_id: &str) -> Result<Vec<CategoryGroup>, YnabError> {
        let data: CategoriesData = self
            .get(&format!("/budgets/{}/categories", budget_id))
            .await?;
        Ok(data.category_groups)
    }

    async fn fetch_category_for_month(
        &self,
        budget_id: &str,
        category_id: &str,
        month: &Month,
    ) -> Result<Category, YnabError> {
        let segment = month.path_segment().ok_or_else(|| {
            YnabError::client_error(
                "month-scoped lookups need a specific month, not \"current\"".to_string(),
            )
        })?;
        let data: CategoryData = self
            .get(&month_category_path(budget_id, &segment, category_id))
            .await?;
        Ok(data.category)
    }
}

/// Error for a non-success response, keeping the status even if the body is unreadable.
fn status_error(status_code: u16, body: Result<String, reqwest::Error>) -> YnabError {
    match body {
        Ok(body) => YnabError::from_status(status_code, body),
        Err(e) => YnabError::from_status(
            status_code,
            format!("Failed to read response body: {}", e),
        ),
    }
}

fn month_category_path(budget_id: &str, month_segment: &str, category_id: &str) -> String {
    format!(
        "/budgets/{}/months/{}/categories/{}",
        budget_id, month_segment, category_id
    )
}

/// Every YNAB response wraps its payload in `{"data": ...}`.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct BudgetsData {
    budgets: Vec<Budget>,
}

#[derive(Debug, Deserialize)]
struct CategoriesData {
    category_groups: Vec<CategoryGroup>,
}

#[derive(Debug, Deserialize)]
struct CategoryData {
    category: Category,
}

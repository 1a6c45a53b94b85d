//! Launching one rate-governed lookup task per category.

use std::sync::Arc;
use tokio::sync::oneshot;

use super::governor::RateGovernor;
use crate::month::Month;
use crate::ynab::{Category, CategoryGroup, YnabClient, YnabError};

pub type LookupResult = Result<Category, YnabError>;

/// A category awaiting its month lookup.
///
/// Holds the live category in the tree and the receiving end of a channel
/// that carries at most one completion message.
pub struct LookupHandle<'a> {
    pub category: &'a mut Category,
    pub receiver: oneshot::Receiver<LookupResult>,
}

/// Spawn one lookup per category across all groups, in tree order.
///
/// Each task waits for one admission from `governor`, performs the lookup and
/// sends its single result. Tasks are detached; the returned handles are the
/// only way to observe them.
pub fn dispatch<'a>(
    client: &Arc<dyn YnabClient>,
    governor: &Arc<dyn RateGovernor>,
    budget_id: &str,
    month: Month,
    groups: &'a mut [CategoryGroup],
) -> Vec<LookupHandle<'a>> {
    let mut handles = Vec::new();

    for category in groups
        .iter_mut()
        .flat_map(|group| group.categories.iter_mut())
    {
        let (tx, rx) = oneshot::channel();
        let client = Arc::clone(client);
        let governor = Arc::clone(governor);
        let budget_id = budget_id.to_string();
        let category_id = category.id.clone();

        tokio::spawn(async move {
            governor.admit().await;
            let result = client
                .fetch_category_for_month(&budget_id, &category_id, &month)
                .await;
            if tx.send(result).is_err() {
                tracing::debug!(
                    category_id = %category_id,
                    "Lookup result dropped: collector is gone"
                );
            }
        });

        handles.push(LookupHandle {
            category,
            receiver: rx,
        });
    }

    handles
}

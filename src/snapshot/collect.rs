//! Draining lookup handles and merging results into the tree.

use std::time::Duration;
use tokio::sync::oneshot::error::TryRecvError;

use super::dispatch::LookupHandle;
use super::merge::MergePolicy;
use super::report::{FailureReporter, MergeReport};
use crate::ynab::YnabError;

/// Poll every outstanding handle until all are resolved.
///
/// Each pass tries a non-blocking receive on every pending handle and builds a
/// fresh pending list from the ones still empty; between passes the collector
/// sleeps for `poll_interval`. Successes are merged with `policy`, failures go
/// to `reporter` and leave the category untouched.
pub async fn collect(
    handles: Vec<LookupHandle<'_>>,
    policy: MergePolicy,
    reporter: &dyn FailureReporter,
    poll_interval: Duration,
) -> MergeReport {
    let mut report = MergeReport::default();
    let mut pending = handles;

    while !pending.is_empty() {
        let mut still_pending = Vec::with_capacity(pending.len());

        for mut handle in pending {
            match handle.receiver.try_recv() {
                Ok(Ok(fetched)) => {
                    let category_id = handle.category.id.clone();
                    policy.apply(handle.category, fetched);
                    tracing::trace!(category_id = %category_id, "Merged month figures");
                    report.merged.push(category_id);
                }
                Ok(Err(error)) => {
                    reporter.report_failure(&handle.category.id, &error);
                    report.failed.push(handle.category.id.clone());
                }
                Err(TryRecvError::Empty) => still_pending.push(handle),
                Err(TryRecvError::Closed) => {
                    // The task died (panic or runtime shutdown) before sending.
                    let error = YnabError::network_error(
                        "lookup task ended without a result".to_string(),
                    );
                    reporter.report_failure(&handle.category.id, &error);
                    report.failed.push(handle.category.id.clone());
                }
            }
        }

        pending = still_pending;
        if !pending.is_empty() {
            tracing::trace!(outstanding = pending.len(), "Waiting for lookups");
            tokio::time::sleep(poll_interval).await;
        }
    }

    report
}

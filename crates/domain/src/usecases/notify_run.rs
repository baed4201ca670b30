//! Notify run use case - load seen-set, fetch reports, notify new ones, persist

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use crate::{
    model::{PostId, Report, RunSummary, SeenSet},
    ports::{BlobStore, Notifier, NotifyError, ReportSource, SourceError, StateError},
    retry::RetryPolicy,
    state::SeenSetRepo,
    usecases::render::render_notification,
};

/// Configuration for a notify run
#[derive(Debug, Clone, Default)]
pub struct NotifyRunConfig {
    /// Log messages and the final state instead of sending and saving
    pub dry_run: bool,
    /// Retry policy for the report fetch and webhook sends
    pub retry: RetryPolicy,
}

/// One pass of the job: diff fetched reports against the seen-set and
/// notify each unseen one
pub struct NotifyRun<S, N, B>
where
    S: ReportSource + ?Sized,
    N: Notifier + ?Sized,
    B: BlobStore + ?Sized,
{
    source: Arc<S>,
    notifier: Arc<N>,
    state: SeenSetRepo<B>,
    config: NotifyRunConfig,
}

impl<S, N, B> NotifyRun<S, N, B>
where
    S: ReportSource + ?Sized,
    N: Notifier + ?Sized,
    B: BlobStore + ?Sized,
{
    pub fn new(
        source: Arc<S>,
        notifier: Arc<N>,
        state: SeenSetRepo<B>,
        config: NotifyRunConfig,
    ) -> Self {
        Self {
            source,
            notifier,
            state,
            config,
        }
    }

    /// Run the job once.
    ///
    /// Load or fetch failures return before anything is written. Once the
    /// fetch has succeeded the seen-set is saved exactly once, whether the
    /// notify loop completes, fails, or panics.
    pub async fn run_once(&self) -> Result<RunSummary, RunError> {
        let mut seen = self.state.load().await?;

        tracing::info!(seen = seen.len(), "Loaded seen-set");

        let reports = self
            .config
            .retry
            .run("fetch_reports", || self.source.fetch())
            .await?;

        tracing::info!(count = reports.len(), "Fetched reports");

        let mut summary = RunSummary {
            fetched: reports.len(),
            ..Default::default()
        };

        let outcome = AssertUnwindSafe(self.notify_new(&reports, &mut seen, &mut summary))
            .catch_unwind()
            .await;

        let saved = self.persist(&seen).await;
        summary.seen_total = seen.len();

        match outcome {
            Ok(Ok(())) => {
                saved?;
                tracing::info!(
                    fetched = summary.fetched,
                    notified = summary.notified,
                    skipped_seen = summary.skipped_seen,
                    skipped_duplicate = summary.skipped_duplicate,
                    seen_total = summary.seen_total,
                    "Run complete"
                );
                Ok(summary)
            }
            Ok(Err(error)) => {
                if let Err(save_error) = saved {
                    tracing::error!(error = %save_error, "Failed to save seen-set after notify failure");
                }
                Err(error)
            }
            Err(panic) => {
                if let Err(save_error) = saved {
                    tracing::error!(error = %save_error, "Failed to save seen-set after panic");
                }
                std::panic::resume_unwind(panic)
            }
        }
    }

    /// Notify every report whose ID is not yet in `seen`, in API order.
    ///
    /// An ID is appended only after its notification went out, so a report
    /// whose send fails is retried on the next run. The first send failure
    /// stops the loop.
    pub async fn notify_new(
        &self,
        reports: &[Report],
        seen: &mut SeenSet,
        summary: &mut RunSummary,
    ) -> Result<(), RunError> {
        let initial = seen.clone();

        for report in reports {
            if seen.contains(&report.post_id) {
                if initial.contains(&report.post_id) {
                    summary.skipped_seen += 1;
                } else {
                    tracing::debug!(post_id = %report.post_id, "Duplicate ID within fetch");
                    summary.skipped_duplicate += 1;
                }
                continue;
            }

            let notification = render_notification(report);

            if self.config.dry_run {
                tracing::info!(
                    post_id = %report.post_id,
                    text = %notification.text,
                    "[DRY RUN] Would notify"
                );
            } else {
                self.config
                    .retry
                    .run("send_notification", || self.notifier.send(&notification))
                    .await
                    .map_err(|source| RunError::Notify {
                        post_id: report.post_id.clone(),
                        source,
                    })?;
                tracing::info!(post_id = %report.post_id, "Notified");
            }

            seen.insert(report.post_id.clone());
            summary.notified += 1;
        }

        Ok(())
    }

    async fn persist(&self, seen: &SeenSet) -> Result<(), RunError> {
        if self.config.dry_run {
            let location = self.state.location();
            tracing::info!(
                bucket = %location.bucket,
                key = %location.key,
                count = seen.len(),
                "[DRY RUN] Would save seen-set"
            );
            return Ok(());
        }

        self.state.save(seen).await.map_err(RunError::from)
    }
}

/// Errors from a notify run
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("State error: {0}")]
    State(#[from] StateError),
    #[error("Report source error: {0}")]
    Source(#[from] SourceError),
    #[error("Failed to notify post {post_id}: {source}")]
    Notify {
        post_id: PostId,
        #[source]
        source: NotifyError,
    },
}

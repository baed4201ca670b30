//! Run command - one pass of fetch, diff, notify, persist

use anyhow::{Context, Result};
use report_notifier_adapters::notify::WebhookNotifier;
use report_notifier_domain::usecases::{NotifyRun, NotifyRunConfig};
use std::path::PathBuf;
use std::sync::Arc;

use crate::args::RunArgs;
use crate::commands::{build_notifier, build_report_source, build_seen_set_repo};
use crate::config::AppConfig;

pub async fn execute(args: RunArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    config.validate().context("Invalid configuration")?;

    let dry_run = args.dry_run || config.general.dry_run;

    tracing::info!(
        dry_run = dry_run,
        bucket = %config.state.bucket,
        blob = %config.state.blob,
        endpoint = %config.reports.endpoint,
        max_attempts = config.retry.max_attempts,
        "Starting report-notifier run"
    );

    // Build dependencies
    let state = build_seen_set_repo(&config)?;
    let source = Arc::new(build_report_source(&config)?);
    let notifier = Arc::new(if dry_run {
        WebhookNotifier::disabled()
    } else {
        build_notifier(&config)?
    });

    let run = NotifyRun::new(
        source,
        notifier,
        state,
        NotifyRunConfig {
            dry_run,
            retry: config.retry.policy(),
        },
    );

    let summary = run.run_once().await.context("Run failed")?;

    tracing::info!(
        fetched = summary.fetched,
        notified = summary.notified,
        seen_total = summary.seen_total,
        "report-notifier run completed"
    );

    Ok(())
}

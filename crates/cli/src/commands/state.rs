//! State command - inspect or initialize the seen-set blob

use anyhow::{Context, Result, bail};
use report_notifier_domain::{SeenSet, StateError};
use std::path::PathBuf;

use crate::args::{StateArgs, StateCommands};
use crate::commands::build_seen_set_repo;
use crate::config::AppConfig;

pub async fn execute(args: StateArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config = AppConfig::load(config_path.as_deref())?;
    if config.state.bucket.trim().is_empty() {
        bail!("state.bucket is not configured");
    }

    match args.command {
        StateCommands::Show { json } => show(&config, json).await,
        StateCommands::Init { force } => init(&config, force).await,
    }
}

async fn show(config: &AppConfig, json: bool) -> Result<()> {
    let repo = build_seen_set_repo(config)?;
    let seen = repo.load().await.context("Failed to load seen-set")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&seen)?);
        return Ok(());
    }

    println!(
        "gs://{}/{}: {} seen post IDs",
        config.state.bucket,
        config.state.blob,
        seen.len()
    );
    for id in seen.iter() {
        println!("  {}", id);
    }

    Ok(())
}

async fn init(config: &AppConfig, force: bool) -> Result<()> {
    let repo = build_seen_set_repo(config)?;

    match repo.load().await {
        Ok(existing) if !force => bail!(
            "Seen-set already exists with {} IDs. Use --force to overwrite.",
            existing.len()
        ),
        Ok(_) | Err(StateError::NotFound(_)) => {}
        // A corrupt blob is exactly what --force is for
        Err(StateError::Corrupt(_)) if force => {}
        Err(e) => return Err(e).context("Failed to check existing seen-set"),
    }

    repo.save(&SeenSet::new())
        .await
        .context("Failed to write empty seen-set")?;

    println!(
        "Initialized empty seen-set at gs://{}/{}",
        config.state.bucket, config.state.blob
    );

    Ok(())
}

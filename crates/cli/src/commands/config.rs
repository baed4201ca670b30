//! Config command - configuration management

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::args::{ConfigArgs, ConfigCommands};
use crate::config::AppConfig;

pub fn execute(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Init { path, force } => init_config(&path, force),
    }
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            path.display()
        );
    }

    let content = AppConfig::example_toml();

    // Create parent directories if needed
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    println!("Created config file: {}", path.display());
    println!();
    println!("Next steps:");
    println!("  1. Set the bucket, reports endpoint and header env vars");
    println!("  2. Export GCS_ACCESS_TOKEN and SLACK_WEBHOOK_URL");
    println!("  3. Run 'report-notifier doctor' to validate your setup");
    println!("  4. Run 'report-notifier state init' once to create the seen-set");
    println!("  5. Run 'report-notifier run --dry-run' to test");

    Ok(())
}

//! Subcommand implementations and shared dependency wiring

pub mod config;
pub mod doctor;
pub mod run;
pub mod state;

use anyhow::{Context, Result, bail};
use report_notifier_adapters::{
    notify::WebhookNotifier, reports::HttpReportSource, state::GcsBlobStore,
};
use report_notifier_domain::{BlobLocation, SeenSetRepo};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use std::time::Duration;

use crate::config::AppConfig;

/// Read a secret from the named environment variable
pub(crate) fn load_secret(env_var: &str, purpose: &str) -> Result<SecretString> {
    if env_var.trim().is_empty() {
        bail!("No env var configured for {}", purpose);
    }

    let value = std::env::var(env_var)
        .with_context(|| format!("Missing env var {} for {}", env_var, purpose))?;

    if value.trim().is_empty() {
        bail!("Env var {} is empty for {}", env_var, purpose);
    }

    Ok(SecretString::new(value.into()))
}

pub(crate) fn build_seen_set_repo(config: &AppConfig) -> Result<SeenSetRepo<GcsBlobStore>> {
    let token = load_secret(&config.state.access_token_env, "storage access token")?;
    let store = GcsBlobStore::with_base_url(
        token,
        &config.state.base_url,
        Duration::from_secs(config.state.timeout_secs),
    )
    .context("Failed to initialize storage client")?;

    Ok(SeenSetRepo::new(
        Arc::new(store),
        BlobLocation::new(&config.state.bucket, &config.state.blob),
        config.retry.policy(),
    ))
}

pub(crate) fn build_report_source(config: &AppConfig) -> Result<HttpReportSource> {
    let headers = build_report_headers(config)?;
    Ok(HttpReportSource::with_timeout(
        config.reports.endpoint.clone(),
        headers,
        Duration::from_secs(config.reports.timeout_secs),
    ))
}

pub(crate) fn build_notifier(config: &AppConfig) -> Result<WebhookNotifier> {
    let webhook_url = load_secret(&config.notify.webhook_url_env, "webhook URL")?;
    Ok(WebhookNotifier::with_timeout(
        webhook_url,
        Duration::from_secs(config.notify.timeout_secs),
    ))
}

fn build_report_headers(config: &AppConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();

    for (name, value) in &config.reports.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .with_context(|| format!("Invalid header name: {}", name))?;
        let value = HeaderValue::from_str(value)
            .with_context(|| format!("Invalid value for header {}", name))?;
        headers.insert(name, value);
    }

    for (name, env_var) in &config.reports.secret_headers {
        let header = HeaderName::from_bytes(name.as_bytes())
            .with_context(|| format!("Invalid header name: {}", name))?;
        let secret = load_secret(env_var, &format!("header {}", name))?;
        let mut value = HeaderValue::from_str(secret.expose_secret())
            .with_context(|| format!("Invalid value for header {}", name))?;
        value.set_sensitive(true);
        headers.insert(header, value);
    }

    Ok(headers)
}

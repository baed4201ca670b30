//! Doctor command - validate configuration and show status

use anyhow::Result;
use reqwest::Url;
use serde::Serialize;
use std::path::PathBuf;

use crate::args::DoctorArgs;
use crate::config::AppConfig;

#[derive(Debug, Serialize)]
struct DoctorReport {
    config: CheckResult,
    state: CheckResult,
    reports: CheckResult,
    notify: CheckResult,
    overall: String,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    status: String,
    message: String,
    details: Option<serde_json::Value>,
}

impl CheckResult {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn warn(message: impl Into<String>) -> Self {
        Self {
            status: "warn".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            message: message.into(),
            details: None,
        }
    }

    fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }

    fn is_error(&self) -> bool {
        self.status == "error"
    }
}

pub async fn execute(args: DoctorArgs, config_path: Option<PathBuf>) -> Result<()> {
    let mut report = DoctorReport {
        config: CheckResult::error("Not checked"),
        state: CheckResult::error("Not checked"),
        reports: CheckResult::error("Not checked"),
        notify: CheckResult::error("Not checked"),
        overall: "error".to_string(),
    };

    // Check config
    let config = match AppConfig::load(config_path.as_deref()) {
        Ok(c) => {
            report.config = CheckResult::ok("Configuration loaded successfully");
            Some(c)
        }
        Err(e) => {
            report.config = CheckResult::error(format!("Failed to load config: {:#}", e));
            None
        }
    };

    if let Some(ref config) = config {
        report.state = check_state(config);
        report.reports = check_reports(config);
        report.notify = check_notify(config);
    }

    // Determine overall status
    let checks = [
        &report.config,
        &report.state,
        &report.reports,
        &report.notify,
    ];

    let has_error = checks.iter().any(|c| c.is_error());
    let all_ok = checks.iter().all(|c| c.is_ok());

    report.overall = if has_error {
        "error".to_string()
    } else if all_ok {
        "ok".to_string()
    } else {
        "warn".to_string()
    };

    // Output report
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if report.overall == "error" {
        std::process::exit(1);
    }

    Ok(())
}

fn check_state(config: &AppConfig) -> CheckResult {
    let state = &config.state;

    if state.bucket.trim().is_empty() {
        return CheckResult::error("No bucket configured (state.bucket)");
    }

    if state.blob.trim().is_empty() {
        return CheckResult::error("No blob name configured (state.blob)");
    }

    if let Err(e) = Url::parse(&state.base_url) {
        return CheckResult::error(format!("Invalid storage base_url {}: {}", state.base_url, e));
    }

    let location = format!("gs://{}/{}", state.bucket, state.blob);
    let details = serde_json::json!({
        "bucket": state.bucket,
        "blob": state.blob,
        "base_url": state.base_url,
    });

    let result = match env_status(&state.access_token_env) {
        EnvStatus::Set => CheckResult::ok(format!(
            "{}, access token: {} (set)",
            location, state.access_token_env
        )),
        EnvStatus::Unset => CheckResult::error(format!(
            "{}, access token: {} (not set)",
            location, state.access_token_env
        )),
        EnvStatus::NotConfigured => CheckResult::error("No access token env var configured"),
    };

    result.with_details(details)
}

fn check_reports(config: &AppConfig) -> CheckResult {
    let reports = &config.reports;

    if reports.endpoint.trim().is_empty() {
        return CheckResult::error("No reports endpoint configured (reports.endpoint)");
    }

    if let Err(e) = Url::parse(&reports.endpoint) {
        return CheckResult::error(format!("Invalid reports endpoint {}: {}", reports.endpoint, e));
    }

    let missing: Vec<&str> = reports
        .secret_headers
        .iter()
        .filter(|(_, env_var)| !matches!(env_status(env_var), EnvStatus::Set))
        .map(|(name, _)| name.as_str())
        .collect();

    if !missing.is_empty() {
        return CheckResult::error(format!(
            "Endpoint: {}, secret headers without values: {}",
            reports.endpoint,
            missing.join(", ")
        ));
    }

    if reports.secret_headers.is_empty() {
        return CheckResult::warn(format!(
            "Endpoint: {}, no credential headers configured",
            reports.endpoint
        ));
    }

    CheckResult::ok(format!(
        "Endpoint: {}, headers: {}",
        reports.endpoint,
        reports.headers.len() + reports.secret_headers.len()
    ))
}

fn check_notify(config: &AppConfig) -> CheckResult {
    let env_var = &config.notify.webhook_url_env;

    match env_status(env_var) {
        EnvStatus::Set => CheckResult::ok(format!("Webhook URL: {} (set)", env_var)),
        EnvStatus::Unset if config.general.dry_run => CheckResult::warn(format!(
            "Webhook URL: {} (not set, dry run enabled)",
            env_var
        )),
        EnvStatus::Unset => CheckResult::error(format!("Webhook URL: {} (not set)", env_var)),
        EnvStatus::NotConfigured => CheckResult::error("No webhook URL env var configured"),
    }
}

enum EnvStatus {
    Set,
    Unset,
    NotConfigured,
}

fn env_status(env_var: &str) -> EnvStatus {
    if env_var.trim().is_empty() {
        return EnvStatus::NotConfigured;
    }

    match std::env::var(env_var) {
        Ok(val) if !val.trim().is_empty() => EnvStatus::Set,
        _ => EnvStatus::Unset,
    }
}

fn print_report(report: &DoctorReport) {
    println!("report-notifier Doctor Report");
    println!("=============================");
    println!();

    print_check("Config", &report.config);
    print_check("State", &report.state);
    print_check("Reports API", &report.reports);
    print_check("Webhook", &report.notify);

    println!();
    let symbol = match report.overall.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} Overall: {}", symbol, report.overall.to_uppercase());

    if report.overall == "ok" {
        println!();
        println!("Ready to run! Try: report-notifier run --dry-run");
    }
}

fn print_check(name: &str, result: &CheckResult) {
    let symbol = match result.status.as_str() {
        "ok" => "✓",
        "warn" => "⚠",
        _ => "✗",
    };
    println!("{} {}: {}", symbol, name, result.message);
}

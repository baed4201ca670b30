//! HTTP adapter for fetching reported posts

use async_trait::async_trait;
use report_notifier_domain::{Report, ReportSource, SourceError};
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Reports API source: one GET with static headers, JSON array response
pub struct HttpReportSource {
    client: Client,
    endpoint: String,
    headers: HeaderMap,
}

impl HttpReportSource {
    /// `headers` are sent on every request; mark credential values as
    /// sensitive so they are redacted from debug output
    pub fn new(endpoint: String, headers: HeaderMap) -> Self {
        Self::with_timeout(endpoint, headers, Duration::from_secs(30))
    }

    pub fn with_timeout(endpoint: String, headers: HeaderMap, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            endpoint,
            headers,
        }
    }
}

#[async_trait]
impl ReportSource for HttpReportSource {
    async fn fetch(&self) -> Result<Vec<Report>, SourceError> {
        tracing::debug!(endpoint = %self.endpoint, "Fetching reported posts");

        let response = self
            .client
            .get(&self.endpoint)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(|e| SourceError::Connection(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::NOT_FOUND => {
                return Err(SourceError::NotFound(self.endpoint.clone()));
            }
            StatusCode::UNAUTHORIZED => {
                return Err(SourceError::NotAuthenticated(
                    "Reports API rejected credentials".to_string(),
                ));
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                return Err(SourceError::Api {
                    status: status.as_u16(),
                    body,
                });
            }
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SourceError::Connection(e.to_string()))?;

        let reports: Vec<Report> = serde_json::from_slice(&body)
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))?;

        tracing::debug!(count = reports.len(), "Fetched reported posts");

        Ok(reports)
    }
}

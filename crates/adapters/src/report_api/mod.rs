//! Reported-posts API adapters

mod read;

pub use read::HttpReportSource;

use async_trait::async_trait;
use report_notifier_domain::{Report, ReportSource, SourceError};

/// Stub report source for testing
pub struct StubReportSource {
    reports: Vec<Report>,
}

impl StubReportSource {
    /// Create an empty stub
    pub fn empty() -> Self {
        Self { reports: vec![] }
    }

    /// Create a stub with predefined reports
    pub fn with_reports(reports: Vec<Report>) -> Self {
        Self { reports }
    }
}

#[async_trait]
impl ReportSource for StubReportSource {
    async fn fetch(&self) -> Result<Vec<Report>, SourceError> {
        Ok(self.reports.clone())
    }
}

//! report-notifier adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `state`: Google Cloud Storage and in-memory blob stores
//! - `reports`: Reported-posts API source
//! - `notify`: Chat webhook notifier

mod state_gcs;
mod state_memory;

pub mod report_api;
pub mod webhook;

/// Re-exports for state adapters
pub mod state {
    pub use crate::state_gcs::{DEFAULT_GCS_BASE_URL, GcsBlobStore};
    pub use crate::state_memory::InMemoryBlobStore;
}

/// Re-exports for report source adapters
pub mod reports {
    pub use crate::report_api::{HttpReportSource, StubReportSource};
}

/// Re-exports for notifier adapters
pub mod notify {
    pub use crate::webhook::{StubNotifier, WebhookNotifier};
}

//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external systems.
//! Adapters implement these traits to connect to real infrastructure.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{Notification, Report};
use crate::retry::Retryable;

/// Error type for report source operations
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Reports endpoint not found: {0}")]
    NotFound(String),
    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl Retryable for SourceError {
    fn is_transient(&self) -> bool {
        matches!(self, SourceError::Connection(_))
    }
}

/// Port for fetching the current list of reported posts
#[async_trait]
pub trait ReportSource: Send + Sync {
    /// Issue a single request for all currently reported posts
    async fn fetch(&self) -> Result<Vec<Report>, SourceError>;
}

/// Error type for blob storage operations
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Blob not found: {0}")]
    NotFound(String),
    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Storage API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },
    #[error("Corrupt state blob: {0}")]
    Corrupt(String),
    #[error("Invalid storage configuration: {0}")]
    Config(String),
}

impl Retryable for StateError {
    fn is_transient(&self) -> bool {
        matches!(self, StateError::Connection(_))
    }
}

/// Port for reading and writing a single opaque blob.
///
/// `save` overwrites unconditionally (last writer wins).
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read the blob contents
    async fn load(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StateError>;

    /// Create or overwrite the blob
    async fn save(&self, bucket: &str, key: &str, value: &[u8]) -> Result<(), StateError>;
}

/// Error type for notifier operations
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Webhook rejected message (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("Notifier is disabled")]
    Disabled,
}

impl Retryable for NotifyError {
    fn is_transient(&self) -> bool {
        matches!(self, NotifyError::Connection(_))
    }
}

/// Port for delivering chat notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

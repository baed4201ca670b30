//! report-notifier domain crate
//!
//! This crate contains the core domain logic following hexagonal architecture:
//! - `model`: Post IDs, the seen-set, reports and notifications
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `retry`: Fixed-count retry applied at network call sites
//! - `state`: Typed load/save of the seen-set blob
//! - `usecases`: The diff-and-notify run and message rendering

pub mod model;
pub mod ports;
pub mod retry;
pub mod state;
pub mod usecases;

pub use model::*;
pub use ports::*;
pub use retry::{RetryPolicy, Retryable};
pub use state::{BlobLocation, SeenSetRepo};

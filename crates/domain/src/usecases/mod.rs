//! Application use cases / business logic

pub mod notify_run;
pub mod render;

pub use notify_run::{NotifyRun, NotifyRunConfig, RunError};
pub use render::{DESCRIPTION_PREVIEW_CHARS, render_notification, truncate_description};

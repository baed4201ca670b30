//! Rendering use case - turns a report into chat message text

use std::borrow::Cow;

use crate::model::{Notification, Report};

/// Descriptions longer than this many characters are cut in the message
pub const DESCRIPTION_PREVIEW_CHARS: usize = 20;

/// Marker appended to a truncated description
pub const ELLIPSIS: &str = "...";

/// Build the notification for one newly seen report
pub fn render_notification(report: &Report) -> Notification {
    let text = format!(
        ":rotating_light: *New reported post*\n\
         *Title:* {}\n\
         *Description:* {}\n\
         *Status:* {}\n\
         *Type:* {}\n\
         *Post ID:* {}",
        report.title,
        truncate_description(&report.description),
        report.status,
        report.post_type,
        report.post_id,
    );

    Notification {
        post_id: report.post_id.clone(),
        text,
    }
}

/// Keep the first [`DESCRIPTION_PREVIEW_CHARS`] characters, appending
/// [`ELLIPSIS`] when anything was cut
pub fn truncate_description(description: &str) -> Cow<'_, str> {
    match description.char_indices().nth(DESCRIPTION_PREVIEW_CHARS) {
        Some((cut, _)) => Cow::Owned(format!("{}{}", &description[..cut], ELLIPSIS)),
        None => Cow::Borrowed(description),
    }
}

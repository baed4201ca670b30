//! Domain models and value objects

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identifier of a reported post.
///
/// The reports API and older state blobs use both JSON strings and JSON
/// integers. The original representation is kept so a blob round-trips
/// unchanged, while equality and hashing go through the text form:
/// `PostId::from(3i64) == PostId::from("3")`.
///
/// Integers are held as [`serde_json::Number`], so the full `i64` and `u64`
/// ranges are accepted. Wider integers fall back to their `f64` form.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostId {
    Number(serde_json::Number),
    Text(String),
}

impl PostId {
    /// Canonical text form used for comparisons
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            PostId::Number(n) => Cow::Owned(n.to_string()),
            PostId::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }
}

impl PartialEq for PostId {
    fn eq(&self, other: &Self) -> bool {
        self.as_key() == other.as_key()
    }
}

impl Eq for PostId {}

impl Hash for PostId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_key().hash(state);
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostId::Number(n) => write!(f, "{}", n),
            PostId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for PostId {
    fn from(value: &str) -> Self {
        PostId::Text(value.to_string())
    }
}

impl From<String> for PostId {
    fn from(value: String) -> Self {
        PostId::Text(value)
    }
}

impl From<i64> for PostId {
    fn from(value: i64) -> Self {
        PostId::Number(value.into())
    }
}

impl From<u64> for PostId {
    fn from(value: u64) -> Self {
        PostId::Number(value.into())
    }
}

/// Post identifiers that have already triggered a notification.
///
/// Insertion order is preserved for persistence; membership checks go
/// through a hash index. An ID is stored at most once.
#[derive(Debug, Clone, Default)]
pub struct SeenSet {
    ids: Vec<PostId>,
    index: HashSet<PostId>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a seen-set from a sequence, keeping the first occurrence of
    /// each ID
    pub fn from_ids(ids: impl IntoIterator<Item = PostId>) -> Self {
        let mut set = Self::new();
        for id in ids {
            set.insert(id);
        }
        set
    }

    pub fn contains(&self, id: &PostId) -> bool {
        self.index.contains(id)
    }

    /// Append an ID. Returns `false` if it was already present.
    pub fn insert(&mut self, id: PostId) -> bool {
        if self.index.contains(&id) {
            return false;
        }
        self.index.insert(id.clone());
        self.ids.push(id);
        true
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PostId> {
        self.ids.iter()
    }

    /// Serialize as the JSON array stored in the state blob
    pub fn to_json(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

impl Serialize for SeenSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.ids.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for SeenSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let ids = Vec::<PostId>::deserialize(deserializer)?;
        Ok(Self::from_ids(ids))
    }
}

/// A reported post as returned by the reports API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Platform-specific post ID
    pub post_id: PostId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Moderation status (e.g. "open")
    #[serde(default, deserialize_with = "null_as_empty")]
    pub status: String,
    /// Kind of report (e.g. "noise", "spam")
    #[serde(default, deserialize_with = "null_as_empty")]
    pub post_type: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A chat message rendered for a single new report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// The report this message announces
    pub post_id: PostId,
    /// Slack mrkdwn text
    pub text: String,
}

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Reports returned by the API
    pub fetched: usize,
    /// Notifications sent (or logged, in dry-run mode)
    pub notified: usize,
    /// Reports already present in the seen-set at load time
    pub skipped_seen: usize,
    /// Repeated IDs within the same fetch
    pub skipped_duplicate: usize,
    /// Size of the seen-set after the run
    pub seen_total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_id_number_and_text_are_equal() {
        assert_eq!(PostId::from(3i64), PostId::from("3"));
        assert_ne!(PostId::from(3i64), PostId::from("03"));
    }

    #[test]
    fn test_post_id_accepts_ids_beyond_i64() {
        let set: SeenSet = serde_json::from_str("[18446744073709551615, -4]").unwrap();

        assert!(set.contains(&PostId::from(u64::MAX)));
        assert!(set.contains(&PostId::from("-4")));
        assert_eq!(
            String::from_utf8(set.to_json().unwrap()).unwrap(),
            "[18446744073709551615,-4]"
        );
    }

    #[test]
    fn test_seen_set_preserves_original_json_form() {
        let set: SeenSet = serde_json::from_str(r#"["1", 2, "abc"]"#).unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.contains(&PostId::from("2")));

        let json = String::from_utf8(set.to_json().unwrap()).unwrap();
        assert_eq!(json, r#"["1",2,"abc"]"#);
    }

    #[test]
    fn test_seen_set_collapses_duplicates_on_load() {
        let set: SeenSet = serde_json::from_str(r#"["1", "2", 1]"#).unwrap();
        assert_eq!(set.len(), 2);
        let ids: Vec<String> = set.iter().map(|id| id.to_string()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_seen_set_insert_is_idempotent() {
        let mut set = SeenSet::new();
        assert!(set.insert(PostId::from("a")));
        assert!(!set.insert(PostId::from("a")));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_report_parses_api_shape() {
        let report: Report = serde_json::from_value(serde_json::json!({
            "postId": "3",
            "title": "T",
            "description": "short",
            "status": "open",
            "postType": "noise",
            "reporterCount": 4
        }))
        .unwrap();

        assert_eq!(report.post_id, PostId::from("3"));
        assert_eq!(report.post_type, "noise");
    }

    #[test]
    fn test_report_tolerates_missing_and_null_fields() {
        let report: Report = serde_json::from_value(serde_json::json!({
            "postId": 17,
            "description": null
        }))
        .unwrap();

        assert_eq!(report.post_id, PostId::from(17i64));
        assert_eq!(report.description, "");
        assert_eq!(report.title, "");
    }
}

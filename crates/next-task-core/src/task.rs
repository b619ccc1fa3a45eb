//! Task record and cache key

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Cache key: SHA-256 hex digest of `kind:id`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey(pub String);

impl CacheKey {
    /// Compute the cache key for a source kind and source-native id
    pub fn compute(kind: &str, id: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(kind.as_bytes());
        hasher.update(b":");
        hasher.update(id.as_bytes());
        CacheKey(format!("{:x}", hasher.finalize()))
    }

    /// The key as a string (also the entry file name)
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One pending work item from any source
///
/// Records are immutable once built; `(kind, id)` is the stable identity
/// across sources and runs, `title` is only the per-refill dedup key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Originating source adapter (e.g. "GoogleMail", "Jira")
    pub kind: String,
    /// Source-native identifier
    pub id: String,
    /// One-line summary
    pub title: String,
    /// Optional free text, empty when absent
    #[serde(default)]
    pub description: String,
}

impl TaskRecord {
    /// Create a new task record
    pub fn new(
        kind: impl Into<String>,
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
            title: title.into(),
            description: description.into(),
        }
    }

    /// The content-addressed key for this record
    pub fn cache_key(&self) -> CacheKey {
        CacheKey::compute(&self.kind, &self.id)
    }

    /// Whether there is a description worth showing
    pub fn has_description(&self) -> bool {
        !self.description.is_empty()
    }

    /// Serialize to the on-disk entry format
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Deserialize from the on-disk entry format
    pub fn decode(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

impl fmt::Display for TaskRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_cache_key_deterministic() {
        let task = TaskRecord::new("Jira", "PROJ-1", "Fix the build", "");
        assert_eq!(task.cache_key(), task.cache_key());
        assert_eq!(task.cache_key(), CacheKey::compute("Jira", "PROJ-1"));
    }

    #[test]
    fn test_cache_key_is_sha256_hex() {
        let key = CacheKey::compute("Jira", "PROJ-1");
        assert_eq!(key.as_str().len(), 64);
        assert!(key.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(key.as_str(), key.as_str().to_lowercase());
    }

    #[test]
    fn test_cache_key_known_digest() {
        // sha256("a:b")
        assert_eq!(
            CacheKey::compute("a", "b").as_str(),
            "6783a31eabf68ccc0660f935c0826282bdd2241f3a80a9f2d10d59aea9ebb5d8"
        );
    }

    #[test]
    fn test_cache_key_ignores_title_and_description() {
        let a = TaskRecord::new("GoogleTask", "abc", "Title one", "");
        let b = TaskRecord::new("GoogleTask", "abc", "Title two", "notes");
        assert_eq!(a.cache_key(), b.cache_key());
    }

    #[test]
    fn test_cache_key_distinct_across_working_set() {
        let kinds = ["GoogleMail", "GoogleTask", "Jira"];
        let mut keys = HashSet::new();
        for kind in kinds {
            for i in 0..200 {
                let task = TaskRecord::new(kind, format!("id-{i}"), "same title", "");
                assert!(keys.insert(task.cache_key()), "collision for {kind}/{i}");
            }
        }
        assert_eq!(keys.len(), 600);
    }

    #[test]
    fn test_same_id_different_kind_differs() {
        assert_ne!(
            CacheKey::compute("GoogleMail", "123"),
            CacheKey::compute("GoogleTask", "123")
        );
    }

    #[test]
    fn test_encode_decode_preserves_fields() {
        let tasks = [
            TaskRecord::new("Jira", "PROJ-7", "Review PR", "Needs two approvals"),
            TaskRecord::new("GoogleTask", "t1", "Buy milk", ""),
            TaskRecord::new("GoogleMail", "m1", "Process: Ünïcödé \"quoted\"", "line1\nline2"),
        ];
        for task in tasks {
            let bytes = task.encode().unwrap();
            assert_eq!(TaskRecord::decode(&bytes).unwrap(), task);
        }
    }

    #[test]
    fn test_decode_uses_expected_field_names() {
        let json = r#"{"kind":"Jira","id":"X-1","title":"t","description":"d"}"#;
        let task = TaskRecord::decode(json.as_bytes()).unwrap();
        assert_eq!(task, TaskRecord::new("Jira", "X-1", "t", "d"));
    }

    #[test]
    fn test_decode_missing_description_defaults_empty() {
        let json = r#"{"kind":"Jira","id":"X-1","title":"t"}"#;
        let task = TaskRecord::decode(json.as_bytes()).unwrap();
        assert!(!task.has_description());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(TaskRecord::decode(b"not json at all").is_err());
        assert!(TaskRecord::decode(br#"{"kind":"Jira"}"#).is_err());
    }
}

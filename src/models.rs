//! Core data model shared by every discovery strategy.
//!
//! A single record shape serves both the API-based and the clone-based
//! strategies and doubles as the cache file format (a JSON array of records).

use serde::{Deserialize, Serialize};

/// One commit authored by the configured user, as seen by a provider.
///
/// `datetime` is the ISO-8601 author timestamp kept verbatim as the source
/// produced it; it is parsed only when stats are derived. API-based discovery
/// fills every field; clone-based discovery cannot cheaply know per-commit
/// line stats or a web permalink, so `link`, `additions`, and `deletions`
/// stay `None` and are omitted from the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub datetime: String,
    pub hash: String,
    pub public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additions: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletions: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_absent_in_cache_still_deserialize() {
        // A record written by the clone-based strategy carries only the
        // required fields plus repo/message.
        let json = r#"{
            "datetime": "2024-03-01T09:15:00+01:00",
            "hash": "1f6a2b3c",
            "public": false,
            "repo": "acme/internal",
            "message": "Fix flaky retry test"
        }"#;

        let record: CommitRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.hash, "1f6a2b3c");
        assert_eq!(record.repo.as_deref(), Some("acme/internal"));
        assert_eq!(record.additions, None);
        assert_eq!(record.link, None);
    }

    #[test]
    fn none_fields_are_omitted_when_serialized() {
        let record = CommitRecord {
            datetime: "2024-03-01T09:15:00+01:00".to_string(),
            hash: "1f6a2b3c".to_string(),
            public: true,
            repo: Some("acme/api".to_string()),
            message: Some("Initial commit".to_string()),
            link: None,
            additions: None,
            deletions: None,
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("link"));
        assert!(!json.contains("additions"));
        assert!(json.contains("\"repo\":\"acme/api\""));
    }
}

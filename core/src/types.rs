//! Gist DTOs for the GitHub Gists API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently;
//! the integration tests catch schema drift between the two crates.
//! Timestamps are ISO-8601 strings on the wire and `DateTime<Utc>` here.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A gist as returned by the list and detail endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gist {
    pub id: String,
    pub description: Option<String>,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub owner: GistOwner,
    /// Keyed by file name.
    pub files: BTreeMap<String, GistFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GistOwner {
    pub login: String,
    pub avatar_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GistFile {
    pub filename: String,
    #[serde(rename = "type")]
    pub mime_type: Option<String>,
    pub language: Option<String>,
    pub raw_url: Option<String>,
    pub size: u64,
    /// Only present on the detail endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Request payload for creating a gist.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGist {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub public: bool,
    pub files: BTreeMap<String, NewGistFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGistFile {
    pub content: String,
}

impl Gist {
    /// The first file by name, if the gist has any.
    pub fn first_file(&self) -> Option<&GistFile> {
        self.files.values().next()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn gist_decodes_iso8601_timestamps() {
        let raw = r#"{
            "id": "abc",
            "description": null,
            "html_url": "https://gist.github.com/abc",
            "created_at": "2025-10-30T12:00:00Z",
            "updated_at": "2025-10-31T08:30:15Z",
            "owner": {"login": "octo", "avatar_url": "https://avatars.test/u/1"},
            "files": {}
        }"#;
        let gist: Gist = serde_json::from_str(raw).unwrap();
        assert_eq!(gist.created_at, Utc.with_ymd_and_hms(2025, 10, 30, 12, 0, 0).unwrap());
        assert_eq!(gist.updated_at, Utc.with_ymd_and_hms(2025, 10, 31, 8, 30, 15).unwrap());
        assert!(gist.description.is_none());
        assert!(gist.first_file().is_none());
    }

    #[test]
    fn gist_rejects_non_iso8601_dates() {
        let raw = r#"{
            "id": "abc",
            "description": "d",
            "html_url": "https://gist.github.com/abc",
            "created_at": "30/10/2025",
            "updated_at": "2025-10-30T12:00:00Z",
            "owner": {"login": "octo", "avatar_url": "https://avatars.test/u/1"},
            "files": {}
        }"#;
        assert!(serde_json::from_str::<Gist>(raw).is_err());
    }

    #[test]
    fn gist_file_maps_type_field() {
        let file: GistFile = serde_json::from_str(
            r#"{"filename":"a.rs","type":"text/x-rust","language":"Rust","raw_url":null,"size":3}"#,
        )
        .unwrap();
        assert_eq!(file.mime_type.as_deref(), Some("text/x-rust"));
        assert!(file.content.is_none());
    }

    #[test]
    fn new_gist_omits_missing_description() {
        let mut files = BTreeMap::new();
        files.insert(
            "hello.txt".to_string(),
            NewGistFile {
                content: "hi".to_string(),
            },
        );
        let gist = NewGist {
            description: None,
            public: true,
            files,
        };
        let json = serde_json::to_value(&gist).unwrap();
        assert!(json.get("description").is_none());
        assert_eq!(json["files"]["hello.txt"]["content"], "hi");
    }
}

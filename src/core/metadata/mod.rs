use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Value of the `active` flag for records in the active view.
pub const ACTIVE_FLAG: &str = "A";
/// Value of the `active` flag for deactivated records.
pub const INACTIVE_FLAG: &str = "I";

/// One metadata record as served by the backend. `feeds` and `authors` are
/// JSON text end-to-end; they are only decoded transiently for display
/// truncation or an update submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MetadataRecord {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub publication_date: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub feeds: String,
    #[serde(default)]
    pub authors: String,
    #[serde(default)]
    pub active: String,
}

impl MetadataRecord {
    pub fn is_active(&self) -> bool {
        self.active == ACTIVE_FLAG
    }
}

/// Structured decoding of one `feeds` element. The server may attach keys
/// beyond `link`; they must survive a decode/encode cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedEntry {
    pub link: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Structured decoding of one `authors` element.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthorEntry {
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// PUT body for an update. The server expects `feeds`/`authors` as
/// structured arrays here even though it serves them as JSON text on list.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MetadataUpdate {
    pub id: i64,
    pub title: String,
    pub publication_date: Option<String>,
    pub image_url: Option<String>,
    pub feeds: Vec<FeedEntry>,
    pub authors: Vec<AuthorEntry>,
    pub active: String,
}

/// POST /analyze body. Creation is URL ingestion: the client sends only a
/// source URL and the server builds the record.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest {
    pub url: String,
    pub features: AnalyzeFeatures,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct AnalyzeFeatures {
    pub metadata: Map<String, Value>,
}

pub fn parse_feeds(text: &str) -> Result<Vec<FeedEntry>, serde_json::Error> {
    serde_json::from_str(text)
}

pub fn parse_authors(text: &str) -> Result<Vec<AuthorEntry>, serde_json::Error> {
    serde_json::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_server_record_with_absent_optionals() {
        let raw = r#"{
            "id": 7,
            "title": "Primer artículo",
            "publicationDate": null,
            "feeds": "[]",
            "authors": "[]",
            "active": "A"
        }"#;
        let record: MetadataRecord =
            serde_json::from_str(raw).expect("server record should deserialize");

        assert_eq!(record.id, 7);
        assert_eq!(record.publication_date, None);
        assert_eq!(record.image_url, None);
        assert!(record.is_active());
    }

    #[test]
    fn feed_entries_keep_unknown_keys() {
        let parsed = parse_feeds(r#"[{"link":"https://example.com/feed","lang":"es"}]"#)
            .expect("feeds text should parse");
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].link, "https://example.com/feed");

        let reencoded = serde_json::to_string(&parsed).expect("feed entries should reencode");
        assert!(reencoded.contains("\"lang\":\"es\""));
    }

    #[test]
    fn author_parse_failure_is_an_error_not_a_panic() {
        assert!(parse_authors("not json").is_err());
        assert!(parse_authors(r#"[{"missing_name":true}]"#).is_err());
    }

    #[test]
    fn update_body_serializes_with_camel_case_and_arrays() {
        let update = MetadataUpdate {
            id: 3,
            title: "Título".to_string(),
            publication_date: Some("2024-03-05T09:30".to_string()),
            image_url: None,
            feeds: parse_feeds(r#"[{"link":"https://example.com/feed"}]"#).expect("feeds"),
            authors: parse_authors(r#"[{"name":"Ana"}]"#).expect("authors"),
            active: ACTIVE_FLAG.to_string(),
        };
        let body = serde_json::to_value(&update).expect("update should serialize");

        assert_eq!(body["publicationDate"], "2024-03-05T09:30");
        assert!(body["feeds"].is_array());
        assert_eq!(body["authors"][0]["name"], "Ana");
    }
}

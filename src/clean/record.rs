//! Input and output record types
//!
//! A [`Record`] is the immutable input unit handed to the pipeline by the
//! data-loading collaborator. A [`CleanedRecord`] is what the pipeline hands
//! back: the cleaned text, the psycholinguistic marker counts, and the drop
//! flag. The record identity is preserved end-to-end so cleaned output can
//! always be joined back to the original metadata and labels, including for
//! dropped records.

use crate::clean::error::RecordError;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Marker kinds counted by the encoder stages.
///
/// Serialized under the stable uppercase keys that downstream feature
/// extraction joins on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MarkerKind {
    #[serde(rename = "REPEATED_LETTER")]
    RepeatedLetter,
    #[serde(rename = "ALLCAPS_WORD")]
    AllcapsWord,
    #[serde(rename = "EMOTICON")]
    Emoticon,
    #[serde(rename = "REPEAT_PUNCT")]
    RepeatPunct,
    #[serde(rename = "MENTION")]
    Mention,
    #[serde(rename = "HASHTAG")]
    Hashtag,
}

impl MarkerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MarkerKind::RepeatedLetter => "REPEATED_LETTER",
            MarkerKind::AllcapsWord => "ALLCAPS_WORD",
            MarkerKind::Emoticon => "EMOTICON",
            MarkerKind::RepeatPunct => "REPEAT_PUNCT",
            MarkerKind::Mention => "MENTION",
            MarkerKind::Hashtag => "HASHTAG",
        }
    }
}

impl std::fmt::Display for MarkerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Marker-kind to occurrence-count mapping.
///
/// A `BTreeMap` keeps serialization order deterministic.
pub type MarkerCounts = BTreeMap<MarkerKind, u32>;

/// One raw input record.
///
/// Field aliases cover the column names of the original MBTI dataset
/// (`index` / `posts`) so exported JSON can be fed in unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Record {
    #[serde(
        alias = "id",
        alias = "index",
        deserialize_with = "deserialize_record_id"
    )]
    pub record_id: String,
    #[serde(alias = "text", alias = "posts", alias = "body")]
    pub raw_text: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

impl Record {
    pub fn new(record_id: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Record {
            record_id: record_id.into(),
            raw_text: raw_text.into(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Decode a record from raw bytes.
    ///
    /// This is the only place the `RecordError` taxonomy applies: a record
    /// whose bytes are not valid UTF-8 is reported with its identity so the
    /// batch driver can emit a dropped record instead of aborting.
    pub fn from_utf8(record_id: impl Into<String>, bytes: Vec<u8>) -> Result<Self, RecordError> {
        let record_id = record_id.into();
        match String::from_utf8(bytes) {
            Ok(raw_text) => Ok(Record::new(record_id, raw_text)),
            Err(err) => Err(RecordError::InvalidEncoding {
                record_id,
                message: err.to_string(),
            }),
        }
    }
}

/// Accept both string and integer record ids (the original dataset uses a
/// numeric `index` column).
fn deserialize_record_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Text(String),
        Number(i64),
    }

    Ok(match IdRepr::deserialize(deserializer)? {
        IdRepr::Text(s) => s,
        IdRepr::Number(n) => n.to_string(),
    })
}

/// One cleaned output record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanedRecord {
    pub record_id: String,
    pub text: String,
    pub markers: MarkerCounts,
    pub dropped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_reason: Option<String>,
}

impl CleanedRecord {
    /// Count for a marker kind, zero when the kind was never observed.
    pub fn marker(&self, kind: MarkerKind) -> u32 {
        self.markers.get(&kind).copied().unwrap_or(0)
    }

    /// A dropped record produced outside the pipeline proper, e.g. for a
    /// record that failed to decode. Markers are empty; the reason carries
    /// the diagnostic.
    pub fn dropped_with_reason(record_id: impl Into<String>, reason: impl Into<String>) -> Self {
        CleanedRecord {
            record_id: record_id.into(),
            text: String::new(),
            markers: MarkerCounts::new(),
            dropped: true,
            drop_reason: Some(reason.into()),
        }
    }
}

impl From<&RecordError> for CleanedRecord {
    fn from(err: &RecordError) -> Self {
        CleanedRecord::dropped_with_reason(err.record_id(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deserializes_original_dataset_fields() {
        let record: Record =
            serde_json::from_str(r#"{"index": 42, "posts": "Hello world"}"#).unwrap();
        assert_eq!(record.record_id, "42");
        assert_eq!(record.raw_text, "Hello world");
        assert!(record.metadata.is_empty());
    }

    #[test]
    fn test_record_deserializes_canonical_fields() {
        let record: Record = serde_json::from_str(
            r#"{"record_id": "r1", "raw_text": "hi", "metadata": {"source": "twitter"}}"#,
        )
        .unwrap();
        assert_eq!(record.record_id, "r1");
        assert_eq!(record.metadata["source"], "twitter");
    }

    #[test]
    fn test_from_utf8_rejects_invalid_bytes() {
        let err = Record::from_utf8("r9", vec![0xff, 0xfe]).unwrap_err();
        assert_eq!(err.record_id(), "r9");

        let cleaned = CleanedRecord::from(&err);
        assert!(cleaned.dropped);
        assert_eq!(cleaned.record_id, "r9");
        assert!(cleaned.drop_reason.is_some());
        assert!(cleaned.text.is_empty());
    }

    #[test]
    fn test_from_utf8_accepts_valid_bytes() {
        let record = Record::from_utf8("r1", "héllo".as_bytes().to_vec()).unwrap();
        assert_eq!(record.raw_text, "héllo");
    }

    #[test]
    fn test_marker_accessor_defaults_to_zero() {
        let cleaned = CleanedRecord::dropped_with_reason("r1", "test");
        assert_eq!(cleaned.marker(MarkerKind::Emoticon), 0);
    }

    #[test]
    fn test_marker_counts_serialize_with_stable_keys() {
        let mut markers = MarkerCounts::new();
        markers.insert(MarkerKind::AllcapsWord, 3);
        markers.insert(MarkerKind::RepeatPunct, 1);
        let cleaned = CleanedRecord {
            record_id: "r1".into(),
            text: "hi".into(),
            markers,
            dropped: false,
            drop_reason: None,
        };

        let json = serde_json::to_string(&cleaned).unwrap();
        assert!(json.contains("\"ALLCAPS_WORD\":3"));
        assert!(json.contains("\"REPEAT_PUNCT\":1"));
        assert!(!json.contains("drop_reason"));
    }

    #[test]
    fn test_marker_kind_display() {
        assert_eq!(MarkerKind::RepeatedLetter.to_string(), "REPEATED_LETTER");
        assert_eq!(MarkerKind::Hashtag.to_string(), "HASHTAG");
    }
}

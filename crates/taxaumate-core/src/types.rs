//! Shared retrieval and transcript types.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which corpus a candidate or record came from.
///
/// Each source has its own vector index and its own document collection, so the
/// tag survives the merge and routes the id to the right store during hydration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// ATO rulings, guides, and web pages.
    Document,
    /// Acts and regulations from the Australian legal database.
    Legislation,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Legislation => "legislation",
        }
    }

    /// Human-readable label used in the model context block.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Document => "Document",
            Self::Legislation => "Legislation",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ranked id returned by a vector index, before hydration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub id: String,
    pub score: f32,
    pub source_type: SourceType,
}

impl MatchCandidate {
    pub fn new(id: impl Into<String>, score: f32, source_type: SourceType) -> Self {
        Self {
            id: id.into(),
            score,
            source_type,
        }
    }
}

/// A candidate resolved to its full record in a document store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydratedRecord {
    pub id: String,
    pub title: String,
    /// Source URL, or an equivalent identifier for records without one.
    pub url: String,
    pub text: String,
    pub source_type: SourceType,
}

impl HydratedRecord {
    pub const UNTITLED: &'static str = "Untitled";
    pub const NO_URL: &'static str = "No URL available";
    pub const NO_TEXT: &'static str = "No text available";

    /// Build a record from optional store fields, filling the display defaults
    /// for anything missing.
    pub fn from_parts(
        id: impl Into<String>,
        title: Option<String>,
        url: Option<String>,
        text: Option<String>,
        source_type: SourceType,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.unwrap_or_else(|| Self::UNTITLED.to_string()),
            url: url.unwrap_or_else(|| Self::NO_URL.to_string()),
            text: text.unwrap_or_else(|| Self::NO_TEXT.to_string()),
            source_type,
        }
    }
}

/// Title and link of a retrieved record, as listed in the sources panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub title: String,
    pub url: String,
    pub source_type: SourceType,
}

impl From<&HydratedRecord> for SourceRef {
    fn from(record: &HydratedRecord) -> Self {
        Self {
            title: record.title.clone(),
            url: record.url.clone(),
            source_type: record.source_type,
        }
    }
}

/// Speaker of a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One message in the session transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_type_serialises_lowercase() {
        let json = serde_json::to_string(&SourceType::Legislation).unwrap();
        assert_eq!(json, "\"legislation\"");
        let parsed: SourceType = serde_json::from_str("\"document\"").unwrap();
        assert_eq!(parsed, SourceType::Document);
    }

    #[test]
    fn missing_fields_get_display_defaults() {
        let record = HydratedRecord::from_parts("abc", None, None, None, SourceType::Document);
        assert_eq!(record.title, "Untitled");
        assert_eq!(record.url, "No URL available");
        assert_eq!(record.text, "No text available");
    }

    #[test]
    fn source_ref_from_record() {
        let record = HydratedRecord::from_parts(
            "itaa97-8-1",
            Some("ITAA 1997 s 8-1".into()),
            Some("https://www.legislation.gov.au/C2004A05138".into()),
            Some("You can deduct from your assessable income...".into()),
            SourceType::Legislation,
        );
        let source = SourceRef::from(&record);
        assert_eq!(source.title, "ITAA 1997 s 8-1");
        assert_eq!(source.source_type, SourceType::Legislation);
    }

    #[test]
    fn transcript_entry_json_shape() {
        let entry = TranscriptEntry {
            role: Role::Assistant,
            content: "Hello".into(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"Hello"}"#);
    }
}

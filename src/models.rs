//! Core data models used throughout Docent.
//!
//! These types represent the documents, fragments, and messages that flow
//! through the ingestion and answer pipeline.

use serde::Serialize;

/// A raw file handed to the pipeline before extraction.
///
/// Local uploads, directory scans, HTTP uploads, and Google Drive downloads
/// all converge to this shape so that extraction, chunking, and retrieval
/// never need to know where a file came from.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}

/// A registered document. Names are unique across a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pub id: String,
    pub name: String,
}

impl Document {
    /// Creates a document whose id is derived from its name and the
    /// ingestion time in unix milliseconds.
    pub fn new(name: &str, ingested_at_millis: i64) -> Self {
        Self {
            id: format!("{}-{}", name, ingested_at_millis),
            name: name.to_string(),
        }
    }
}

/// A paragraph-sized slice of a document's text; the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
    /// `<document id>-<index>`.
    pub id: String,
    /// Name of the owning document.
    pub source: String,
    pub content: String,
}

/// A fragment paired with its keyword-overlap score for one retrieval call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredFragment {
    #[serde(flatten)]
    pub fragment: Fragment,
    pub score: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One entry of the conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            content: content.into(),
        }
    }
}

//! Data model for the upstream content API.
//!
//! Everything here is read-only from the API's point of view: batches and
//! subjects are never mutated locally, and raw content items only exist long
//! enough to be reshaped into [`ContentRecord`]s.

use serde::{Deserialize, Serialize};

/// A course batch the user is enrolled in.
#[derive(Debug, Clone, Deserialize)]
pub struct Batch {
    #[serde(rename = "_id")]
    pub id: String,

    pub name: String,

    /// Fee details; absent for free batches.
    #[serde(rename = "feeId", default)]
    pub fee: Option<Fee>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Fee {
    /// Total price. The API is inconsistent about the JSON type here,
    /// so it is kept as a raw value and rendered on demand.
    #[serde(default)]
    pub total: Option<serde_json::Value>,
}

impl Batch {
    /// Render the batch price, falling back to `"Free"` when no fee is set.
    pub fn price(&self) -> String {
        match self.fee.as_ref().and_then(|f| f.total.as_ref()) {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(v) => v.to_string(),
            None => "Free".to_string(),
        }
    }
}

/// A topical grouping of content items within a batch.
#[derive(Debug, Clone, Deserialize)]
pub struct Subject {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(rename = "subject")]
    pub name: String,
}

/// One item from the content-listing endpoint, before normalization.
///
/// All fields are defaulted: the upstream records are shaped differently per
/// content type, and the normalizer decides what is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawItem {
    pub topic: String,

    pub url: String,

    #[serde(rename = "homeworkIds")]
    pub homework: Vec<Homework>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Homework {
    pub topic: String,

    #[serde(rename = "attachmentIds")]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Attachment {
    #[serde(rename = "baseUrl")]
    pub base_url: String,

    pub key: String,
}

/// The unit of output: one line in an export artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    pub title: String,
    pub url: String,
}

/// Selector for which category of resource to extract and how to shape
/// its URL. Closed enumeration; the serde spellings match the upstream
/// `contentType` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    #[serde(rename = "exercises-notes-videos")]
    ExercisesNotesVideos,

    #[serde(rename = "notes")]
    Notes,

    DppNotes,

    DppSolution,
}

impl ContentType {
    pub const ALL: [ContentType; 4] = [
        ContentType::ExercisesNotesVideos,
        ContentType::Notes,
        ContentType::DppNotes,
        ContentType::DppSolution,
    ];

    /// Upstream query-parameter spelling (also used as menu callback data).
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::ExercisesNotesVideos => "exercises-notes-videos",
            ContentType::Notes => "notes",
            ContentType::DppNotes => "DppNotes",
            ContentType::DppSolution => "DppSolution",
        }
    }

    /// Short label for menu buttons.
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::ExercisesNotesVideos => "Exercises",
            ContentType::Notes => "Notes",
            ContentType::DppNotes => "DppNotes",
            ContentType::DppSolution => "DppSolution",
        }
    }

    /// Parse the query-parameter spelling back into a content type.
    pub fn parse(s: &str) -> Option<ContentType> {
        Self::ALL.iter().copied().find(|t| t.as_str() == s)
    }
}

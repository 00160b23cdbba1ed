use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

pub const UNTITLED: &str = "Untitled";

/// A free-form note kept inside a workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub author_id: String,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Column values written on insert and update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteFields {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

/// Partial update; `None` leaves the current value in place
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NoteChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl NoteFields {
    /// Normalized values for a new note. A blank title becomes [`UNTITLED`].
    pub fn new(title: &str, content: String, tags: &[String]) -> Self {
        let title = match title.trim() {
            "" => UNTITLED.to_string(),
            t => t.to_string(),
        };
        Self {
            title,
            content,
            tags: normalize_tags(tags),
        }
    }

    /// Merge `changes` over the stored note. A blank title keeps the current one.
    pub fn merged(note: &Note, changes: NoteChanges) -> Self {
        let title = changes
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map_or_else(|| note.title.clone(), str::to_string);
        Self {
            title,
            content: changes.content.unwrap_or_else(|| note.content.clone()),
            tags: changes
                .tags
                .map_or_else(|| note.tags.clone(), |tags| normalize_tags(&tags)),
        }
    }
}

/// Trim, drop blanks and dedupe case-insensitively, keeping the first spelling seen
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(tag.to_lowercase()))
        .map(str::to_string)
        .collect()
}

//! Work order note model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::wire;

/// A note attached to a work order. Notes are appended server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Plain text content
    #[serde(default, deserialize_with = "wire::string_or_empty")]
    pub text: String,
    /// Author display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,
    /// Creation timestamp
    #[serde(
        default,
        deserialize_with = "wire::optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Note {
    /// Header line shown above the note body: `YYYY-MM-DD HH:MM  •  author`.
    #[must_use]
    pub fn header(&self) -> String {
        let timestamp = self
            .created_at
            .map(|at| {
                at.with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string()
            })
            .unwrap_or_default();
        match self.by.as_deref().map(str::trim).filter(|by| !by.is_empty()) {
            Some(by) if timestamp.is_empty() => by.to_string(),
            Some(by) => format!("{timestamp}  •  {by}"),
            None => timestamp,
        }
    }
}

/// Sorts notes newest first; notes without a timestamp sort last.
pub fn sort_notes_newest_first(notes: &mut [Note]) {
    notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

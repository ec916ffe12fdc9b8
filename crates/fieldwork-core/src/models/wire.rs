//! Lenient decoders for collaborator JSON fields.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

use super::note::Note;
use super::status::WorkOrderStatus;

const NAIVE_DATE_TIME_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses the timestamp shapes the collaborator has been seen to emit.
///
/// Naive values (no offset) are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|value| value.and_utc())
}

pub fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

pub fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn status_or_default<'de, D>(deserializer: D) -> Result<WorkOrderStatus, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(normalize_status(Option::<String>::deserialize(deserializer)?))
}

fn normalize_status(raw: Option<String>) -> WorkOrderStatus {
    crate::util::normalize_text_option(raw)
        .map_or_else(WorkOrderStatus::default, WorkOrderStatus::from)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NotesField {
    List(Vec<Note>),
    Encoded(String),
}

/// Notes arrive either as an array or as a JSON string holding an array.
pub fn notes_field<'de, D>(deserializer: D) -> Result<Vec<Note>, D::Error>
where
    D: Deserializer<'de>,
{
    let notes = match Option::<NotesField>::deserialize(deserializer)? {
        Some(NotesField::List(notes)) => notes,
        Some(NotesField::Encoded(raw)) => serde_json::from_str(&raw).unwrap_or_else(|error| {
            tracing::debug!("Ignoring unparseable notes payload: {}", error);
            Vec::new()
        }),
        None => Vec::new(),
    };
    Ok(notes)
}

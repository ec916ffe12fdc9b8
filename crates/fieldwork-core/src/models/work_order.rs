//! Work order model

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::note::{sort_notes_newest_first, Note};
use super::status::WorkOrderStatus;
use super::wire;

/// Server-assigned work order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct WorkOrderId(i64);

impl WorkOrderId {
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for WorkOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WorkOrderId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl<'de> Deserialize<'de> for WorkOrderId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(i64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Number(value) => Ok(Self(value)),
            RawId::Text(raw) => raw.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// A schedulable service job record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrder {
    pub id: WorkOrderId,
    #[serde(default, deserialize_with = "wire::string_or_empty")]
    pub po_number: String,
    #[serde(default, deserialize_with = "wire::string_or_empty")]
    pub customer: String,
    #[serde(default, deserialize_with = "wire::string_or_empty")]
    pub site_location: String,
    #[serde(default, deserialize_with = "wire::string_or_empty")]
    pub billing_address: String,
    #[serde(default, deserialize_with = "wire::string_or_empty")]
    pub problem_description: String,
    #[serde(default, deserialize_with = "wire::status_or_default")]
    pub status: WorkOrderStatus,
    #[serde(default, deserialize_with = "wire::optional_timestamp")]
    pub scheduled_date: Option<DateTime<Utc>>,
    /// Comma-joined photo storage keys.
    #[serde(default)]
    pub photo_path: Option<String>,
    /// PDF storage key.
    #[serde(default)]
    pub pdf_path: Option<String>,
    #[serde(default, deserialize_with = "wire::notes_field")]
    pub notes: Vec<Note>,
}

impl WorkOrder {
    /// Photo storage keys split out of `photo_path`.
    #[must_use]
    pub fn photo_keys(&self) -> Vec<String> {
        self.photo_path
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// PDF storage key when one is attached.
    #[must_use]
    pub fn pdf_key(&self) -> Option<&str> {
        self.pdf_path
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    #[must_use]
    pub fn notes_newest_first(&self) -> Vec<Note> {
        let mut notes = self.notes.clone();
        sort_notes_newest_first(&mut notes);
        notes
    }

    /// PO number for display, `N/A` when empty.
    #[must_use]
    pub fn display_po(&self) -> &str {
        let po = self.po_number.trim();
        if po.is_empty() {
            "N/A"
        } else {
            po
        }
    }

    /// Calendar day of the scheduled date in `tz`.
    pub fn scheduled_day_in<Tz: TimeZone>(&self, tz: &Tz) -> Option<NaiveDate> {
        self.scheduled_date
            .map(|scheduled| scheduled.with_timezone(tz).date_naive())
    }

    /// `YYYY-MM-DD HH:MM` in `tz`, or `Not Scheduled`.
    pub fn scheduled_label_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: fmt::Display,
    {
        self.scheduled_date.map_or_else(
            || "Not Scheduled".to_string(),
            |scheduled| {
                scheduled
                    .with_timezone(tz)
                    .format("%Y-%m-%d %H:%M")
                    .to_string()
            },
        )
    }

    /// Google Maps search URL for the site location.
    #[must_use]
    pub fn maps_url(&self) -> Option<String> {
        let location = self.site_location.trim();
        if location.is_empty() {
            return None;
        }
        Some(format!(
            "https://www.google.com/maps/search/?api=1&query={}",
            urlencoding::encode(location)
        ))
    }

    /// File name used when uploading an annotated copy of this order's PDF.
    #[must_use]
    pub fn signed_pdf_file_name(&self) -> String {
        let po = self.po_number.trim();
        if po.is_empty() {
            format!("WO-{}-signed.pdf", self.id)
        } else {
            format!("WO-{po}-signed.pdf")
        }
    }
}

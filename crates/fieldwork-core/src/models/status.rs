//! Work order status enumeration

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Work order status as stored by the collaborator.
///
/// Values outside the known set are kept verbatim in [`WorkOrderStatus::Other`]
/// so one unexpected row never fails a whole list fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WorkOrderStatus {
    NeedsToBeScheduled,
    Scheduled,
    WaitingForApproval,
    WaitingOnParts,
    Completed,
    PartsIn,
    Other(String),
}

impl WorkOrderStatus {
    /// Statuses offered by the status pickers, in display order.
    pub const PICKER: [Self; 5] = [
        Self::NeedsToBeScheduled,
        Self::Scheduled,
        Self::WaitingForApproval,
        Self::WaitingOnParts,
        Self::Completed,
    ];

    /// Status assigned to orders created from the client.
    pub const CREATE_DEFAULT: Self = Self::PartsIn;

    /// Status used by the edit form when the fetched order has none.
    pub const EDIT_DEFAULT: Self = Self::NeedsToBeScheduled;

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::NeedsToBeScheduled => "Needs to be Scheduled",
            Self::Scheduled => "Scheduled",
            Self::WaitingForApproval => "Waiting for Approval",
            Self::WaitingOnParts => "Waiting on Parts",
            Self::Completed => "Completed",
            Self::PartsIn => "Parts In",
            Self::Other(raw) => raw,
        }
    }

    #[must_use]
    pub const fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }

    fn from_label(raw: &str) -> Self {
        let trimmed = raw.trim();
        Self::PICKER
            .into_iter()
            .chain(std::iter::once(Self::PartsIn))
            .find(|status| status.label().eq_ignore_ascii_case(trimmed))
            .unwrap_or_else(|| Self::Other(trimmed.to_string()))
    }
}

impl Default for WorkOrderStatus {
    fn default() -> Self {
        Self::EDIT_DEFAULT
    }
}

impl fmt::Display for WorkOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for WorkOrderStatus {
    fn from(value: String) -> Self {
        Self::from_label(&value)
    }
}

impl From<WorkOrderStatus> for String {
    fn from(value: WorkOrderStatus) -> Self {
        match value {
            WorkOrderStatus::Other(raw) => raw,
            known => known.label().to_string(),
        }
    }
}

impl FromStr for WorkOrderStatus {
    type Err = String;

    /// Strict parse used for user input: only known statuses are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let status = Self::from_label(s);
        if status.is_known() {
            Ok(status)
        } else {
            let options = Self::PICKER
                .iter()
                .map(Self::label)
                .collect::<Vec<_>>()
                .join(", ");
            Err(format!("Unknown status '{}'. Expected one of: {options}", s.trim()))
        }
    }
}

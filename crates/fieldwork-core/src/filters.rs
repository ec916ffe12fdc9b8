//! Work order list filtering and dashboard grouping.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, TimeZone};

use crate::models::{WorkOrder, WorkOrderId, WorkOrderStatus};

/// Filter choices offered above the work order list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Today,
    Status(WorkOrderStatus),
}

impl StatusFilter {
    /// Every picker option in display order.
    #[must_use]
    pub fn options() -> Vec<Self> {
        let mut options = vec![Self::All, Self::Today];
        options.extend(WorkOrderStatus::PICKER.into_iter().map(Self::Status));
        options
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::All => "All",
            Self::Today => "Today",
            Self::Status(status) => status.label(),
        }
    }

    /// Whether `order` passes this filter on `today` in `tz`.
    pub fn matches<Tz: TimeZone>(&self, order: &WorkOrder, today: NaiveDate, tz: &Tz) -> bool {
        match self {
            Self::All => true,
            Self::Today => order.scheduled_day_in(tz) == Some(today),
            Self::Status(status) => &order.status == status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else if trimmed.eq_ignore_ascii_case("today") {
            Ok(Self::Today)
        } else {
            trimmed.parse().map(Self::Status)
        }
    }
}

/// Orders passing `filter`, in their original order.
pub fn filter_work_orders<Tz: TimeZone>(
    orders: &[WorkOrder],
    filter: &StatusFilter,
    today: NaiveDate,
    tz: &Tz,
) -> Vec<WorkOrder> {
    orders
        .iter()
        .filter(|order| filter.matches(order, today, tz))
        .cloned()
        .collect()
}

/// "Agenda for Today": orders scheduled on `day` in `tz`.
pub fn agenda_for_day<Tz: TimeZone>(orders: &[WorkOrder], day: NaiveDate, tz: &Tz) -> Vec<WorkOrder> {
    filter_work_orders(orders, &StatusFilter::Today, day, tz)
}

/// "Upcoming": orders scheduled strictly after local midnight starting `day`.
///
/// Orders later on `day` itself are included, so they can appear in both
/// dashboard sections.
pub fn upcoming_after<Tz: TimeZone>(orders: &[WorkOrder], day: NaiveDate, tz: &Tz) -> Vec<WorkOrder> {
    let Some(start) = day
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| tz.from_local_datetime(&midnight).earliest())
    else {
        return Vec::new();
    };

    orders
        .iter()
        .filter(|order| {
            order
                .scheduled_date
                .is_some_and(|scheduled| scheduled > start)
        })
        .cloned()
        .collect()
}

/// Optimistically sets `status` on the order with `id`.
///
/// Returns the previous list so the caller can roll back when the server
/// rejects the change, or `None` when no order matched.
pub fn apply_status_change(
    orders: &mut Vec<WorkOrder>,
    id: WorkOrderId,
    status: WorkOrderStatus,
) -> Option<Vec<WorkOrder>> {
    let index = orders.iter().position(|order| order.id == id)?;
    let previous = orders.clone();
    orders[index].status = status;
    Some(previous)
}

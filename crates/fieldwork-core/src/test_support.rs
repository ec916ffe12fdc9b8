//! Fixtures shared by unit tests.

use chrono::{DateTime, TimeZone, Utc};

use crate::models::{WorkOrder, WorkOrderId, WorkOrderStatus};

pub fn sample_order(id: i64) -> WorkOrder {
    WorkOrder {
        id: WorkOrderId::new(id),
        po_number: format!("PO-{id}"),
        customer: format!("Customer {id}"),
        site_location: "12 Harbor Rd, Portland ME".to_string(),
        billing_address: "1 Main St".to_string(),
        problem_description: "Walk-in cooler not holding temperature".to_string(),
        status: WorkOrderStatus::NeedsToBeScheduled,
        scheduled_date: None,
        photo_path: None,
        pdf_path: None,
        notes: Vec::new(),
    }
}

pub fn scheduled_order(id: i64, status: WorkOrderStatus, at: DateTime<Utc>) -> WorkOrder {
    WorkOrder {
        status,
        scheduled_date: Some(at),
        ..sample_order(id)
    }
}

pub fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .expect("valid test timestamp")
}

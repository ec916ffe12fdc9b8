//! Create and edit form state for work orders.

use crate::error::{Error, Result};
use crate::files::UploadFile;
use crate::models::{WorkOrder, WorkOrderStatus};

/// Editable text fields of a work order, as sent in multipart bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkOrderForm {
    pub po_number: String,
    pub customer: String,
    pub site_location: String,
    pub billing_address: String,
    pub problem_description: String,
    pub status: WorkOrderStatus,
}

impl Default for WorkOrderForm {
    fn default() -> Self {
        Self::for_create()
    }
}

impl WorkOrderForm {
    /// Blank form for a new order, defaulted to `Parts In`.
    #[must_use]
    pub fn for_create() -> Self {
        Self {
            po_number: String::new(),
            customer: String::new(),
            site_location: String::new(),
            billing_address: String::new(),
            problem_description: String::new(),
            status: WorkOrderStatus::CREATE_DEFAULT,
        }
    }

    /// Form pre-filled from a fetched order.
    #[must_use]
    pub fn from_work_order(order: &WorkOrder) -> Self {
        let status = match &order.status {
            WorkOrderStatus::Other(raw) if raw.trim().is_empty() => WorkOrderStatus::EDIT_DEFAULT,
            status => status.clone(),
        };
        Self {
            po_number: order.po_number.clone(),
            customer: order.customer.clone(),
            site_location: order.site_location.clone(),
            billing_address: order.billing_address.clone(),
            problem_description: order.problem_description.clone(),
            status,
        }
    }

    /// Names of required fields that are blank after trimming.
    #[must_use]
    pub fn missing_required_fields(&self) -> Vec<&'static str> {
        [
            ("Customer", &self.customer),
            ("Billing Address", &self.billing_address),
            ("Problem Description", &self.problem_description),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(label, _)| label)
        .collect()
    }

    /// Required-field check run before any request is sent.
    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_required_fields();
        if missing.is_empty() {
            return Ok(());
        }
        Err(Error::Validation(format!(
            "{} {} required.",
            join_labels(&missing),
            if missing.len() == 1 { "is" } else { "are" }
        )))
    }

    /// Multipart text fields in wire order.
    #[must_use]
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        vec![
            ("poNumber", self.po_number.clone()),
            ("customer", self.customer.clone()),
            ("siteLocation", self.site_location.clone()),
            ("billingAddress", self.billing_address.clone()),
            ("problemDescription", self.problem_description.clone()),
            ("status", self.status.label().to_string()),
        ]
    }
}

/// A validated form plus the files to send with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub form: WorkOrderForm,
    pub files: Vec<UploadFile>,
}

impl FormSubmission {
    pub fn new(form: WorkOrderForm, files: Vec<UploadFile>) -> Result<Self> {
        form.validate()?;
        Ok(Self { form, files })
    }
}

fn join_labels(labels: &[&str]) -> String {
    match labels {
        [] => String::new(),
        [only] => (*only).to_string(),
        [first, second] => format!("{first} and {second}"),
        [rest @ .., last] => format!("{}, and {last}", rest.join(", ")),
    }
}

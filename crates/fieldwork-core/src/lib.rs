//! fieldwork-core - Core library for Fieldwork
//!
//! This crate contains the work order models, the HTTP client for the work
//! order API, and the list, calendar, form, and PDF annotation logic shared
//! by the CLI and mobile interfaces.

pub mod annotate;
pub mod api;
pub mod calendar;
pub mod config;
pub mod error;
pub mod files;
pub mod filters;
pub mod forms;
pub mod models;
pub mod session;
pub mod util;

#[cfg(test)]
mod test_support;

pub use api::WorkOrderApi;
pub use config::ClientConfig;
pub use error::{Error, ErrorCategory, Result};
pub use models::{CurrentUser, Note, Session, WorkOrder, WorkOrderId, WorkOrderStatus};
pub use session::{MemorySessionStore, SessionPersistence};

//! Data models for Fieldwork

mod note;
mod session;
mod status;
mod wire;
mod work_order;

pub use note::{sort_notes_newest_first, Note};
pub use session::{CurrentUser, Session};
pub use status::WorkOrderStatus;
pub use wire::parse_timestamp;
pub use work_order::{WorkOrder, WorkOrderId};

pub(crate) use wire::notes_field;

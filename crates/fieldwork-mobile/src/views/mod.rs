//! One component per navigation screen.

mod annotate;
mod calendar;
mod detail;
mod form;
mod home;
mod list;
mod login;
mod sketch;

pub use annotate::AnnotatePdfView;
pub use calendar::CalendarView;
pub use detail::WorkOrderDetailView;
pub use form::{AddWorkOrderView, EditWorkOrderView};
pub use home::HomeView;
pub use list::{WorkOrderListView, WorkOrderRow};
pub use login::LoginView;
pub use sketch::DrawNoteView;

use dioxus::prelude::*;

use crate::attachments::PickedFile;

/// Reads every file chosen in a file input.
async fn picked_files(event: FormEvent) -> Vec<PickedFile> {
    let Some(engine) = event.files() else {
        return Vec::new();
    };
    let mut picked = Vec::new();
    for name in engine.files() {
        match engine.read_file(&name).await {
            Some(bytes) => picked.push(PickedFile { name, bytes }),
            None => tracing::warn!("Could not read picked file {}", name),
        }
    }
    picked
}

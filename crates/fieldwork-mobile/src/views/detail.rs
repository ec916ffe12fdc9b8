use std::future::Future;
use std::pin::Pin;

use dioxus::prelude::*;
use fieldwork_core::util::unix_timestamp_millis;
use fieldwork_core::{WorkOrder, WorkOrderId, WorkOrderStatus};

use crate::app::{report_error, use_api, use_navigator, Api};
use crate::attachments::{pdf_upload, photo_uploads};
use crate::navigation::Screen;
use crate::paths::cache_dir;
use crate::preview::{system_rasterizer, viewer_previews, PagePreview};
use crate::ui::{ButtonVariant, ErrorBanner, StatusBadge, StatusSelect, UiButton, UiTextarea};
use crate::views::picked_files;

type Request = Pin<Box<dyn Future<Output = fieldwork_core::Result<()>>>>;

async fn load_preview(api: &Api, id: WorkOrderId, key: &str) -> fieldwork_core::Result<Vec<PagePreview>> {
    let bytes = api.download_file(key).await?;
    match cache_dir() {
        Ok(cache) => {
            if let Err(error) = cache.write(&cache.preview_pdf_path(id), &bytes) {
                tracing::warn!("Could not cache preview for work order {}: {}", id, error);
            }
        }
        Err(error) => tracing::warn!("No cache directory: {}", error),
    }
    viewer_previews(&system_rasterizer()?, &bytes)
}

/// Every page of the attached PDF, read-only.
#[component]
fn PdfPreview(id: WorkOrderId, pdf_key: String) -> Element {
    let api = use_api();
    let navigator = use_navigator();
    let previews = use_resource(move || {
        let api = api.clone();
        let key = pdf_key.clone();
        async move {
            load_preview(&api, id, &key)
                .await
                .map_err(|failure| report_error(&failure, &api, navigator))
        }
    });

    let state = previews.read();
    match &*state {
        None => rsx! { p { class: "ui-muted", "Loading preview..." } },
        Some(Ok(pages)) => rsx! {
            for page in pages.iter() {
                img {
                    key: "{page.layout.index}",
                    src: "{page.image_uri}",
                    alt: "Page {page.layout.index + 1}",
                    style: "width: 100%; height: auto; border: 1px solid #e5e7eb; border-radius: 6px;",
                }
            }
        },
        Some(Err(Some(message))) => rsx! { p { class: "ui-muted", "Preview unavailable: {message}" } },
        Some(Err(None)) => rsx! {},
    }
}

#[component]
pub fn WorkOrderDetailView(id: WorkOrderId) -> Element {
    let api = use_api();
    let mut navigator = use_navigator();
    let mut order = use_signal(|| None::<WorkOrder>);
    let mut error = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);
    let mut note_text = use_signal(String::new);

    let mut fetch = use_future({
        let api = api.clone();
        move || {
            let api = api.clone();
            async move {
                match api.get_work_order(id).await {
                    Ok(loaded) => order.set(Some(loaded)),
                    Err(failure) => error.set(report_error(&failure, &api, navigator)),
                }
            }
        }
    });

    // Runs one mutating request, then refetches the order on success.
    let run = use_callback({
        let api = api.clone();
        move |request: Request| {
            let api = api.clone();
            spawn(async move {
                busy.set(true);
                error.set(None);
                match request.await {
                    Ok(()) => fetch.restart(),
                    Err(failure) => error.set(report_error(&failure, &api, navigator)),
                }
                busy.set(false);
            });
        }
    });

    let Some(current) = order() else {
        return rsx! {
            ErrorBanner { message: error() }
            if error().is_none() {
                p { class: "ui-muted", "Loading..." }
            }
        };
    };

    let photos = current.photo_keys();
    let pdf_key = current.pdf_key().map(str::to_string);
    let pdf_url = pdf_key.as_deref().and_then(|key| api.file_url(key));
    let notes = current.notes_newest_first();
    let scheduled = current.scheduled_label_in(&chrono::Local);
    let maps_url = current.maps_url();

    rsx! {
        ErrorBanner { message: error() }
        div {
            class: "ui-card",
            p { style: "margin: 0; font-weight: 700;", "#{current.id}  {current.customer}" }
            StatusBadge { status: current.status.clone() }
            p { class: "ui-muted", "PO Number: {current.display_po()}" }
            p { class: "ui-muted", "Scheduled: {scheduled}" }
            p { class: "ui-muted", "Billing: {current.billing_address}" }
            p {
                class: "ui-muted",
                "Site: {current.site_location} "
                if let Some(url) = maps_url {
                    a { href: "{url}", target: "_blank", "(map)" }
                }
            }
            p { style: "margin: 6px 0 0 0; white-space: pre-wrap;", "{current.problem_description}" }
            StatusSelect {
                value: current.status.clone(),
                disabled: busy(),
                onchange: {
                    let api = api.clone();
                    move |status: WorkOrderStatus| {
                        let api = api.clone();
                        run.call(Box::pin(async move { api.update_status(id, &status).await }));
                    }
                },
            }
            div {
                style: "display: flex; gap: 8px; flex-wrap: wrap;",
                UiButton {
                    variant: ButtonVariant::Outline,
                    onclick: move |_| navigator.write().push(Screen::EditWorkOrder(id)),
                    "Edit"
                }
                UiButton {
                    variant: ButtonVariant::Outline,
                    onclick: move |_| navigator.write().push(Screen::DrawNote(id)),
                    "Draw Note"
                }
                if pdf_key.is_some() {
                    UiButton {
                        variant: ButtonVariant::Outline,
                        onclick: move |_| navigator.write().push(Screen::AnnotatePdf(id)),
                        "Sign PDF"
                    }
                }
            }
        }

        div {
            class: "ui-card",
            strong { "Photos ({photos.len()})" }
            for key in photos {
                div {
                    key: "{key}",
                    style: "display: flex; flex-direction: column; gap: 4px;",
                    if let Some(url) = api.file_url(&key) {
                        img { src: "{url}", style: "max-width: 100%; border-radius: 8px;" }
                    }
                    UiButton {
                        variant: ButtonVariant::Danger,
                        disabled: busy(),
                        onclick: {
                            let api = api.clone();
                            let key = key.clone();
                            move |_| {
                                let api = api.clone();
                                let key = key.clone();
                                run.call(Box::pin(async move { api.delete_attachment(id, &key).await }));
                            }
                        },
                        "Delete photo"
                    }
                }
            }
            label { class: "ui-muted", "Add photos" }
            input {
                r#type: "file",
                accept: "image/*",
                multiple: true,
                disabled: busy(),
                onchange: {
                    let api = api.clone();
                    move |event: FormEvent| {
                        let api = api.clone();
                        run.call(Box::pin(async move {
                            let uploads = photo_uploads(picked_files(event).await, unix_timestamp_millis())?;
                            if uploads.is_empty() {
                                return Ok(());
                            }
                            api.upload_photos(id, &uploads).await
                        }));
                    }
                },
            }
        }

        div {
            class: "ui-card",
            strong { "PDF" }
            match (pdf_key.as_deref(), pdf_url) {
                (Some(key), Some(url)) => rsx! { a { href: "{url}", target: "_blank", "{key}" } },
                (Some(key), None) => rsx! { p { class: "ui-muted", "{key}" } },
                (None, _) => rsx! { p { class: "ui-muted", "No PDF attached." } },
            }
            if let Some(key) = pdf_key.clone() {
                PdfPreview { key: "{key}", id, pdf_key: key.clone() }
            }
            label { class: "ui-muted", if pdf_key.is_some() { "Replace PDF" } else { "Attach PDF" } }
            input {
                r#type: "file",
                accept: "application/pdf",
                disabled: busy(),
                onchange: {
                    let api = api.clone();
                    move |event: FormEvent| {
                        let api = api.clone();
                        run.call(Box::pin(async move {
                            let Some(picked) = picked_files(event).await.into_iter().next() else {
                                return Ok(());
                            };
                            let upload = pdf_upload(picked, unix_timestamp_millis())?;
                            api.replace_pdf(id, &upload).await
                        }));
                    }
                },
            }
        }

        div {
            class: "ui-card",
            strong { "Notes ({notes.len()})" }
            UiTextarea {
                rows: "3",
                placeholder: "Add a note...",
                value: "{note_text}",
                oninput: move |event: FormEvent| note_text.set(event.value()),
            }
            UiButton {
                variant: ButtonVariant::Primary,
                disabled: busy() || note_text.read().trim().is_empty(),
                onclick: {
                    let api = api.clone();
                    move |_| {
                        let api = api.clone();
                        let text = note_text();
                        spawn(async move {
                            busy.set(true);
                            match api.add_note(id, &text).await {
                                Ok(updated) => {
                                    note_text.set(String::new());
                                    if let Some(loaded) = order.write().as_mut() {
                                        loaded.notes = updated;
                                    }
                                }
                                Err(failure) => error.set(report_error(&failure, &api, navigator)),
                            }
                            busy.set(false);
                        });
                    }
                },
                "Add Note"
            }
            for (index, note) in notes.into_iter().enumerate() {
                div {
                    key: "{index}",
                    style: "border-top: 1px solid #f3f4f6; padding-top: 6px;",
                    p { class: "ui-muted", "{note.header()}" }
                    p { style: "margin: 0; white-space: pre-wrap;", "{note.text}" }
                }
            }
        }
    }
}

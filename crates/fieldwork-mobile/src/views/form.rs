use dioxus::prelude::*;
use fieldwork_core::files::UploadFile;
use fieldwork_core::forms::{FormSubmission, WorkOrderForm};
use fieldwork_core::util::unix_timestamp_millis;
use fieldwork_core::{WorkOrderId, WorkOrderStatus};

use crate::app::{report_error, use_api, use_navigator};
use crate::attachments::{pdf_upload, photo_uploads};
use crate::navigation::Screen;
use crate::ui::{ButtonVariant, ErrorBanner, StatusSelect, UiButton, UiInput, UiTextarea};
use crate::views::picked_files;

#[derive(Clone, Copy, PartialEq, Eq)]
enum FormMode {
    Create,
    Edit(WorkOrderId),
}

#[component]
pub fn AddWorkOrderView() -> Element {
    let api = use_api();
    let session = api.current_session().ok().flatten();
    let allowed = api
        .config()
        .may_create_work_orders(session.as_ref().and_then(|session| session.username.as_deref()));

    if !allowed {
        return rsx! {
            ErrorBanner { message: Some("You are not allowed to create work orders.".to_string()) }
        };
    }
    rsx! {
        WorkOrderFormView { mode: FormMode::Create, initial: WorkOrderForm::for_create() }
    }
}

#[component]
pub fn EditWorkOrderView(id: WorkOrderId) -> Element {
    let api = use_api();
    let navigator = use_navigator();
    let mut initial = use_signal(|| None::<WorkOrderForm>);
    let mut error = use_signal(|| None::<String>);

    use_future(move || {
        let api = api.clone();
        async move {
            match api.get_work_order(id).await {
                Ok(order) => initial.set(Some(WorkOrderForm::from_work_order(&order))),
                Err(failure) => error.set(report_error(&failure, &api, navigator)),
            }
        }
    });

    match initial() {
        Some(form) => rsx! { WorkOrderFormView { mode: FormMode::Edit(id), initial: form } },
        None => rsx! {
            ErrorBanner { message: error() }
            if error().is_none() {
                p { class: "ui-muted", "Loading..." }
            }
        },
    }
}

#[component]
fn TextField(
    label: &'static str,
    value: String,
    #[props(default)] multiline: bool,
    oninput: EventHandler<String>,
) -> Element {
    rsx! {
        label { class: "ui-muted", "{label}" }
        if multiline {
            UiTextarea {
                rows: "4",
                value: "{value}",
                oninput: move |event: FormEvent| oninput.call(event.value()),
            }
        } else {
            UiInput {
                value: "{value}",
                oninput: move |event: FormEvent| oninput.call(event.value()),
            }
        }
    }
}

#[component]
fn WorkOrderFormView(mode: FormMode, initial: WorkOrderForm) -> Element {
    let api = use_api();
    let mut navigator = use_navigator();
    let mut form = use_signal(|| initial);
    let mut photos = use_signal(Vec::<UploadFile>::new);
    let mut pdf = use_signal(|| None::<UploadFile>);
    let mut error = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);

    let on_submit = move |_| {
        let api = api.clone();
        let mut files = photos();
        files.extend(pdf());
        // Validation runs before any request is sent.
        let submission = match FormSubmission::new(form(), files) {
            Ok(submission) => submission,
            Err(failure) => {
                error.set(Some(failure.user_message()));
                return;
            }
        };
        spawn(async move {
            busy.set(true);
            error.set(None);
            let result = match mode {
                FormMode::Create => api.create_work_order(&submission).await,
                FormMode::Edit(id) => api.edit_work_order(id, &submission).await,
            };
            busy.set(false);
            match result {
                Ok(()) => navigator.write().replace(match mode {
                    FormMode::Create => Screen::WorkOrders,
                    FormMode::Edit(id) => Screen::ViewWorkOrder(id),
                }),
                Err(failure) => error.set(report_error(&failure, &api, navigator)),
            }
        });
    };

    let current = form();
    let photo_count = photos.read().len();
    let pdf_name = pdf.read().as_ref().map(|file| file.file_name.clone());
    let submit_label = match (mode, busy()) {
        (_, true) => "Saving...",
        (FormMode::Create, false) => "Create Work Order",
        (FormMode::Edit(_), false) => "Save Changes",
    };

    rsx! {
        ErrorBanner { message: error() }
        div {
            class: "ui-card",
            TextField {
                label: "PO Number",
                value: current.po_number.clone(),
                oninput: move |value| form.write().po_number = value,
            }
            TextField {
                label: "Customer *",
                value: current.customer.clone(),
                oninput: move |value| form.write().customer = value,
            }
            TextField {
                label: "Site Location",
                value: current.site_location.clone(),
                oninput: move |value| form.write().site_location = value,
            }
            TextField {
                label: "Billing Address *",
                value: current.billing_address.clone(),
                oninput: move |value| form.write().billing_address = value,
            }
            TextField {
                label: "Problem Description *",
                value: current.problem_description.clone(),
                multiline: true,
                oninput: move |value| form.write().problem_description = value,
            }
            label { class: "ui-muted", "Status" }
            StatusSelect {
                value: current.status.clone(),
                onchange: move |status: WorkOrderStatus| form.write().status = status,
            }
        }
        div {
            class: "ui-card",
            label { class: "ui-muted", "Photos ({photo_count} selected)" }
            input {
                r#type: "file",
                accept: "image/*",
                multiple: true,
                onchange: move |event: FormEvent| {
                    spawn(async move {
                        match photo_uploads(picked_files(event).await, unix_timestamp_millis()) {
                            Ok(uploads) => photos.write().extend(uploads),
                            Err(failure) => error.set(Some(failure.user_message())),
                        }
                    });
                },
            }
            label { class: "ui-muted", "PDF" }
            if let Some(name) = pdf_name {
                p { class: "ui-muted", "{name}" }
            }
            input {
                r#type: "file",
                accept: "application/pdf",
                onchange: move |event: FormEvent| {
                    spawn(async move {
                        let Some(picked) = picked_files(event).await.into_iter().next() else {
                            return;
                        };
                        match pdf_upload(picked, unix_timestamp_millis()) {
                            Ok(upload) => pdf.set(Some(upload)),
                            Err(failure) => error.set(Some(failure.user_message())),
                        }
                    });
                },
            }
        }
        UiButton {
            variant: ButtonVariant::Primary,
            block: true,
            disabled: busy(),
            onclick: on_submit,
            "{submit_label}"
        }
    }
}

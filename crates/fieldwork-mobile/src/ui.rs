//! Shared mobile UI primitives.

use dioxus::prelude::*;
use fieldwork_core::WorkOrderStatus;

pub const MOBILE_UI_STYLES: &str = r"
body {
    margin: 0;
    font-family: system-ui, -apple-system, sans-serif;
    background: #f3f4f6;
    color: #111827;
}

.ui-header {
    position: sticky;
    top: 0;
    z-index: 10;
    display: flex;
    gap: 6px;
    padding: 10px 12px;
    background: #1f2937;
    overflow-x: auto;
}

.ui-header button {
    background: transparent;
    color: #e5e7eb;
    border: 0;
    font-size: 13px;
    font-weight: 600;
    padding: 6px 8px;
    white-space: nowrap;
}

.ui-header button[data-active='true'] {
    color: #ffffff;
    border-bottom: 2px solid #60a5fa;
}

.ui-screen {
    padding: 12px 16px 32px 16px;
    display: flex;
    flex-direction: column;
    gap: 12px;
}

.ui-card {
    background: #ffffff;
    border: 1px solid #e5e7eb;
    border-radius: 12px;
    padding: 12px;
    display: flex;
    flex-direction: column;
    gap: 6px;
}

.ui-muted {
    margin: 0;
    font-size: 12px;
    color: #6b7280;
}

.ui-button {
    border-radius: 10px;
    padding: 10px 12px;
    font-size: 13px;
    font-weight: 600;
    border: 1px solid transparent;
}

.ui-button:disabled {
    opacity: 0.55;
}

.ui-button--block {
    width: 100%;
}

.ui-button--primary {
    background: #2563eb;
    color: #ffffff;
    border-color: #2563eb;
}

.ui-button--outline {
    background: #ffffff;
    color: #374151;
    border-color: #d1d5db;
}

.ui-button--danger {
    background: #dc2626;
    color: #ffffff;
    border-color: #dc2626;
}

.ui-input,
.ui-textarea,
.ui-select {
    width: 100%;
    box-sizing: border-box;
    border: 1px solid #d1d5db;
    border-radius: 10px;
    padding: 10px 12px;
    font-size: 13px;
    background: #ffffff;
    color: #111827;
}

.ui-textarea {
    resize: none;
}

.ui-badge {
    align-self: flex-start;
    border-radius: 999px;
    padding: 2px 8px;
    font-size: 11px;
    font-weight: 700;
}

.ui-error {
    border: 1px solid #fecaca;
    background: #fef2f2;
    color: #991b1b;
    border-radius: 10px;
    padding: 10px 12px;
    font-size: 13px;
}
";

#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonVariant {
    #[default]
    Primary,
    Outline,
    Danger,
}

impl ButtonVariant {
    const fn class(self) -> &'static str {
        match self {
            Self::Primary => "ui-button--primary",
            Self::Outline => "ui-button--outline",
            Self::Danger => "ui-button--danger",
        }
    }
}

#[component]
pub fn UiButton(
    #[props(default)] variant: ButtonVariant,
    #[props(default)] block: bool,
    #[props(default)] disabled: bool,
    onclick: Option<EventHandler<MouseEvent>>,
    #[props(extends = GlobalAttributes)]
    #[props(extends = button)]
    attributes: Vec<Attribute>,
    children: Element,
) -> Element {
    let mut class_name = format!("ui-button {}", variant.class());
    if block {
        class_name.push_str(" ui-button--block");
    }

    rsx! {
        button {
            class: "{class_name}",
            r#type: "button",
            disabled,
            onclick: move |event| {
                if let Some(handler) = &onclick {
                    handler.call(event);
                }
            },
            ..attributes,
            {children}
        }
    }
}

#[component]
pub fn UiInput(
    oninput: Option<EventHandler<FormEvent>>,
    #[props(extends = GlobalAttributes)]
    #[props(extends = input)]
    attributes: Vec<Attribute>,
) -> Element {
    rsx! {
        input {
            class: "ui-input",
            oninput: move |event| _ = oninput.map(|handler| handler(event)),
            ..attributes,
        }
    }
}

#[component]
pub fn UiTextarea(
    oninput: Option<EventHandler<FormEvent>>,
    #[props(extends = GlobalAttributes)]
    #[props(extends = textarea)]
    attributes: Vec<Attribute>,
) -> Element {
    rsx! {
        textarea {
            class: "ui-textarea",
            oninput: move |event| _ = oninput.map(|handler| handler(event)),
            ..attributes,
        }
    }
}

/// Status picker over [`WorkOrderStatus::PICKER`]. A current value outside
/// the picker list is kept as an extra first option.
#[component]
pub fn StatusSelect(
    value: WorkOrderStatus,
    #[props(default)] disabled: bool,
    onchange: EventHandler<WorkOrderStatus>,
) -> Element {
    let mut options: Vec<WorkOrderStatus> = WorkOrderStatus::PICKER.to_vec();
    if !options.contains(&value) {
        options.insert(0, value.clone());
    }
    let selected = value.label().to_string();

    rsx! {
        select {
            class: "ui-select",
            disabled,
            value: "{selected}",
            onchange: move |event: FormEvent| {
                onchange.call(WorkOrderStatus::from(event.value()));
            },
            for option in options {
                option {
                    key: "{option}",
                    value: "{option}",
                    selected: option.label() == selected,
                    "{option}"
                }
            }
        }
    }
}

const fn badge_colors(status: &WorkOrderStatus) -> (&'static str, &'static str) {
    match status {
        WorkOrderStatus::NeedsToBeScheduled => ("#fef3c7", "#92400e"),
        WorkOrderStatus::Scheduled => ("#dbeafe", "#1e40af"),
        WorkOrderStatus::WaitingForApproval => ("#ede9fe", "#5b21b6"),
        WorkOrderStatus::WaitingOnParts | WorkOrderStatus::PartsIn => ("#ffedd5", "#9a3412"),
        WorkOrderStatus::Completed => ("#dcfce7", "#166534"),
        WorkOrderStatus::Other(_) => ("#f3f4f6", "#374151"),
    }
}

#[component]
pub fn StatusBadge(status: WorkOrderStatus) -> Element {
    let (background, color) = badge_colors(&status);
    rsx! {
        span {
            class: "ui-badge",
            style: "background: {background}; color: {color};",
            "{status}"
        }
    }
}

#[component]
pub fn ErrorBanner(message: Option<String>) -> Element {
    rsx! {
        if let Some(message) = message {
            div { class: "ui-error", role: "alert", "{message}" }
        }
    }
}

use chrono::Local;
use dioxus::prelude::*;
use fieldwork_core::filters::{apply_status_change, filter_work_orders, StatusFilter};
use fieldwork_core::{WorkOrder, WorkOrderStatus};

use crate::app::{report_error, use_api, use_navigator, use_work_orders};
use crate::navigation::Screen;
use crate::ui::{ErrorBanner, StatusBadge, StatusSelect};

/// Tappable summary card for one order.
#[component]
pub fn WorkOrderRow(order: WorkOrder, children: Element) -> Element {
    let mut navigator = use_navigator();
    let id = order.id;
    let scheduled = order.scheduled_label_in(&Local);

    rsx! {
        div {
            class: "ui-card",
            div {
                onclick: move |_| navigator.write().push(Screen::ViewWorkOrder(id)),
                p { style: "margin: 0; font-weight: 700;", "#{order.id}  {order.customer}" }
                p { class: "ui-muted", "PO {order.display_po()}  ·  {scheduled}" }
                p { class: "ui-muted", "{order.site_location}" }
                StatusBadge { status: order.status.clone() }
            }
            {children}
        }
    }
}

#[component]
pub fn WorkOrderListView() -> Element {
    let api = use_api();
    let navigator = use_navigator();
    let state = use_work_orders();
    let mut orders = state.orders;
    let mut filter = use_signal(StatusFilter::default);
    let mut status_error = use_signal(|| None::<String>);

    let today = Local::now().date_naive();
    let visible = filter_work_orders(&orders.read(), &filter.read(), today, &Local);
    let selected_label = filter.read().label().to_string();

    // Optimistic: the list changes first and rolls back if the server refuses.
    let on_status_change = use_callback(move |(order, status): (WorkOrder, WorkOrderStatus)| {
        let api = api.clone();
        let Some(previous) = apply_status_change(&mut orders.write(), order.id, status.clone())
        else {
            return;
        };
        status_error.set(None);
        spawn(async move {
            if let Err(error) = api.update_status(order.id, &status).await {
                orders.set(previous);
                status_error.set(report_error(&error, &api, navigator));
            }
        });
    });

    rsx! {
        select {
            class: "ui-select",
            value: "{selected_label}",
            onchange: move |event: FormEvent| {
                if let Ok(parsed) = event.value().parse::<StatusFilter>() {
                    filter.set(parsed);
                }
            },
            for option in StatusFilter::options() {
                option {
                    key: "{option}",
                    value: "{option}",
                    selected: option.label() == selected_label,
                    "{option}"
                }
            }
        }
        ErrorBanner { message: (state.error)().or_else(|| status_error()) }
        if (state.loading)() {
            p { class: "ui-muted", "Loading..." }
        } else if visible.is_empty() {
            p { class: "ui-muted", "No work orders match this filter." }
        }
        for order in visible {
            WorkOrderRow {
                key: "{order.id}",
                order: order.clone(),
                StatusSelect {
                    value: order.status.clone(),
                    onchange: {
                        let order = order.clone();
                        move |status: WorkOrderStatus| on_status_change.call((order.clone(), status))
                    },
                }
            }
        }
    }
}

use chrono::Local;
use dioxus::prelude::*;
use fieldwork_core::filters::{agenda_for_day, upcoming_after};

use crate::app::{use_api, use_navigator, use_work_orders};
use crate::navigation::Screen;
use crate::ui::{ButtonVariant, ErrorBanner, UiButton};
use crate::views::WorkOrderRow;

#[component]
pub fn HomeView() -> Element {
    let api = use_api();
    let mut navigator = use_navigator();
    let state = use_work_orders();

    let session = api.current_session().ok().flatten();
    let welcome = session
        .as_ref()
        .map_or("Welcome", |session| session.display_name())
        .to_string();
    let may_create = api
        .config()
        .may_create_work_orders(session.as_ref().and_then(|session| session.username.as_deref()));

    let today = Local::now().date_naive();
    let orders = state.orders.read();
    let agenda = agenda_for_day(&orders, today, &Local);
    let upcoming = upcoming_after(&orders, today, &Local);

    rsx! {
        p { style: "margin: 0; font-size: 16px; font-weight: 600;", "Welcome, {welcome}" }
        ErrorBanner { message: (state.error)() }
        if may_create {
            UiButton {
                variant: ButtonVariant::Primary,
                block: true,
                onclick: move |_| navigator.write().push(Screen::AddWorkOrder),
                "+ Add Work Order"
            }
        }
        h3 { style: "margin: 8px 0 0 0;", "Agenda for Today" }
        if (state.loading)() {
            p { class: "ui-muted", "Loading..." }
        } else if agenda.is_empty() {
            p { class: "ui-muted", "Nothing scheduled today." }
        }
        for order in agenda {
            WorkOrderRow { key: "today-{order.id}", order: order.clone() }
        }
        h3 { style: "margin: 8px 0 0 0;", "Upcoming" }
        if !(state.loading)() && upcoming.is_empty() {
            p { class: "ui-muted", "No upcoming work orders." }
        }
        for order in upcoming {
            WorkOrderRow { key: "upcoming-{order.id}", order: order.clone() }
        }
    }
}

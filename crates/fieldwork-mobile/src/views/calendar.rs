use chrono::{Datelike, Local, Months, NaiveDate};
use dioxus::prelude::*;
use fieldwork_core::calendar::{month_grid, orders_on_day, CalendarMarks};

use crate::app::use_work_orders;
use crate::ui::{ButtonVariant, ErrorBanner, UiButton};
use crate::views::WorkOrderRow;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

fn first_of_month(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

#[component]
pub fn CalendarView() -> Element {
    let state = use_work_orders();
    let mut selected = use_signal(|| Local::now().date_naive());
    let mut month = use_signal(|| first_of_month(Local::now().date_naive()));

    let orders = state.orders.read();
    let marks = CalendarMarks::build(&orders, selected(), &Local);
    let day_orders = orders_on_day(&orders, selected(), &Local);
    let shown = month();
    let heading = shown.format("%B %Y").to_string();
    let weeks = month_grid(shown.year(), shown.month());
    let selected_label = selected().format("%A, %B %-d").to_string();

    rsx! {
        ErrorBanner { message: (state.error)() }
        div {
            class: "ui-card",
            div {
                style: "display: flex; align-items: center; justify-content: space-between;",
                UiButton {
                    variant: ButtonVariant::Outline,
                    onclick: move |_| {
                        if let Some(previous) = month().checked_sub_months(Months::new(1)) {
                            month.set(previous);
                        }
                    },
                    "‹"
                }
                strong { "{heading}" }
                UiButton {
                    variant: ButtonVariant::Outline,
                    onclick: move |_| {
                        if let Some(next) = month().checked_add_months(Months::new(1)) {
                            month.set(next);
                        }
                    },
                    "›"
                }
            }
            div {
                style: "display: grid; grid-template-columns: repeat(7, 1fr); gap: 2px; text-align: center;",
                for name in WEEKDAYS {
                    span { key: "{name}", class: "ui-muted", "{name}" }
                }
                for (week_index, week) in weeks.into_iter().enumerate() {
                    for (day_index, cell) in week.into_iter().enumerate() {
                        match cell {
                            Some(day) => {
                                let mark = marks.get(day);
                                let background = if mark.selected { "#2563eb" } else { "transparent" };
                                let color = if mark.selected { "#ffffff" } else { "#111827" };
                                let dots = "•".repeat(usize::from(mark.dots));
                                rsx! {
                                    button {
                                        key: "{day}",
                                        style: "border: 0; border-radius: 8px; padding: 6px 0; background: {background}; color: {color};",
                                        onclick: move |_| selected.set(day),
                                        div { "{day.day()}" }
                                        div { style: "font-size: 10px; min-height: 12px; color: #ef4444;", "{dots}" }
                                    }
                                }
                            }
                            None => rsx! { span { key: "blank-{week_index}-{day_index}" } },
                        }
                    }
                }
            }
        }
        h3 { style: "margin: 8px 0 0 0;", "{selected_label}" }
        if (state.loading)() {
            p { class: "ui-muted", "Loading..." }
        } else if day_orders.is_empty() {
            p { class: "ui-muted", "No work orders scheduled." }
        }
        for order in day_orders {
            WorkOrderRow { key: "{order.id}", order: order.clone() }
        }
    }
}

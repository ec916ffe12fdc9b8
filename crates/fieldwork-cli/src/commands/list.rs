use chrono::Local;
use fieldwork_core::filters::{agenda_for_day, filter_work_orders, upcoming_after, StatusFilter};
use serde::Serialize;

use crate::commands::common::{
    format_work_order_lines, print_json, today, work_order_to_list_item, Context, GlobalArgs,
    WorkOrderListItem,
};
use crate::error::CliError;

pub fn parse_status_filter(raw: &str) -> Result<StatusFilter, CliError> {
    raw.parse::<StatusFilter>().map_err(|_| {
        let options = StatusFilter::options()
            .iter()
            .map(|option| option.label().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        CliError::InvalidArgument(format!(
            "Unknown filter '{}'. Expected one of: {options}",
            raw.trim()
        ))
    })
}

pub async fn run_list(status: &str, as_json: bool, global: GlobalArgs<'_>) -> Result<(), CliError> {
    let filter = parse_status_filter(status)?;
    let (context, _) = Context::signed_in(global)?;
    let orders = context.api.list_work_orders().await?;
    let visible = filter_work_orders(&orders, &filter, today(), &Local);

    if as_json {
        let items = visible
            .iter()
            .map(work_order_to_list_item)
            .collect::<Vec<WorkOrderListItem>>();
        return print_json(&items);
    }

    if visible.is_empty() {
        println!("No work orders ({filter}).");
    }
    for line in format_work_order_lines(&visible) {
        println!("{line}");
    }
    Ok(())
}

#[derive(Debug, Serialize)]
struct DashboardOutput {
    today: Vec<WorkOrderListItem>,
    upcoming: Vec<WorkOrderListItem>,
}

pub async fn run_dashboard(as_json: bool, global: GlobalArgs<'_>) -> Result<(), CliError> {
    let (context, session) = Context::signed_in(global)?;
    let orders = context.api.list_work_orders().await?;
    let day = today();
    let agenda = agenda_for_day(&orders, day, &Local);
    let upcoming = upcoming_after(&orders, day, &Local);

    if as_json {
        return print_json(&DashboardOutput {
            today: agenda.iter().map(work_order_to_list_item).collect(),
            upcoming: upcoming.iter().map(work_order_to_list_item).collect(),
        });
    }

    println!("Welcome, {}", session.display_name());
    println!();
    println!("Agenda for Today ({day})");
    if agenda.is_empty() {
        println!("  Nothing scheduled today.");
    }
    for line in format_work_order_lines(&agenda) {
        println!("  {line}");
    }
    println!();
    println!("Upcoming");
    if upcoming.is_empty() {
        println!("  No upcoming work orders.");
    }
    for line in format_work_order_lines(&upcoming) {
        println!("  {line}");
    }
    Ok(())
}

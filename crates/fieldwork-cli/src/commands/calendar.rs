use chrono::{Datelike, Local, NaiveDate};
use fieldwork_core::calendar::{month_grid, orders_on_day, CalendarMarks, DayMark};
use fieldwork_core::WorkOrder;

use crate::commands::common::{format_work_order_lines, parse_day, today, Context, GlobalArgs};
use crate::error::CliError;

pub fn parse_month(raw: &str) -> Result<(i32, u32), CliError> {
    let invalid = || CliError::InvalidArgument(format!("Expected a month as YYYY-MM, got '{raw}'"));
    let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let year = year.parse::<i32>().map_err(|_| invalid())?;
    let month = month.parse::<u32>().map_err(|_| invalid())?;
    if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
        return Err(invalid());
    }
    Ok((year, month))
}

/// One cell: day number plus `*` per order (at most three), brackets on the
/// selected day.
fn render_cell(day: NaiveDate, mark: DayMark) -> String {
    let dots = "*".repeat(usize::from(mark.dots));
    let label = format!("{:>2}{dots:<3}", day.day());
    if mark.selected {
        format!("[{label}]")
    } else {
        format!(" {label} ")
    }
}

pub fn render_month(year: i32, month: u32, marks: &CalendarMarks) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) {
        lines.push(first.format("%B %Y").to_string());
    }
    lines.push(
        ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]
            .iter()
            .map(|name| format!(" {name:<5} "))
            .collect::<String>(),
    );
    for week in month_grid(year, month) {
        let line = week
            .iter()
            .map(|cell| {
                cell.map_or_else(|| " ".repeat(7), |day| render_cell(day, marks.get(day)))
            })
            .collect::<String>();
        lines.push(line.trim_end().to_string());
    }
    lines
}

pub fn render_calendar(
    orders: &[WorkOrder],
    selected: NaiveDate,
    month: Option<(i32, u32)>,
) -> Vec<String> {
    let (year, month) = month.unwrap_or((selected.year(), selected.month()));
    let marks = CalendarMarks::build(orders, selected, &Local);
    let mut lines = render_month(year, month, &marks);

    lines.push(String::new());
    lines.push(format!("Work orders on {selected}"));
    let day_orders = orders_on_day(orders, selected, &Local);
    if day_orders.is_empty() {
        lines.push("  None scheduled.".to_string());
    }
    lines.extend(
        format_work_order_lines(&day_orders)
            .into_iter()
            .map(|line| format!("  {line}")),
    );
    lines
}

pub async fn run_calendar(
    month: Option<&str>,
    day: Option<&str>,
    global: GlobalArgs<'_>,
) -> Result<(), CliError> {
    let selected = day.map(parse_day).transpose()?.unwrap_or_else(today);
    let month = month.map(parse_month).transpose()?;
    let (context, _) = Context::signed_in(global)?;
    let orders = context.api.list_work_orders().await?;

    for line in render_calendar(&orders, selected, month) {
        println!("{line}");
    }
    Ok(())
}

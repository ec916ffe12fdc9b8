use chrono::Local;
use fieldwork_core::{WorkOrder, WorkOrderStatus};
use serde_json::json;

use crate::commands::common::{parse_work_order_id, print_json, Context, GlobalArgs};
use crate::error::CliError;

pub fn render_work_order(order: &WorkOrder, file_url: impl Fn(&str) -> Option<String>) -> Vec<String> {
    let mut lines = vec![
        format!("Work Order #{}", order.id),
        format!("PO Number:    {}", order.display_po()),
        format!("Customer:     {}", order.customer),
        format!("Site:         {}", order.site_location),
        format!("Billing:      {}", order.billing_address),
        format!("Status:       {}", order.status),
        format!("Scheduled:    {}", order.scheduled_label_in(&Local)),
    ];
    if let Some(maps) = order.maps_url() {
        lines.push(format!("Map:          {maps}"));
    }
    lines.push(String::new());
    lines.push("Problem".to_string());
    lines.push(format!("  {}", order.problem_description));

    let photos = order.photo_keys();
    lines.push(String::new());
    lines.push(format!("Photos ({})", photos.len()));
    for key in &photos {
        let url = file_url(key).unwrap_or_else(|| key.clone());
        lines.push(format!("  {key}  {url}"));
    }

    lines.push(String::new());
    match order.pdf_key() {
        Some(key) => {
            let url = file_url(key).unwrap_or_else(|| key.to_string());
            lines.push(format!("PDF: {key}  {url}"));
        }
        None => lines.push("PDF: none".to_string()),
    }

    let notes = order.notes_newest_first();
    lines.push(String::new());
    lines.push(format!("Notes ({})", notes.len()));
    for note in &notes {
        let header = note.header();
        if !header.is_empty() {
            lines.push(format!("  {header}"));
        }
        lines.push(format!("    {}", note.text));
    }
    lines
}

pub async fn run_show(id: &str, as_json: bool, global: GlobalArgs<'_>) -> Result<(), CliError> {
    let id = parse_work_order_id(id)?;
    let (context, _) = Context::signed_in(global)?;
    let order = context.api.get_work_order(id).await?;

    if as_json {
        let photo_urls = order
            .photo_keys()
            .iter()
            .filter_map(|key| context.api.file_url(key))
            .collect::<Vec<_>>();
        return print_json(&json!({
            "workOrder": order,
            "photoUrls": photo_urls,
            "pdfUrl": order.pdf_key().and_then(|key| context.api.file_url(key)),
            "notes": order.notes_newest_first(),
        }));
    }

    for line in render_work_order(&order, |key| context.api.file_url(key)) {
        println!("{line}");
    }
    Ok(())
}

pub async fn run_status(id: &str, status: &str, global: GlobalArgs<'_>) -> Result<(), CliError> {
    let id = parse_work_order_id(id)?;
    let status = status
        .parse::<WorkOrderStatus>()
        .map_err(CliError::InvalidArgument)?;
    let (context, _) = Context::signed_in(global)?;
    context.api.update_status(id, &status).await?;
    println!("Work order #{id} is now {status}");
    Ok(())
}

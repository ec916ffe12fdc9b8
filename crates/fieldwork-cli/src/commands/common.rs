use std::path::Path;

use chrono::{Local, NaiveDate};
use fieldwork_core::files::{guess_mime, prepare_photo_for_upload, UploadField, UploadFile};
use fieldwork_core::util::compact_text;
use fieldwork_core::{Session, SessionPersistence, WorkOrder, WorkOrderApi, WorkOrderId};
use serde::Serialize;

use crate::auth::ProfileSessionStore;
use crate::config_profiles::CliProfilesConfig;
use crate::error::CliError;

/// Global options every command shares.
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalArgs<'a> {
    pub profile: Option<&'a str>,
    pub api_url: Option<&'a str>,
}

/// API client bound to the resolved profile's session.
pub struct Context {
    pub profile_name: String,
    pub api: WorkOrderApi<ProfileSessionStore>,
}

impl Context {
    pub fn open(global: GlobalArgs<'_>) -> Result<Self, CliError> {
        let config = CliProfilesConfig::load()?;
        let profile_name = config.resolve_profile_name(global.profile);
        let profile = config.profile(&profile_name).cloned().unwrap_or_default();
        let client_config = profile.client_config(global.api_url.map(str::to_string))?;
        tracing::debug!(
            "Using profile '{}' against {}",
            profile_name,
            client_config.api_base_url
        );

        let api = WorkOrderApi::new(client_config, ProfileSessionStore::new(&profile_name))?;
        Ok(Self { profile_name, api })
    }

    /// Like [`Context::open`] but fails early when no session is stored.
    pub fn signed_in(global: GlobalArgs<'_>) -> Result<(Self, Session), CliError> {
        let context = Self::open(global)?;
        let session = context
            .api
            .store()
            .load_session()?
            .ok_or(CliError::NotSignedIn)?;
        Ok((context, session))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderListItem {
    pub id: i64,
    pub po_number: String,
    pub customer: String,
    pub site_location: String,
    pub status: String,
    pub scheduled: Option<String>,
}

pub fn parse_work_order_id(raw: &str) -> Result<WorkOrderId, CliError> {
    raw.parse()
        .map_err(|_| CliError::InvalidWorkOrderId(raw.trim().to_string()))
}

pub fn parse_day(raw: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| CliError::InvalidArgument(format!("Expected a date as YYYY-MM-DD, got '{raw}'")))
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn format_work_order_lines(orders: &[WorkOrder]) -> Vec<String> {
    orders
        .iter()
        .map(|order| {
            let customer = truncate(&order.customer, 28);
            let status = order.status.label();
            format!(
                "#{:<6} {:<12} {customer:<28}  {status:<22}  {}",
                order.id,
                truncate(order.display_po(), 12),
                order.scheduled_label_in(&Local)
            )
        })
        .collect()
}

pub fn work_order_to_list_item(order: &WorkOrder) -> WorkOrderListItem {
    WorkOrderListItem {
        id: order.id.value(),
        po_number: order.po_number.clone(),
        customer: order.customer.clone(),
        site_location: order.site_location.clone(),
        status: order.status.label().to_string(),
        scheduled: order
            .scheduled_date
            .map(|at| at.with_timezone(&Local).to_rfc3339()),
    }
}

pub fn truncate(value: &str, max_chars: usize) -> String {
    let collapsed = compact_text(value);
    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn file_name_of(path: &Path) -> Result<String, CliError> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| CliError::InvalidArgument(format!("{} is not a file", path.display())))
}

/// Reads a photo and downscales it for upload.
pub fn read_photo(path: &Path, upload_name: &str) -> Result<UploadFile, CliError> {
    let original = std::fs::read(path)?;
    let processed = prepare_photo_for_upload(original);
    let mime = if image_is_jpeg(&processed) {
        "image/jpeg".to_string()
    } else {
        guess_mime(&file_name_of(path)?)
    };
    let name = if mime == "image/jpeg" {
        upload_name.to_string()
    } else {
        file_name_of(path)?
    };
    Ok(UploadFile::new(UploadField::Photo, name, mime, processed)?)
}

pub fn read_pdf(path: &Path) -> Result<UploadFile, CliError> {
    let bytes = std::fs::read(path)?;
    Ok(UploadFile::pdf(file_name_of(path)?, bytes)?)
}

fn image_is_jpeg(bytes: &[u8]) -> bool {
    bytes.starts_with(&[0xFF, 0xD8, 0xFF])
}

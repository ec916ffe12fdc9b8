//! Error body decoding for collaborator responses.

use reqwest::StatusCode;
use serde::Deserialize;

use crate::util::compact_text;

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
    message: Option<String>,
    msg: Option<String>,
}

/// The server-provided message in a JSON error body, if any.
pub fn server_message(body: &str) -> Option<String> {
    let payload = serde_json::from_str::<ErrorResponse>(body).ok()?;
    payload
        .error
        .or(payload.message)
        .or(payload.msg)
        .map(|message| message.trim().to_string())
        .filter(|message| !message.is_empty())
}

/// Human-readable message for a non-success response.
pub fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Some(message) = server_message(body) {
        return message;
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() || trimmed.starts_with('<') {
        format!("HTTP {}", status.as_u16())
    } else {
        format!("{} ({})", trimmed, status.as_u16())
    }
}

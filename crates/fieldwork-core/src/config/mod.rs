//! Client configuration shared by the CLI and mobile shells.
//!
//! The collaborator API base URL is the only required value. It defaults to
//! the production endpoint and can be overridden with `FIELDWORK_API_BASE_URL`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

/// Production collaborator endpoint (plain HTTP until a certificate is added).
pub const DEFAULT_API_BASE_URL: &str = "http://fcgg.us-east-2.elasticbeanstalk.com";
pub const ENV_API_BASE_URL: &str = "FIELDWORK_API_BASE_URL";
pub const ENV_ALLOWED_CREATORS: &str = "FIELDWORK_ALLOWED_CREATORS";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Runtime settings for [`crate::api::WorkOrderApi`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Advisory list of usernames allowed to create work orders from the
    /// client. Empty means no client-side gate; the server decides.
    #[serde(default)]
    pub allowed_creators: Vec<String>,
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            allowed_creators: Vec::new(),
        }
    }
}

impl ClientConfig {
    /// Builds a config for an explicit base URL.
    pub fn new(api_base_url: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            api_base_url: normalize_api_base_url(api_base_url.as_ref())?,
            ..Self::default()
        })
    }

    /// Reads overrides from the process environment.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        if let Some(url) = normalize_text_option(std::env::var(ENV_API_BASE_URL).ok()) {
            config.api_base_url = normalize_api_base_url(&url)?;
        }
        if let Some(raw) = normalize_text_option(std::env::var(ENV_ALLOWED_CREATORS).ok()) {
            config.allowed_creators = parse_creator_list(&raw);
        }
        Ok(config)
    }

    /// Applies an optional base URL override on top of this config.
    pub fn with_base_url_override(mut self, url: Option<String>) -> Result<Self> {
        if let Some(url) = normalize_text_option(url) {
            self.api_base_url = normalize_api_base_url(&url)?;
        }
        Ok(self)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Whether the client-side creator hint lets `username` open the create form.
    ///
    /// This is advisory only; the collaborator enforces the real rule with 403.
    #[must_use]
    pub fn may_create_work_orders(&self, username: Option<&str>) -> bool {
        if self.allowed_creators.is_empty() {
            return true;
        }
        username.is_some_and(|name| {
            self.allowed_creators
                .iter()
                .any(|allowed| allowed.eq_ignore_ascii_case(name.trim()))
        })
    }
}

/// Validates and normalizes an API base URL (scheme required, no trailing slash).
pub fn normalize_api_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(Error::Config("API base URL must not be empty".to_string()));
    }
    if !is_http_url(trimmed) {
        return Err(Error::Config(format!(
            "API base URL must include http:// or https:// (got '{trimmed}')"
        )));
    }
    Ok(trimmed.to_string())
}

fn parse_creator_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_api_base_url_trims_trailing_slash() {
        assert_eq!(
            normalize_api_base_url(" https://api.example.com/ ").unwrap(),
            "https://api.example.com"
        );
    }

    #[test]
    fn normalize_api_base_url_rejects_missing_scheme() {
        assert!(normalize_api_base_url("api.example.com").is_err());
        assert!(normalize_api_base_url("   ").is_err());
    }

    #[test]
    fn default_config_uses_production_endpoint() {
        let config = ClientConfig::default();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.request_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn override_replaces_base_url_only_when_present() {
        let config = ClientConfig::default()
            .with_base_url_override(Some("http://10.0.0.5:5001/".to_string()))
            .unwrap();
        assert_eq!(config.api_base_url, "http://10.0.0.5:5001");

        let unchanged = ClientConfig::default()
            .with_base_url_override(Some("  ".to_string()))
            .unwrap();
        assert_eq!(unchanged.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn creator_hint_is_open_when_unconfigured() {
        let config = ClientConfig::default();
        assert!(config.may_create_work_orders(None));
        assert!(config.may_create_work_orders(Some("anyone")));
    }

    #[test]
    fn creator_hint_matches_configured_names() {
        let config = ClientConfig {
            allowed_creators: parse_creator_list("Jeff, dispatch"),
            ..ClientConfig::default()
        };
        assert!(config.may_create_work_orders(Some("jeff")));
        assert!(config.may_create_work_orders(Some("Dispatch")));
        assert!(!config.may_create_work_orders(Some("tech1")));
        assert!(!config.may_create_work_orders(None));
    }
}

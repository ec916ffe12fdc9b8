//! Runtime configuration handling for mobile.
#![cfg_attr(not(target_os = "android"), allow(dead_code))]

use std::path::{Path, PathBuf};

use fieldwork_core::config::{normalize_api_base_url, ClientConfig};
use fieldwork_core::util::normalize_text_option;
use fieldwork_core::Result;
use serde::{Deserialize, Serialize};

const RUNTIME_CONFIG_FILE: &str = "mobile-config.json";

/// Values baked in by `build.rs` from the build environment.
const BUILD_CONFIG: &str = include_str!(concat!(env!("OUT_DIR"), "/mobile-build-config.json"));

/// Where the effective API base URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    RuntimeSettings,
    BuildDefaults,
    Environment,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MobileRuntimeConfig {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub allowed_creators: Vec<String>,
}

impl MobileRuntimeConfig {
    pub fn from_raw(api_base_url: Option<String>, allowed_creators: &[String]) -> Self {
        Self {
            api_base_url: normalize_text_option(api_base_url),
            allowed_creators: allowed_creators
                .iter()
                .map(|name| name.trim())
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub client: ClientConfig,
    pub source: ConfigSource,
}

pub fn default_runtime_config_path() -> PathBuf {
    crate::paths::fieldwork_data_dir().join(RUNTIME_CONFIG_FILE)
}

pub fn load_runtime_config() -> MobileRuntimeConfig {
    load_runtime_config_from_path(&default_runtime_config_path())
}

pub fn load_runtime_config_from_path(path: &Path) -> MobileRuntimeConfig {
    if !path.exists() {
        return MobileRuntimeConfig::default();
    }

    match std::fs::read_to_string(path) {
        Ok(content) => serde_json::from_str::<MobileRuntimeConfig>(&content).unwrap_or_else(|error| {
            tracing::warn!(
                "Failed to parse mobile runtime config at {}: {}",
                path.display(),
                error
            );
            MobileRuntimeConfig::default()
        }),
        Err(error) => {
            tracing::warn!(
                "Failed to read mobile runtime config at {}: {}",
                path.display(),
                error
            );
            MobileRuntimeConfig::default()
        }
    }
}

pub fn save_runtime_config(config: &MobileRuntimeConfig) -> Result<()> {
    save_runtime_config_to_path(config, &default_runtime_config_path())
}

pub fn save_runtime_config_to_path(config: &MobileRuntimeConfig, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut normalized =
        MobileRuntimeConfig::from_raw(config.api_base_url.clone(), &config.allowed_creators);
    if let Some(url) = normalized.api_base_url.as_deref() {
        normalized.api_base_url = Some(normalize_api_base_url(url)?);
    }
    std::fs::write(path, serde_json::to_string_pretty(&normalized)?)?;
    Ok(())
}

pub fn build_defaults() -> MobileRuntimeConfig {
    parse_build_defaults(BUILD_CONFIG)
}

fn parse_build_defaults(raw: &str) -> MobileRuntimeConfig {
    serde_json::from_str(raw).unwrap_or_else(|error| {
        tracing::warn!("Ignoring unreadable build-time config: {}", error);
        MobileRuntimeConfig::default()
    })
}

/// Runtime settings win over build-time values, which win over the process
/// environment and the built-in default.
pub fn resolve_client_config() -> Result<ResolvedConfig> {
    resolve_from(&load_runtime_config(), &build_defaults())
}

fn resolve_from(
    runtime: &MobileRuntimeConfig,
    build: &MobileRuntimeConfig,
) -> Result<ResolvedConfig> {
    let (mut client, source) = if let Some(url) = runtime.api_base_url.as_deref() {
        (ClientConfig::new(url)?, ConfigSource::RuntimeSettings)
    } else if let Some(url) = build.api_base_url.as_deref() {
        (ClientConfig::new(url)?, ConfigSource::BuildDefaults)
    } else {
        (ClientConfig::from_env()?, ConfigSource::Environment)
    };

    if !runtime.allowed_creators.is_empty() {
        client.allowed_creators.clone_from(&runtime.allowed_creators);
    } else if !build.allowed_creators.is_empty() {
        client.allowed_creators.clone_from(&build.allowed_creators);
    }
    Ok(ResolvedConfig { client, source })
}

//! Session storage in the platform secure store.
//!
//! Android uses the native keystore-backed store; every other target uses the
//! keyring-core mock store so host tests exercise the same code path.
#![cfg_attr(not(target_os = "android"), allow(dead_code))]

use std::sync::{Arc, OnceLock};

use fieldwork_core::{Error, Result, Session, SessionPersistence};
use keyring_core::{CredentialStore, Entry, Error as KeyringError};

const SECRET_SERVICE_NAME: &str = "fieldwork-mobile";
pub const SECRET_SESSION: &str = "work_order_session";

static STORE_INIT: OnceLock<std::result::Result<(), String>> = OnceLock::new();

fn write_secret(name: &str, value: &str) -> Result<()> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::SecureStorage(
            "secret value must not be empty".to_string(),
        ));
    }
    entry(name)?.set_password(value).map_err(map_keyring_error)
}

fn read_secret(name: &str) -> Result<Option<String>> {
    match entry(name)?.get_password() {
        Ok(value) => {
            let normalized = value.trim();
            if normalized.is_empty() {
                Ok(None)
            } else {
                Ok(Some(normalized.to_string()))
            }
        }
        Err(KeyringError::NoEntry) => Ok(None),
        Err(error) => Err(map_keyring_error(error)),
    }
}

fn delete_secret(name: &str) -> Result<()> {
    match entry(name)?.delete_credential() {
        Ok(()) | Err(KeyringError::NoEntry) => Ok(()),
        Err(error) => Err(map_keyring_error(error)),
    }
}

fn entry(name: &str) -> Result<Entry> {
    ensure_store()?;
    Entry::new(SECRET_SERVICE_NAME, name).map_err(map_keyring_error)
}

fn ensure_store() -> Result<()> {
    STORE_INIT
        .get_or_init(initialize_store)
        .clone()
        .map_err(Error::SecureStorage)
}

#[cfg(target_os = "android")]
fn initialize_store() -> std::result::Result<(), String> {
    let store: Arc<CredentialStore> = android_native_keyring_store::Store::new()
        .map_err(|error| format!("failed to initialize Android secure store: {error}"))?;
    keyring_core::set_default_store(store);
    Ok(())
}

#[cfg(not(target_os = "android"))]
fn initialize_store() -> std::result::Result<(), String> {
    let store: Arc<CredentialStore> = keyring_core::mock::Store::new()
        .map_err(|error| format!("failed to initialize mock secure store: {error}"))?;
    keyring_core::set_default_store(store);
    Ok(())
}

fn map_keyring_error(error: KeyringError) -> Error {
    let message = match error {
        KeyringError::NoDefaultStore => "secure store is not initialized".to_string(),
        KeyringError::NoEntry => "secret does not exist".to_string(),
        other => other.to_string(),
    };
    Error::SecureStorage(message)
}

/// The signed-in session, serialized as JSON under one secure-store entry.
#[derive(Debug, Clone)]
pub struct SecureSessionStore {
    name: String,
}

impl Default for SecureSessionStore {
    fn default() -> Self {
        Self::named(SECRET_SESSION)
    }
}

impl SecureSessionStore {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl SessionPersistence for SecureSessionStore {
    fn load_session(&self) -> Result<Option<Session>> {
        let Some(raw) = read_secret(&self.name)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(error) => {
                tracing::warn!("Discarding unreadable stored session: {}", error);
                delete_secret(&self.name)?;
                Ok(None)
            }
        }
    }

    fn save_session(&self, session: &Session) -> Result<()> {
        write_secret(&self.name, &serde_json::to_string(session)?)
    }

    fn clear_session(&self) -> Result<()> {
        delete_secret(&self.name)
    }
}

//! CLI session persistence in the OS keychain, one entry per profile.

#[cfg(test)]
use std::collections::HashMap;
#[cfg(test)]
use std::sync::{Mutex, OnceLock};

#[cfg(not(test))]
use keyring::Entry;

use fieldwork_core::{Error, Result, Session, SessionPersistence};

#[cfg(not(test))]
const KEYRING_SERVICE_NAME: &str = "fieldwork-cli";

#[derive(Debug, Clone)]
pub struct ProfileSessionStore {
    username: String,
}

impl ProfileSessionStore {
    pub fn new(profile_name: &str) -> Self {
        Self {
            username: format!("work_order_session:{profile_name}"),
        }
    }

    #[cfg(test)]
    fn test_store() -> &'static Mutex<HashMap<String, String>> {
        static STORE: OnceLock<Mutex<HashMap<String, String>>> = OnceLock::new();
        STORE.get_or_init(|| Mutex::new(HashMap::new()))
    }

    #[cfg(not(test))]
    fn entry(&self) -> Result<Entry> {
        Entry::new(KEYRING_SERVICE_NAME, &self.username)
            .map_err(|error| Error::SecureStorage(error.to_string()))
    }
}

/// A stored entry that no longer parses counts as signed out.
fn decode_session(raw: &str) -> Option<Session> {
    match serde_json::from_str(raw) {
        Ok(session) => Some(session),
        Err(error) => {
            tracing::warn!("Discarding unreadable stored session: {}", error);
            None
        }
    }
}

impl SessionPersistence for ProfileSessionStore {
    #[cfg(not(test))]
    fn load_session(&self) -> Result<Option<Session>> {
        let entry = self.entry()?;
        match entry.get_password() {
            Ok(raw) => match decode_session(&raw) {
                Some(session) => Ok(Some(session)),
                None => {
                    self.clear_session()?;
                    Ok(None)
                }
            },
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(Error::SecureStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn load_session(&self) -> Result<Option<Session>> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| Error::SecureStorage(error.to_string()))?;
        let Some(raw) = guard.get(&self.username) else {
            return Ok(None);
        };
        let session = decode_session(raw);
        if session.is_none() {
            guard.remove(&self.username);
        }
        Ok(session)
    }

    #[cfg(not(test))]
    fn save_session(&self, session: &Session) -> Result<()> {
        let raw = serde_json::to_string(session)?;
        self.entry()?
            .set_password(&raw)
            .map_err(|error| Error::SecureStorage(error.to_string()))
    }

    #[cfg(test)]
    fn save_session(&self, session: &Session) -> Result<()> {
        let raw = serde_json::to_string(session)?;
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| Error::SecureStorage(error.to_string()))?;
        guard.insert(self.username.clone(), raw);
        Ok(())
    }

    #[cfg(not(test))]
    fn clear_session(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(Error::SecureStorage(error.to_string())),
        }
    }

    #[cfg(test)]
    fn clear_session(&self) -> Result<()> {
        let mut guard = Self::test_store()
            .lock()
            .map_err(|error| Error::SecureStorage(error.to_string()))?;
        guard.remove(&self.username);
        Ok(())
    }
}

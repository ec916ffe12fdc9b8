//! Session persistence seam shared by the CLI and mobile shells.

use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::models::Session;

/// Device-persistent storage for the bearer session.
///
/// Implementations must be cheap to clone; the API client keeps its own copy.
pub trait SessionPersistence: Clone + Send + Sync + 'static {
    fn load_session(&self) -> Result<Option<Session>>;
    fn save_session(&self, session: &Session) -> Result<()>;
    fn clear_session(&self) -> Result<()>;
}

/// Process-local session store.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    inner: Arc<Mutex<Option<Session>>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Some(session))),
        }
    }
}

impl SessionPersistence for MemorySessionStore {
    fn load_session(&self) -> Result<Option<Session>> {
        let guard = self
            .inner
            .lock()
            .map_err(|_| Error::SecureStorage("session store lock poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save_session(&self, session: &Session) -> Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| Error::SecureStorage("session store lock poisoned".to_string()))?;
        *guard = Some(session.clone());
        Ok(())
    }

    fn clear_session(&self) -> Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| Error::SecureStorage("session store lock poisoned".to_string()))?;
        *guard = None;
        Ok(())
    }
}

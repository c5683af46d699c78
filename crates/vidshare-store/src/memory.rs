use std::sync::Mutex;

use anyhow::{Result, anyhow};

use vidshare_types::Session;

use crate::SessionStore;

/// Session store that lives only as long as the process.
#[derive(Default)]
pub struct MemorySessionStore {
    session: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>> {
        let guard = self.session.lock().map_err(|e| anyhow!("session lock poisoned: {}", e))?;
        Ok(guard.clone())
    }

    fn save(&self, session: &Session) -> Result<()> {
        let mut guard = self.session.lock().map_err(|e| anyhow!("session lock poisoned: {}", e))?;
        *guard = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        let mut guard = self.session.lock().map_err(|e| anyhow!("session lock poisoned: {}", e))?;
        *guard = None;
        Ok(())
    }
}

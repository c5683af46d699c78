pub mod memory;
pub mod migrations;
pub mod sqlite;

use std::sync::{Arc, RwLock};

use anyhow::{Result, bail};
use tracing::info;

use vidshare_types::Session;

pub use memory::MemorySessionStore;
pub use sqlite::SqliteSessionStore;

/// Storage key for the bearer token.
pub const TOKEN_KEY: &str = "token";
/// Storage key for the logged-in user's id.
pub const USER_ID_KEY: &str = "userId";

/// Persistent backing for the session. Implementations must write and clear
/// both fields together.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>>;
    fn save(&self, session: &Session) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Process-wide session handle passed to every screen and API call.
///
/// Reads are served from an in-memory copy that is updated after each
/// successful write, so a read that follows `set_session` or
/// `clear_session` always observes it.
#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    store: Arc<dyn SessionStore>,
    current: RwLock<Option<Session>>,
}

impl SessionContext {
    /// Initialise from whatever the store holds.
    pub fn load(store: Arc<dyn SessionStore>) -> Result<Self> {
        let current = store.load()?;
        if let Some(session) = &current {
            info!("Restored session for user {}", session.user_id);
        }
        Ok(Self {
            inner: Arc::new(SessionInner {
                store,
                current: RwLock::new(current),
            }),
        })
    }

    /// A context with no persistence, starting logged out.
    pub fn ephemeral() -> Self {
        Self {
            inner: Arc::new(SessionInner {
                store: Arc::new(MemorySessionStore::new()),
                current: RwLock::new(None),
            }),
        }
    }

    pub fn set_session(&self, token: &str, user_id: &str) -> Result<()> {
        if token.trim().is_empty() || user_id.trim().is_empty() {
            bail!("refusing to store a session without both token and user id");
        }
        let session = Session {
            token: token.to_string(),
            user_id: user_id.to_string(),
        };
        self.inner.store.save(&session)?;
        *self.inner.current.write().unwrap_or_else(|e| e.into_inner()) = Some(session);
        info!("Session stored for user {}", user_id);
        Ok(())
    }

    /// Drop the session. The in-memory copy is cleared even if the store
    /// fails, so later authenticated calls still short-circuit.
    pub fn clear_session(&self) -> Result<()> {
        *self.inner.current.write().unwrap_or_else(|e| e.into_inner()) = None;
        self.inner.store.clear()?;
        info!("Session cleared");
        Ok(())
    }

    pub fn current(&self) -> Option<Session> {
        self.inner
            .current
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn token(&self) -> Option<String> {
        self.current().map(|s| s.token)
    }

    pub fn user_id(&self) -> Option<String> {
        self.current().map(|s| s.user_id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("user_id", &self.user_id())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_observes_new_value() {
        let ctx = SessionContext::ephemeral();
        assert!(!ctx.is_authenticated());

        ctx.set_session("T1", "U1").unwrap();
        assert_eq!(ctx.token().as_deref(), Some("T1"));
        assert_eq!(ctx.user_id().as_deref(), Some("U1"));

        ctx.set_session("T2", "U1").unwrap();
        assert_eq!(ctx.token().as_deref(), Some("T2"));

        ctx.clear_session().unwrap();
        assert_eq!(ctx.token(), None);
        assert_eq!(ctx.user_id(), None);
    }

    #[test]
    fn partial_session_is_refused() {
        let ctx = SessionContext::ephemeral();
        assert!(ctx.set_session("T1", "").is_err());
        assert!(ctx.set_session("", "U1").is_err());
        assert!(ctx.current().is_none());
    }

    #[test]
    fn clones_share_state() {
        let ctx = SessionContext::ephemeral();
        let other = ctx.clone();
        ctx.set_session("T1", "U1").unwrap();
        assert_eq!(other.token().as_deref(), Some("T1"));
        other.clear_session().unwrap();
        assert!(!ctx.is_authenticated());
    }

    #[test]
    fn load_restores_persisted_session() {
        let store = Arc::new(MemorySessionStore::new());
        store
            .save(&Session { token: "T9".into(), user_id: "U9".into() })
            .unwrap();
        let ctx = SessionContext::load(store).unwrap();
        assert_eq!(ctx.token().as_deref(), Some("T9"));
    }
}

use std::path::Path;
use std::sync::Mutex;

use anyhow::{Result, anyhow};
use rusqlite::{Connection, OptionalExtension};
use tracing::{info, warn};

use vidshare_types::Session;

use crate::{SessionStore, TOKEN_KEY, USER_ID_KEY, migrations};

/// Key-value session store kept in a small SQLite file, so a login survives
/// process restarts the way the browser's local storage survives reloads.
pub struct SqliteSessionStore {
    conn: Mutex<Connection>,
}

impl SqliteSessionStore {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        migrations::run(&conn)?;

        info!("Session store opened at {}", path.display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|e| anyhow!("Session store lock poisoned: {}", e))?;
        f(&mut conn)
    }

    /// Raw read of a single key.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.with_conn(|conn| query_value(conn, key))
    }

    /// Raw write of a single key. Only meant for tooling and tests; session
    /// writes go through [`SessionStore::save`].
    pub fn put(&self, key: &str, value: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
                (key, value),
            )?;
            Ok(())
        })
    }
}

impl SessionStore for SqliteSessionStore {
    fn load(&self) -> Result<Option<Session>> {
        self.with_conn(|conn| {
            let token = query_value(conn, TOKEN_KEY)?;
            let user_id = query_value(conn, USER_ID_KEY)?;

            match (token, user_id) {
                (Some(token), Some(user_id)) => Ok(Some(Session { token, user_id })),
                (None, None) => Ok(None),
                _ => {
                    warn!("Discarding partial session found in store");
                    delete_session(conn)?;
                    Ok(None)
                }
            }
        })
    }

    fn save(&self, session: &Session) -> Result<()> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            for (key, value) in [(TOKEN_KEY, &session.token), (USER_ID_KEY, &session.user_id)] {
                tx.execute(
                    "INSERT INTO kv (key, value) VALUES (?1, ?2)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
                    (key, value),
                )?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    fn clear(&self) -> Result<()> {
        self.with_conn(delete_session)
    }
}

fn query_value(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
        .optional()?;
    Ok(value)
}

fn delete_session(conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute(
        "DELETE FROM kv WHERE key IN (?1, ?2)",
        (TOKEN_KEY, USER_ID_KEY),
    )?;
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(token: &str, user_id: &str) -> Session {
        Session {
            token: token.into(),
            user_id: user_id.into(),
        }
    }

    #[test]
    fn save_load_clear() {
        let store = SqliteSessionStore::open_in_memory().unwrap();
        assert_eq!(store.load().unwrap(), None);

        store.save(&session("T1", "U1")).unwrap();
        assert_eq!(store.load().unwrap(), Some(session("T1", "U1")));

        store.save(&session("T2", "U2")).unwrap();
        assert_eq!(store.load().unwrap(), Some(session("T2", "U2")));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(store.get(USER_ID_KEY).unwrap(), None);
    }

    #[test]
    fn partial_session_is_discarded_on_load() {
        let store = SqliteSessionStore::open_in_memory().unwrap();
        store.put(TOKEN_KEY, "orphan").unwrap();

        assert_eq!(store.load().unwrap(), None);
        assert_eq!(store.get(TOKEN_KEY).unwrap(), None);
    }

    #[test]
    fn session_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.db");

        SqliteSessionStore::open(&path)
            .unwrap()
            .save(&session("T1", "U1"))
            .unwrap();

        let reopened = SqliteSessionStore::open(&path).unwrap();
        assert_eq!(reopened.load().unwrap(), Some(session("T1", "U1")));
    }
}

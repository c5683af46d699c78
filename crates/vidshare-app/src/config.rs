use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use vidshare_client::{ApiClient, ClientConfig};
use vidshare_store::{SessionContext, SqliteSessionStore};

use crate::app::AppContext;
use crate::notify::Notifier;

pub const DEFAULT_API_URL: &str = "https://video-uploader-api.vercel.app";
pub const DEFAULT_SESSION_DB: &str = "vidshare-session.db";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    /// `None` keeps the session in memory for the life of the process.
    pub session_db: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            session_db: Some(PathBuf::from(DEFAULT_SESSION_DB)),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl AppConfig {
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api_base_url.trim_end_matches('/').to_string(),
            timeout: self.request_timeout,
        }
    }

    /// Open the session store and build the shared context every screen uses.
    pub fn build_context(&self, notifier: Arc<dyn Notifier>) -> anyhow::Result<AppContext> {
        let session = match &self.session_db {
            Some(path) => {
                let store = SqliteSessionStore::open(path)
                    .with_context(|| format!("opening session store at {}", path.display()))?;
                SessionContext::load(Arc::new(store))?
            }
            None => SessionContext::ephemeral(),
        };
        let client = ApiClient::new(&self.client_config()).context("building HTTP client")?;
        Ok(AppContext::new(client, session, notifier))
    }
}

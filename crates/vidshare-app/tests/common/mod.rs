#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use vidshare_app::{AppContext, MemoryNotifier};
use vidshare_client::{ApiClient, ClientConfig};
use vidshare_store::SessionContext;
use vidshare_testkit::MockApi;

pub struct Harness {
    pub mock: MockApi,
    pub ctx: AppContext,
    pub notes: Arc<MemoryNotifier>,
}

impl Harness {
    pub fn messages(&self) -> Vec<String> {
        self.notes.messages()
    }
}

pub async fn harness() -> Harness {
    let mock = MockApi::start().await;
    let client = ApiClient::new(&ClientConfig {
        base_url: mock.base_url.clone(),
        timeout: Duration::from_secs(5),
    })
    .unwrap();
    let notes = Arc::new(MemoryNotifier::new());
    let ctx = AppContext::new(client, SessionContext::ephemeral(), notes.clone());
    Harness { mock, ctx, notes }
}

pub async fn logged_in(token: &str, user_id: &str) -> Harness {
    let h = harness().await;
    h.ctx.session.set_session(token, user_id).unwrap();
    h
}

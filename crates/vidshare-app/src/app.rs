use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use vidshare_client::ApiClient;
use vidshare_store::SessionContext;

use crate::notify::Notifier;
use crate::render;
use crate::router::Route;
use crate::screens::{ListingScreen, ProfileScreen, UserListingScreen, ViewStatus};

/// Shared services, created once at startup and handed to every screen.
#[derive(Clone)]
pub struct AppContext {
    pub client: ApiClient,
    pub session: SessionContext,
    pub notifier: Arc<dyn Notifier>,
    shutdown: CancellationToken,
}

impl AppContext {
    pub fn new(client: ApiClient, session: SessionContext, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            client,
            session,
            notifier,
            shutdown: CancellationToken::new(),
        }
    }

    /// A fresh per-screen scope. Its requests are cancelled when the scope
    /// is dropped or the whole app shuts down.
    pub fn scope(&self) -> ScreenScope {
        let cancel = self.shutdown.child_token();
        ScreenScope {
            client: self.client.scoped(cancel),
            session: self.session.clone(),
            notifier: self.notifier.clone(),
        }
    }

    /// Cancel every outstanding request of every screen.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Mount the page at `route` and render it as text.
    ///
    /// Login and register are interactive and have nothing to show.
    pub async fn show(&self, route: &Route) -> Option<Page> {
        match route {
            Route::Login | Route::Register => None,
            Route::Profile => {
                let mut screen = ProfileScreen::new(self);
                screen.mount().await;
                Some(Page::new(screen.status(), render::profile_page(&screen)))
            }
            Route::Listing => {
                let mut screen = ListingScreen::new(self);
                screen.mount().await;
                Some(Page::new(screen.status(), render::listing_page(&screen)))
            }
            Route::UserListing(user_id) => {
                let mut screen = UserListingScreen::new(self, user_id);
                screen.mount().await;
                Some(Page::new(screen.status(), render::user_listing_page(&screen)))
            }
        }
    }
}

/// A mounted page: how the mount went, and the rendered text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub status: ViewStatus,
    pub text: String,
}

impl Page {
    fn new(status: ViewStatus, text: String) -> Self {
        Self { status, text }
    }

    pub fn is_ready(&self) -> bool {
        self.status == ViewStatus::Ready
    }
}

/// What one screen sees of the app: a client bound to the screen's own
/// cancellation token, the session, and the notifier.
pub struct ScreenScope {
    pub client: ApiClient,
    pub session: SessionContext,
    pub notifier: Arc<dyn Notifier>,
}

impl ScreenScope {
    pub fn teardown(&self) {
        self.client.cancellation().cancel();
    }

    pub fn is_torn_down(&self) -> bool {
        self.client.cancellation().is_cancelled()
    }
}

impl Drop for ScreenScope {
    fn drop(&mut self) {
        self.teardown();
    }
}

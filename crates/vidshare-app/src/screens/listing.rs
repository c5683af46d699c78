use tracing::error;
use vidshare_types::UserVideos;

use crate::app::{AppContext, ScreenScope};
use crate::router::Route;
use crate::screens::{NOT_LOGGED_IN, Navigation, ViewStatus};

/// Every user's videos, grouped by user.
pub struct ListingScreen {
    scope: ScreenScope,
    status: ViewStatus,
    users: Vec<UserVideos>,
}

impl ListingScreen {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            scope: ctx.scope(),
            status: ViewStatus::Loading,
            users: Vec::new(),
        }
    }

    pub fn status(&self) -> ViewStatus {
        self.status
    }

    pub fn users(&self) -> &[UserVideos] {
        &self.users
    }

    pub async fn mount(&mut self) {
        if !self.scope.session.is_authenticated() {
            self.status = ViewStatus::Unauthenticated;
            self.scope.notifier.error(NOT_LOGGED_IN);
            return;
        }

        match self.scope.client.all_videos(&self.scope.session).await {
            Ok(users) => {
                self.users = users;
                self.status = ViewStatus::Ready;
            }
            Err(e) => {
                error!("failed to fetch videos: {}", e);
                self.scope.notifier.error("Failed to fetch videos");
                self.users.clear();
                self.status = ViewStatus::Failed;
            }
        }
    }

    pub fn open_user(&self, user_id: &str) -> Navigation {
        Navigation::To(Route::UserListing(user_id.to_string()))
    }

    pub fn go_to_profile(&self) -> Navigation {
        Navigation::To(Route::Profile)
    }

    pub fn teardown(&self) {
        self.scope.teardown();
    }
}

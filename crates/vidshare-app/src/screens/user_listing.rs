use tracing::error;
use vidshare_types::VideoCollection;

use crate::app::{AppContext, ScreenScope};
use crate::router::Route;
use crate::screens::{NOT_LOGGED_IN, Navigation, ViewStatus};

/// One user's videos, reached from the all-users listing.
pub struct UserListingScreen {
    scope: ScreenScope,
    user_id: String,
    status: ViewStatus,
    videos: VideoCollection,
}

impl UserListingScreen {
    pub fn new(ctx: &AppContext, user_id: &str) -> Self {
        Self {
            scope: ctx.scope(),
            user_id: user_id.to_string(),
            status: ViewStatus::Loading,
            videos: VideoCollection::default(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn status(&self) -> ViewStatus {
        self.status
    }

    pub fn videos(&self) -> &VideoCollection {
        &self.videos
    }

    pub async fn mount(&mut self) {
        if !self.scope.session.is_authenticated() {
            self.status = ViewStatus::Unauthenticated;
            self.scope.notifier.error(NOT_LOGGED_IN);
            return;
        }

        match self
            .scope
            .client
            .user_videos(&self.scope.session, &self.user_id)
            .await
        {
            Ok(videos) => {
                self.videos = videos;
                self.status = ViewStatus::Ready;
            }
            Err(e) => {
                error!("failed to fetch videos of {}: {}", self.user_id, e);
                self.scope.notifier.error("Failed to fetch user videos");
                self.videos = VideoCollection::default();
                self.status = ViewStatus::Failed;
            }
        }
    }

    pub fn back_to_listing(&self) -> Navigation {
        Navigation::To(Route::Listing)
    }

    pub fn teardown(&self) {
        self.scope.teardown();
    }
}

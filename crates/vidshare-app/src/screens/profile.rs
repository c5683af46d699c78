use std::path::Path;

use tracing::{error, info, warn};
use vidshare_client::{ApiError, VideoUpload};
use vidshare_media::{MediaError, MediaFile, Preview, read_media_file};
use vidshare_types::{UserProfile, VideoCollection};

use crate::app::{AppContext, ScreenScope};
use crate::router::Route;
use crate::screens::{NOT_LOGGED_IN, Navigation, ValidationError, ViewStatus};
use crate::workflow::{UploadWorkflow, WorkflowError};

/// Longest bio the profile form accepts.
pub const BIO_MAX_CHARS: usize = 150;

const PROFILE_THUMBNAIL_NAME: &str = "profile_thumbnail.jpg";
const VIDEO_THUMBNAIL_NAME: &str = "video_thumbnail.jpg";

/// The "upload video" modal.
#[derive(Debug, Clone, Default)]
pub struct VideoForm {
    pub title: String,
    pub description: String,
    pub thumbnail: Option<Preview>,
    pub video: Option<MediaFile>,
}

pub struct ProfileScreen {
    scope: ScreenScope,
    status: ViewStatus,
    profile: UserProfile,
    bio: String,
    /// Whether `bio` holds the saved bio or an explicit edit, and may be sent.
    bio_known: bool,
    avatar: Option<Preview>,
    videos: VideoCollection,
    video_form: VideoForm,
    profile_flow: UploadWorkflow,
    video_flow: UploadWorkflow,
}

impl ProfileScreen {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            scope: ctx.scope(),
            status: ViewStatus::Loading,
            profile: UserProfile::default(),
            bio: String::new(),
            bio_known: false,
            avatar: None,
            videos: VideoCollection::default(),
            video_form: VideoForm::default(),
            profile_flow: UploadWorkflow::new("profile"),
            video_flow: UploadWorkflow::new("video"),
        }
    }

    pub fn status(&self) -> ViewStatus {
        self.status
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// The bio as currently edited, which may differ from the saved one.
    pub fn bio(&self) -> &str {
        &self.bio
    }

    pub fn avatar(&self) -> Option<&Preview> {
        self.avatar.as_ref()
    }

    pub fn videos(&self) -> &VideoCollection {
        &self.videos
    }

    pub fn video_form(&self) -> &VideoForm {
        &self.video_form
    }

    pub fn profile_workflow(&self) -> &UploadWorkflow {
        &self.profile_flow
    }

    pub fn video_workflow(&self) -> &UploadWorkflow {
        &self.video_flow
    }

    /// Fetch the profile and the user's own videos.
    pub async fn mount(&mut self) {
        if !self.scope.session.is_authenticated() {
            self.status = ViewStatus::Unauthenticated;
            self.scope.notifier.error(NOT_LOGGED_IN);
            return;
        }

        let client = &self.scope.client;
        let session = &self.scope.session;
        let (profile, videos) = tokio::join!(client.user_data(session), client.own_videos(session));

        let mut failed = false;
        match profile {
            Ok(profile) => {
                self.bio = profile.bio.clone();
                self.bio_known = true;
                self.avatar = profile.avatar.as_ref().map(Preview::from_media_ref);
                self.profile = profile;
            }
            Err(e) => {
                error!("failed to fetch user data: {}", e);
                self.scope.notifier.error("Failed to fetch user data");
                failed = true;
            }
        }
        match videos {
            Ok(videos) => self.videos = videos,
            Err(e) => {
                error!("failed to fetch user videos: {}", e);
                self.scope.notifier.error("Failed to fetch user videos");
                self.videos = VideoCollection::default();
                failed = true;
            }
        }
        self.status = if failed { ViewStatus::Failed } else { ViewStatus::Ready };
    }

    pub async fn refresh_videos(&mut self) {
        match self.scope.client.own_videos(&self.scope.session).await {
            Ok(videos) => self.videos = videos,
            Err(e) => {
                error!("failed to fetch user videos: {}", e);
                self.scope.notifier.error("Failed to fetch user videos");
            }
        }
    }

    // -- Profile form --

    pub fn set_bio(&mut self, bio: impl Into<String>) -> Result<(), ValidationError> {
        let bio = bio.into();
        if bio.chars().count() > BIO_MAX_CHARS {
            return Err(ValidationError::new(
                "bio",
                format!("Bio must be at most {} characters", BIO_MAX_CHARS),
            ));
        }
        self.bio = bio;
        self.bio_known = true;
        Ok(())
    }

    pub async fn select_avatar(&mut self, path: &Path) -> Result<(), MediaError> {
        let file = self.read_selected(path).await?;
        self.avatar = Some(Preview::from_file(file));
        Ok(())
    }

    /// Send the bio and, when it can be encoded, the avatar.
    ///
    /// Refuses to send a bio that was neither loaded nor edited, so a failed
    /// fetch cannot blank the saved one.
    pub async fn save_profile(&mut self) -> Result<(), WorkflowError> {
        let thumbnail = match self.avatar.as_ref().map(|a| a.to_upload(PROFILE_THUMBNAIL_NAME)) {
            Some(Ok(file)) => file,
            Some(Err(e)) => {
                warn!("avatar cannot be encoded, sending the bio only: {}", e);
                None
            }
            None => None,
        };

        let client = &self.scope.client;
        let session = &self.scope.session;
        let bio = &self.bio;
        let bio_known = self.bio_known;
        let result = self
            .profile_flow
            .submit(session, || async move {
                if !bio_known {
                    return Err(ApiError::Validation("profile has not been loaded".into()));
                }
                client.update_bio_thumbnail(session, bio, thumbnail).await
            })
            .await;

        match &result {
            Ok(resp) => {
                let message = resp.message.as_deref().unwrap_or("Profile updated");
                self.scope.notifier.success(message);
                self.profile.bio = self.bio.clone();
            }
            Err(WorkflowError::AlreadySubmitting) => {}
            Err(WorkflowError::Failed(e)) => {
                error!("failed to update profile: {}", e);
                self.scope.notifier.error("Failed to update profile");
            }
        }
        self.profile_flow.acknowledge();
        result.map(|_| ())
    }

    // -- Video form --

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.video_form.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.video_form.description = description.into();
    }

    pub async fn select_thumbnail(&mut self, path: &Path) -> Result<(), MediaError> {
        let file = self.read_selected(path).await?;
        self.video_form.thumbnail = Some(Preview::from_file(file));
        Ok(())
    }

    pub async fn select_video(&mut self, path: &Path) -> Result<(), MediaError> {
        let file = self.read_selected(path).await?;
        self.video_form.video = Some(file);
        Ok(())
    }

    /// Upload the modal's contents. Success clears the form and reloads the
    /// collection; failure leaves the form as it was.
    pub async fn upload_video(&mut self) -> Result<(), WorkflowError> {
        let thumbnail = self.video_form.thumbnail.clone();
        let mut upload = VideoUpload {
            title: self.video_form.title.clone(),
            description: self.video_form.description.clone(),
            video: self.video_form.video.clone(),
            thumbnail: None,
        };
        let client = &self.scope.client;
        let session = &self.scope.session;
        let result = self
            .video_flow
            .submit(session, || async move {
                upload.thumbnail = thumbnail
                    .as_ref()
                    .map(|t| t.to_upload(VIDEO_THUMBNAIL_NAME))
                    .transpose()?
                    .flatten();
                client.upload_video(session, upload).await
            })
            .await;

        match &result {
            Ok(resp) => {
                let message = resp.message.as_deref().unwrap_or("Video uploaded");
                self.scope.notifier.success(message);
                self.video_form = VideoForm::default();
            }
            Err(WorkflowError::AlreadySubmitting) => {}
            Err(WorkflowError::Failed(e)) => {
                error!("failed to upload video: {}", e);
                self.scope.notifier.error("Failed to upload video");
            }
        }
        self.video_flow.acknowledge();
        if result.is_ok() {
            self.refresh_videos().await;
        }
        result.map(|_| ())
    }

    // -- Navigation --

    pub fn logout(&mut self) -> Navigation {
        if let Err(e) = self.scope.session.clear_session() {
            error!("failed to clear stored session: {:#}", e);
        }
        info!("logged out");
        self.scope.notifier.success("Logged out successfully");
        Navigation::To(Route::Login)
    }

    pub fn go_to_listing(&self) -> Navigation {
        Navigation::To(Route::Listing)
    }

    pub fn teardown(&self) {
        self.scope.teardown();
    }

    async fn read_selected(&self, path: &Path) -> Result<MediaFile, MediaError> {
        read_media_file(path).await.inspect_err(|e| {
            error!("cannot read {}: {}", path.display(), e);
            self.scope
                .notifier
                .error(&format!("Could not read {}", path.display()));
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use vidshare_client::{ApiClient, ClientConfig};
    use vidshare_store::SessionContext;

    use super::*;
    use crate::notify::MemoryNotifier;

    fn screen() -> ProfileScreen {
        let client = ApiClient::new(&ClientConfig {
            base_url: "http://127.0.0.1:9".into(),
            timeout: Duration::from_secs(1),
        })
        .unwrap();
        let ctx = AppContext::new(client, SessionContext::ephemeral(), Arc::new(MemoryNotifier::new()));
        ProfileScreen::new(&ctx)
    }

    fn logged_in_screen() -> ProfileScreen {
        let screen = screen();
        screen.scope.session.set_session("T1", "U1").unwrap();
        screen
    }

    fn broken_thumbnail() -> Preview {
        Preview::from_source("data:image/jpeg;base64,%%%")
    }

    #[tokio::test]
    async fn token_check_comes_before_thumbnail_encoding() {
        let mut screen = screen();
        screen.video_form.thumbnail = Some(broken_thumbnail());

        let err = screen.upload_video().await.unwrap_err();
        assert!(matches!(err, WorkflowError::Failed(ApiError::Unauthenticated)));
    }

    #[tokio::test]
    async fn unencodable_thumbnail_fails_inside_the_workflow() {
        let mut screen = logged_in_screen();
        screen.set_title("kept");
        screen.video_form.thumbnail = Some(broken_thumbnail());

        let err = screen.upload_video().await.unwrap_err();
        assert!(matches!(err, WorkflowError::Failed(ApiError::Media(_))));
        assert_eq!(screen.video_form().title, "kept");
        assert!(!screen.video_workflow().is_submitting());
    }

    #[tokio::test]
    async fn unloaded_bio_is_never_sent() {
        let mut screen = logged_in_screen();
        let err = screen.save_profile().await.unwrap_err();
        assert!(matches!(err, WorkflowError::Failed(ApiError::Validation(_))));
    }

    #[test]
    fn bio_is_limited_to_150_chars() {
        let mut screen = screen();
        assert!(screen.set_bio("é".repeat(BIO_MAX_CHARS)).is_ok());

        let err = screen.set_bio("x".repeat(BIO_MAX_CHARS + 1)).unwrap_err();
        assert_eq!(err.field, "bio");
        assert_eq!(screen.bio().chars().count(), BIO_MAX_CHARS);
    }

    #[tokio::test]
    async fn selecting_a_file_builds_a_preview() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("me.png");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\nrest").unwrap();

        let mut screen = screen();
        screen.select_avatar(&path).await.unwrap();
        let avatar = screen.avatar().unwrap();
        assert!(avatar.source().starts_with("data:image/png;base64,"));
        assert_eq!(avatar.original().unwrap().file_name, "me.png");
    }

    #[tokio::test]
    async fn missing_file_is_reported() {
        let mut screen = screen();
        assert!(screen.select_video(Path::new("/nonexistent/clip.mp4")).await.is_err());
        assert!(screen.video_form().video.is_none());
    }
}

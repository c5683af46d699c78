use tracing::info;

use vidshare_media::MediaFile;
use vidshare_store::SessionContext;
use vidshare_types::api::{
    LoginRequest, LoginResponse, MessageResponse, RegisterRequest, RegisterResponse,
    UserDataResponse, UserVideosWire, VideoRecordWire,
};
use vidshare_types::{Session, UserProfile, UserVideos, VideoCollection};

use crate::{ApiClient, ApiError, FormField};

pub const REGISTER_PATH: &str = "/api/accounts/register";
pub const LOGIN_PATH: &str = "/api/accounts/login";
pub const USER_DATA_PATH: &str = "/api/accounts/userdata";
pub const BIO_THUMBNAIL_PATH: &str = "/api/accounts/biothumbnail";
pub const VIDEO_UPLOAD_PATH: &str = "/api/video/upload";
pub const ALL_VIDEOS_PATH: &str = "/api/video/all";

/// Path of one user's video listing.
pub fn user_videos_path(user_id: &str) -> String {
    format!("/api/video/{}", user_id)
}

/// Fields of a video upload. Every field is optional on the client side;
/// the server decides what it accepts.
#[derive(Debug, Clone, Default)]
pub struct VideoUpload {
    pub title: String,
    pub description: String,
    pub video: Option<MediaFile>,
    pub thumbnail: Option<MediaFile>,
}

impl VideoUpload {
    fn into_fields(self) -> Vec<(String, FormField)> {
        let mut fields = vec![
            ("title".to_string(), FormField::Text(self.title)),
            ("description".to_string(), FormField::Text(self.description)),
        ];
        if let Some(video) = self.video {
            fields.push(("video".to_string(), FormField::File(video)));
        }
        if let Some(thumbnail) = self.thumbnail {
            fields.push(("thumbnail".to_string(), FormField::File(thumbnail)));
        }
        fields
    }
}

fn require_token(session: &SessionContext) -> Result<String, ApiError> {
    session.token().ok_or(ApiError::Unauthenticated)
}

fn require_session(session: &SessionContext) -> Result<Session, ApiError> {
    session.current().ok_or(ApiError::Unauthenticated)
}

impl ApiClient {
    // -- Accounts --

    #[tracing::instrument(skip(self, req), fields(firstname = %req.firstname))]
    pub async fn register(&self, req: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        self.post_json(REGISTER_PATH, req, None).await
    }

    /// Exchange credentials for a session. Does not store it; that is the
    /// caller's decision.
    #[tracing::instrument(skip(self, req), fields(firstname = %req.firstname))]
    pub async fn login(&self, req: &LoginRequest) -> Result<Session, ApiError> {
        let resp: LoginResponse = self.post_json(LOGIN_PATH, req, None).await?;
        let session = Session::try_from(resp)?;
        info!("Logged in as user {}", session.user_id);
        Ok(session)
    }

    #[tracing::instrument(skip_all)]
    pub async fn user_data(&self, session: &SessionContext) -> Result<UserProfile, ApiError> {
        let token = require_token(session)?;
        let resp: UserDataResponse = self.get_json(USER_DATA_PATH, &token).await?;
        Ok(UserProfile::from(resp))
    }

    #[tracing::instrument(skip_all, fields(with_thumbnail = thumbnail.is_some()))]
    pub async fn update_bio_thumbnail(
        &self,
        session: &SessionContext,
        bio: &str,
        thumbnail: Option<MediaFile>,
    ) -> Result<MessageResponse, ApiError> {
        let token = require_token(session)?;
        let mut fields = vec![("bio".to_string(), FormField::Text(bio.to_string()))];
        if let Some(thumbnail) = thumbnail {
            fields.push(("thumbnail".to_string(), FormField::File(thumbnail)));
        }
        self.post_multipart(BIO_THUMBNAIL_PATH, fields, &token).await
    }

    // -- Videos --

    #[tracing::instrument(skip_all, fields(title = %upload.title))]
    pub async fn upload_video(
        &self,
        session: &SessionContext,
        upload: VideoUpload,
    ) -> Result<MessageResponse, ApiError> {
        let token = require_token(session)?;
        self.post_multipart(VIDEO_UPLOAD_PATH, upload.into_fields(), &token).await
    }

    #[tracing::instrument(skip(self, session))]
    pub async fn user_videos(
        &self,
        session: &SessionContext,
        user_id: &str,
    ) -> Result<VideoCollection, ApiError> {
        let token = require_token(session)?;
        if user_id.trim().is_empty() || user_id.contains('/') {
            return Err(ApiError::Validation(format!("invalid user id {:?}", user_id)));
        }
        let wire: Vec<VideoRecordWire> = self.get_json(&user_videos_path(user_id), &token).await?;
        Ok(VideoCollection::try_from(wire)?)
    }

    /// Videos of the logged-in user. Needs both halves of the session.
    pub async fn own_videos(&self, session: &SessionContext) -> Result<VideoCollection, ApiError> {
        let current = require_session(session)?;
        self.user_videos(session, &current.user_id).await
    }

    #[tracing::instrument(skip_all)]
    pub async fn all_videos(&self, session: &SessionContext) -> Result<Vec<UserVideos>, ApiError> {
        let token = require_token(session)?;
        let wire: Vec<UserVideosWire> = self.get_json(ALL_VIDEOS_PATH, &token).await?;
        wire.into_iter()
            .map(|entry| UserVideos::try_from(entry).map_err(ApiError::from))
            .collect()
    }
}

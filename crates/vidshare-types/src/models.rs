use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::{LoginResponse, UserDataResponse, UserVideosWire, VideoRecordWire};

/// A server payload that does not have the shape the client relies on.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed response: {0}")]
pub struct MalformedResponse(pub String);

// -- Session --

/// The authenticated identity. Both fields are always non-empty; a session
/// missing either one is not a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: String,
}

impl TryFrom<LoginResponse> for Session {
    type Error = MalformedResponse;

    fn try_from(resp: LoginResponse) -> Result<Self, Self::Error> {
        let token = non_blank(resp.token)
            .ok_or_else(|| MalformedResponse("login response has no token".into()))?;
        let user_id = non_blank(resp.user_id)
            .ok_or_else(|| MalformedResponse("login response has no userId".into()))?;
        Ok(Session { token, user_id })
    }
}

// -- Media --

/// Where a piece of remote media can be loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaRef {
    /// An http(s) or server-relative URL.
    Url(String),
    /// A complete `data:` URL.
    DataUrl(String),
    /// Bare base64 without a `data:` prefix, as the all-users listing sends it.
    Inline { mime: String, base64: String },
}

impl MediaRef {
    /// Classify a media string from the server. Blank values carry no media.
    pub fn from_server(value: &str, default_mime: &str) -> Option<MediaRef> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }
        if value.starts_with("data:") {
            return Some(MediaRef::DataUrl(value.to_string()));
        }
        if value.starts_with("http://") || value.starts_with("https://") || value.starts_with('/') {
            return Some(MediaRef::Url(value.to_string()));
        }
        // Anything outside the base64 alphabet is a relative path.
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=') || c.is_ascii_whitespace())
        {
            return Some(MediaRef::Url(value.to_string()));
        }
        Some(MediaRef::Inline {
            mime: default_mime.to_string(),
            base64: value.to_string(),
        })
    }

    /// A string usable directly as a preview source.
    pub fn source(&self) -> String {
        match self {
            MediaRef::Url(url) | MediaRef::DataUrl(url) => url.clone(),
            MediaRef::Inline { mime, base64 } => format!("data:{};base64,{}", mime, base64),
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, MediaRef::Url(_))
    }
}

// -- Profile --

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserProfile {
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub avatar: Option<MediaRef>,
}

impl From<UserDataResponse> for UserProfile {
    fn from(resp: UserDataResponse) -> Self {
        UserProfile {
            first_name: resp.firstname.unwrap_or_default(),
            last_name: resp.lastname.unwrap_or_default(),
            bio: resp.bio.unwrap_or_default(),
            avatar: resp
                .thumbnail
                .as_deref()
                .and_then(|t| MediaRef::from_server(t, "image/jpeg")),
        }
    }
}

// -- Videos --

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRecord {
    /// Only the per-user listing carries record ids.
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub video: MediaRef,
    pub thumbnail: Option<MediaRef>,
    pub created_at: Option<DateTime<Utc>>,
}

impl TryFrom<VideoRecordWire> for VideoRecord {
    type Error = MalformedResponse;

    fn try_from(wire: VideoRecordWire) -> Result<Self, Self::Error> {
        let id = non_blank(wire.id).or_else(|| non_blank(wire.plain_id));
        let media = |values: [&Option<String>; 3], mime: &str| {
            values
                .into_iter()
                .filter_map(|v| v.as_deref())
                .find_map(|v| MediaRef::from_server(v, mime))
        };

        let video = media([&wire.video_url, &wire.video_data, &wire.video_base64], "video/mp4")
            .ok_or_else(|| {
                MalformedResponse(format!(
                    "video record {} has no video payload",
                    id.as_deref().unwrap_or("<unnamed>")
                ))
            })?;
        let thumbnail = media([&wire.thumbnail_url, &wire.thumbnail, &None], "image/jpeg");

        let created_at = wire.created_at.as_deref().and_then(|raw| {
            match DateTime::parse_from_rfc3339(raw) {
                Ok(ts) => Some(ts.with_timezone(&Utc)),
                Err(e) => {
                    warn!("Ignoring unparseable createdAt {:?}: {}", raw, e);
                    None
                }
            }
        });

        Ok(VideoRecord {
            id,
            title: wire.title.unwrap_or_default(),
            description: wire.description.unwrap_or_default(),
            video,
            thumbnail,
            created_at,
        })
    }
}

/// Videos in the order the server returned them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoCollection(Vec<VideoRecord>);

impl VideoCollection {
    pub fn new(records: Vec<VideoRecord>) -> Self {
        Self(records)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VideoRecord> {
        self.0.iter()
    }

    pub fn into_inner(self) -> Vec<VideoRecord> {
        self.0
    }
}

impl TryFrom<Vec<VideoRecordWire>> for VideoCollection {
    type Error = MalformedResponse;

    fn try_from(wire: Vec<VideoRecordWire>) -> Result<Self, Self::Error> {
        wire.into_iter()
            .map(VideoRecord::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map(VideoCollection)
    }
}

impl<'a> IntoIterator for &'a VideoCollection {
    type Item = &'a VideoRecord;
    type IntoIter = std::slice::Iter<'a, VideoRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One user's section of the all-users listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserVideos {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<MediaRef>,
    pub videos: VideoCollection,
}

impl UserVideos {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

impl TryFrom<UserVideosWire> for UserVideos {
    type Error = MalformedResponse;

    fn try_from(wire: UserVideosWire) -> Result<Self, Self::Error> {
        let user_id = non_blank(wire.user_id)
            .or_else(|| non_blank(wire.object_id))
            .ok_or_else(|| MalformedResponse("listing entry has no userId".into()))?;
        Ok(UserVideos {
            user_id,
            first_name: wire.firstname.unwrap_or_default(),
            last_name: wire.lastname.unwrap_or_default(),
            avatar: wire
                .thumbnail
                .as_deref()
                .and_then(|t| MediaRef::from_server(t, "image/jpeg")),
            videos: VideoCollection::try_from(wire.video_array)?,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(video_url: Option<&str>, video_data: Option<&str>) -> VideoRecordWire {
        VideoRecordWire {
            id: Some("v1".into()),
            title: Some("Sunset".into()),
            video_url: video_url.map(Into::into),
            video_data: video_data.map(Into::into),
            created_at: Some("2024-05-01T10:00:00.000Z".into()),
            ..Default::default()
        }
    }

    #[test]
    fn login_response_requires_both_fields() {
        let full = LoginResponse { token: Some("T1".into()), user_id: Some("U1".into()) };
        assert_eq!(
            Session::try_from(full).unwrap(),
            Session { token: "T1".into(), user_id: "U1".into() }
        );

        let no_user = LoginResponse { token: Some("T1".into()), user_id: None };
        assert!(Session::try_from(no_user).is_err());

        let blank_token = LoginResponse { token: Some("  ".into()), user_id: Some("U1".into()) };
        assert!(Session::try_from(blank_token).is_err());
    }

    #[test]
    fn media_ref_classification() {
        assert_eq!(MediaRef::from_server("", "image/jpeg"), None);
        assert!(MediaRef::from_server("https://cdn/x.jpg", "image/jpeg").unwrap().is_remote());
        assert_eq!(
            MediaRef::from_server("data:image/png;base64,AAAA", "image/jpeg"),
            Some(MediaRef::DataUrl("data:image/png;base64,AAAA".into()))
        );
        let inline = MediaRef::from_server("QUJD", "image/jpeg").unwrap();
        assert_eq!(inline.source(), "data:image/jpeg;base64,QUJD");
    }

    #[test]
    fn url_wins_over_inline_video() {
        let rec = VideoRecord::try_from(record(Some("https://cdn/v.mp4"), Some("AAAA"))).unwrap();
        assert_eq!(rec.video, MediaRef::Url("https://cdn/v.mp4".into()));
        assert_eq!(rec.description, "");
        assert!(rec.created_at.is_some());
    }

    #[test]
    fn record_without_video_is_rejected() {
        let err = VideoRecord::try_from(record(None, Some("   "))).unwrap_err();
        assert!(err.0.contains("v1"));
    }

    #[test]
    fn bad_timestamp_is_coerced() {
        let mut wire = record(Some("https://cdn/v.mp4"), None);
        wire.created_at = Some("yesterday".into());
        let rec = VideoRecord::try_from(wire).unwrap();
        assert!(rec.created_at.is_none());
    }

    #[test]
    fn collection_keeps_server_order() {
        let wires: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|id| VideoRecordWire {
                id: Some(id.to_string()),
                video_url: Some(format!("https://cdn/{id}.mp4")),
                ..Default::default()
            })
            .collect();
        let collection = VideoCollection::try_from(wires).unwrap();
        let ids: Vec<_> = collection.iter().filter_map(|r| r.id.as_deref()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn doubled_spellings_merge() {
        let wire: VideoRecordWire = serde_json::from_str(
            r#"{"id":"v9","videoBase64":"AAAA","thumbnailUrl":"https://cdn/t.jpg","thumbnail":"QUJD"}"#,
        )
        .unwrap();
        let rec = VideoRecord::try_from(wire).unwrap();
        assert_eq!(rec.id.as_deref(), Some("v9"));
        assert_eq!(
            rec.video,
            MediaRef::Inline { mime: "video/mp4".into(), base64: "AAAA".into() }
        );
        assert_eq!(rec.thumbnail, Some(MediaRef::Url("https://cdn/t.jpg".into())));
    }

    #[test]
    fn listing_entry_falls_back_to_object_id() {
        let wire = UserVideosWire { object_id: Some("u1".into()), ..Default::default() };
        assert_eq!(UserVideos::try_from(wire).unwrap().user_id, "u1");
    }

    #[test]
    fn relative_media_path_is_a_url() {
        assert_eq!(
            MediaRef::from_server("uploads/avatars/me.jpg", "image/jpeg"),
            Some(MediaRef::Url("uploads/avatars/me.jpg".into()))
        );
    }

    #[test]
    fn user_videos_needs_user_id() {
        let wire = UserVideosWire { firstname: Some("Ada".into()), ..Default::default() };
        assert!(UserVideos::try_from(wire).is_err());
    }
}

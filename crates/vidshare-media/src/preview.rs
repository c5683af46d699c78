use vidshare_types::MediaRef;

use crate::{MediaError, MediaFile, data_url_to_binary, to_data_url};

/// A displayable media source, with the original binary when it is known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    source: String,
    original: Option<MediaFile>,
}

impl Preview {
    /// Preview for a freshly selected local file.
    pub fn from_file(file: MediaFile) -> Self {
        Self {
            source: to_data_url(&file),
            original: Some(file),
        }
    }

    /// Preview for media that only exists as a string.
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            original: None,
        }
    }

    pub fn from_media_ref(media: &MediaRef) -> Self {
        Self::from_source(media.source())
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn original(&self) -> Option<&MediaFile> {
        self.original.as_ref()
    }

    pub fn is_remote(&self) -> bool {
        self.original.is_none() && !self.source.starts_with("data:")
    }

    /// Binary form for a multipart upload under `file_name`.
    ///
    /// Uses the retained original when there is one, otherwise decodes the
    /// data URL. Remote URLs cannot be re-uploaded and give `None`.
    pub fn to_upload(&self, file_name: &str) -> Result<Option<MediaFile>, MediaError> {
        if let Some(original) = &self.original {
            return Ok(Some(original.renamed(file_name)));
        }
        if self.is_remote() {
            return Ok(None);
        }
        data_url_to_binary(&self.source, file_name).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_file_keeps_original_bytes() {
        let file = MediaFile::new("me.png", "image/png", vec![1u8, 2, 3]);
        let preview = Preview::from_file(file.clone());
        assert!(preview.source().starts_with("data:image/png;base64,"));

        let upload = preview.to_upload("profile_thumbnail.jpg").unwrap().unwrap();
        assert_eq!(upload.file_name, "profile_thumbnail.jpg");
        assert_eq!(upload.bytes, file.bytes);
        assert_eq!(upload.mime, "image/png");
    }

    #[test]
    fn inline_server_media_is_decoded() {
        let media = MediaRef::Inline {
            mime: "image/jpeg".into(),
            base64: "AAEC".into(),
        };
        let upload = Preview::from_media_ref(&media)
            .to_upload("profile_thumbnail.jpg")
            .unwrap()
            .unwrap();
        assert_eq!(&upload.bytes[..], &[0, 1, 2]);
        assert_eq!(upload.mime, "image/jpeg");
    }

    #[test]
    fn remote_media_is_not_reuploaded() {
        let preview = Preview::from_media_ref(&MediaRef::Url("https://cdn/a.jpg".into()));
        assert!(preview.is_remote());
        assert_eq!(preview.to_upload("x.jpg").unwrap(), None);
    }
}

use std::fmt;

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use bytes::Bytes;

use crate::{MediaError, MediaFile};

/// A decoded `data:<mime>;base64,<payload>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime: String,
    pub bytes: Bytes,
}

impl DataUrl {
    pub fn new(mime: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    /// Parse a base64 data URL. Media type parameters such as
    /// `;charset=...` or `;name=...` are accepted and dropped.
    pub fn parse(input: &str) -> Result<Self, MediaError> {
        let rest = input.trim().strip_prefix("data:").ok_or(MediaError::NotDataUrl)?;
        let (meta, payload) = rest.split_once(',').ok_or(MediaError::MissingPayload)?;

        let mut params = meta.split(';');
        let mime = params
            .next()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or("text/plain")
            .to_string();
        if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
            return Err(MediaError::NotBase64);
        }

        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = BASE64.decode(compact)?;
        Ok(Self {
            mime,
            bytes: Bytes::from(bytes),
        })
    }
}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime, BASE64.encode(&self.bytes))
    }
}

/// Encode a media file as a data URL string.
pub fn to_data_url(file: &MediaFile) -> String {
    DataUrl::new(file.mime.clone(), file.bytes.clone()).to_string()
}

/// Decode a data URL back into an uploadable file named `file_name`.
pub fn data_url_to_binary(data_url: &str, file_name: &str) -> Result<MediaFile, MediaError> {
    let DataUrl { mime, bytes } = DataUrl::parse(data_url)?;
    Ok(MediaFile {
        file_name: file_name.to_string(),
        mime,
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_survives_encode_decode() {
        let payloads: [&[u8]; 4] = [b"", b"\x00", b"\xff\xd8\xff\xe0jpeg-ish", &[7u8; 1025]];
        for bytes in payloads {
            let file = MediaFile::new("a.bin", "application/octet-stream", bytes.to_vec());
            let decoded = data_url_to_binary(&to_data_url(&file), "a.bin").unwrap();
            assert_eq!(decoded, file);
        }
    }

    #[test]
    fn parameters_are_ignored() {
        let url = DataUrl::parse("data:image/png;name=x.png;base64,AAEC").unwrap();
        assert_eq!(url.mime, "image/png");
        assert_eq!(&url.bytes[..], &[0, 1, 2]);
    }

    #[test]
    fn missing_mime_defaults_to_text() {
        let url = DataUrl::parse("data:;base64,aGk=").unwrap();
        assert_eq!(url.mime, "text/plain");
        assert_eq!(&url.bytes[..], b"hi");
    }

    #[test]
    fn wrapped_payload_is_accepted() {
        let url = DataUrl::parse("data:text/plain;base64,aGVs\nbG8=").unwrap();
        assert_eq!(&url.bytes[..], b"hello");
    }

    #[test]
    fn rejects_non_base64_and_garbage() {
        assert!(matches!(DataUrl::parse("https://x/y.png"), Err(MediaError::NotDataUrl)));
        assert!(matches!(DataUrl::parse("data:image/png;base64"), Err(MediaError::MissingPayload)));
        assert!(matches!(DataUrl::parse("data:text/plain,hello"), Err(MediaError::NotBase64)));
        assert!(matches!(DataUrl::parse("data:image/png;base64,@@@"), Err(MediaError::Base64(_))));
    }
}

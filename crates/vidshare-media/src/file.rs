use std::path::Path;

use bytes::Bytes;
use tracing::debug;

use crate::{MediaError, to_data_url};

/// A binary payload ready to attach to a multipart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Bytes,
}

impl MediaFile {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes: bytes.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Same payload under another file name.
    pub fn renamed(&self, file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
            mime: self.mime.clone(),
            bytes: self.bytes.clone(),
        }
    }
}

/// Read a local file and detect its media type.
pub async fn read_media_file(path: &Path) -> Result<MediaFile, MediaError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| MediaError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.bin".to_string());
    let mime = sniff_mime(&bytes, &file_name);

    debug!("Read {} ({} bytes, {})", path.display(), bytes.len(), mime);
    Ok(MediaFile::new(file_name, mime, bytes))
}

/// Read a local file straight into a data URL.
pub async fn file_to_data_url(path: &Path) -> Result<String, MediaError> {
    let file = read_media_file(path).await?;
    Ok(to_data_url(&file))
}

/// Media type from magic bytes, then from the file extension.
pub fn sniff_mime(bytes: &[u8], file_name: &str) -> &'static str {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return "image/jpeg";
    }
    if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
        return "image/png";
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return "image/gif";
    }
    if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return "image/webp";
    }
    if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
        return if &bytes[8..12] == b"qt  " { "video/quicktime" } else { "video/mp4" };
    }
    if bytes.starts_with(&[0x1A, 0x45, 0xDF, 0xA3]) {
        return "video/webm";
    }

    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_bytes_beat_extension() {
        assert_eq!(sniff_mime(&[0xFF, 0xD8, 0xFF, 0xE0], "photo.png"), "image/jpeg");
        assert_eq!(sniff_mime(b"\0\0\0\x18ftypisom", "clip.bin"), "video/mp4");
        assert_eq!(sniff_mime(b"\0\0\0\x14ftypqt  ", "clip.bin"), "video/quicktime");
        assert_eq!(sniff_mime(b"RIFF\0\0\0\0WEBPVP8 ", "x"), "image/webp");
    }

    #[test]
    fn extension_fallback() {
        assert_eq!(sniff_mime(b"", "clip.MOV"), "video/quicktime");
        assert_eq!(sniff_mime(b"plain", "notes"), "application/octet-stream");
    }

    #[tokio::test]
    async fn reads_file_into_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("avatar.png");
        tokio::fs::write(&path, [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2])
            .await
            .unwrap();

        let file = read_media_file(&path).await.unwrap();
        assert_eq!(file.file_name, "avatar.png");
        assert_eq!(file.mime, "image/png");

        let url = file_to_data_url(&path).await.unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn missing_file_reports_path() {
        let err = read_media_file(Path::new("/definitely/not/here.jpg")).await.unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.jpg"));
    }
}

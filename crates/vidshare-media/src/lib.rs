//! Conversion between local media files and the base64 data URLs used for
//! previews.
//!
//! Uploads need binary attachments while previews need strings. [`Preview`]
//! keeps both so that a freshly selected file is uploaded as-is, and only a
//! preview that arrived as text (e.g. an avatar fetched from the server) has
//! to be decoded again.

pub mod data_url;
pub mod file;
pub mod preview;

pub use data_url::{DataUrl, data_url_to_binary, to_data_url};
pub use file::{MediaFile, file_to_data_url, read_media_file, sniff_mime};
pub use preview::Preview;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("not a data URL")]
    NotDataUrl,
    #[error("data URL has no payload")]
    MissingPayload,
    #[error("only base64 data URLs are supported")]
    NotBase64,
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

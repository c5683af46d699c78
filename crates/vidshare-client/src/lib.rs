//! HTTP client for the video-sharing REST API.
//!
//! [`ApiClient`] is the transport (JSON and multipart, bearer auth, timeout,
//! cancellation); the typed endpoint calls in [`endpoints`] sit on top of it
//! and turn responses into validated `vidshare_types` records.

pub mod endpoints;
pub mod error;
pub mod http;

pub use endpoints::VideoUpload;
pub use error::ApiError;
pub use http::{ApiClient, ClientConfig, FormField};

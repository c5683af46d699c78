//! Shared data types for the vidshare client.
//!
//! `api` holds the payloads exactly as the REST API sends and receives them;
//! `models` holds the validated records the rest of the workspace works with.
//! Conversion from one to the other happens only through the `TryFrom`
//! impls in `models`.

pub mod api;
pub mod models;

pub use models::{
    MalformedResponse, MediaRef, Session, UserProfile, UserVideos, VideoCollection, VideoRecord,
};

mod listing;
mod login;
mod profile;
mod register;
mod user_listing;

pub use listing::ListingScreen;
pub use login::{LoginForm, LoginScreen};
pub use profile::{BIO_MAX_CHARS, ProfileScreen, VideoForm};
pub use register::{RegisterForm, RegisterScreen};
pub use user_listing::UserListingScreen;

use crate::router::Route;

pub(crate) const NOT_LOGGED_IN: &str = "You are not logged in";

/// What a screen asks the app to do after handling an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Stay,
    To(Route),
}

/// Load state of a screen's remote data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ViewStatus {
    #[default]
    Loading,
    Ready,
    /// No session; nothing was fetched.
    Unauthenticated,
    /// The fetch failed; the screen shows an empty collection.
    Failed,
}

/// A form field that failed a client-side check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

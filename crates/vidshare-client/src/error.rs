use vidshare_media::MediaError;
use vidshare_types::MalformedResponse;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No session; raised locally before any request is built.
    #[error("not logged in")]
    Unauthenticated,

    #[error("network failure: {0}")]
    Network(#[source] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("request cancelled")]
    Cancelled,

    /// 401 or 403 from the server.
    #[error("authorization rejected ({status}){}", suffix(.message))]
    Auth { status: u16, message: Option<String> },

    /// Any other non-2xx response.
    #[error("server error ({status}){}", suffix(.message))]
    Server { status: u16, message: Option<String> },

    #[error(transparent)]
    MalformedResponse(#[from] MalformedResponse),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error(transparent)]
    Media(#[from] MediaError),
}

impl ApiError {
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Network(err)
        }
    }

    pub(crate) fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            401 | 403 => ApiError::Auth { status, message },
            _ => ApiError::Server { status, message },
        }
    }

    /// The `message` the server put in its error body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Auth { message, .. } | ApiError::Server { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// True when the request reached the server and got an answer back.
    pub fn is_server_response(&self) -> bool {
        matches!(
            self,
            ApiError::Auth { .. } | ApiError::Server { .. } | ApiError::MalformedResponse(_)
        )
    }
}

fn suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {}", m)).unwrap_or_default()
}

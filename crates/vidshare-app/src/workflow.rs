//! Submission state machine shared by the profile and video upload forms.
//!
//! ```text
//! Idle --submit--> Submitting --ok--> Success
//!   ^                  |
//!   |                  +--err--> Failed
//!   +---- acknowledge -------------+
//! ```
//!
//! A submission without a token goes straight to `Failed(Unauthenticated)`
//! and the action never runs. While a submission is in flight every further
//! `submit` is rejected with [`WorkflowError::AlreadySubmitting`].

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{error, info, warn};
use vidshare_client::ApiError;
use vidshare_store::SessionContext;
use vidshare_types::api::MessageResponse;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailReason {
    Unauthenticated,
    /// The server answered with an error, possibly carrying a message.
    Rejected { status: u16, message: Option<String> },
    Network(String),
    Cancelled,
    Invalid(String),
}

impl From<&ApiError> for FailReason {
    fn from(err: &ApiError) -> Self {
        match err {
            ApiError::Unauthenticated => FailReason::Unauthenticated,
            ApiError::Auth { status, message } | ApiError::Server { status, message } => {
                FailReason::Rejected {
                    status: *status,
                    message: message.clone(),
                }
            }
            ApiError::Cancelled => FailReason::Cancelled,
            ApiError::Validation(msg) => FailReason::Invalid(msg.clone()),
            other => FailReason::Network(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UploadState {
    #[default]
    Idle,
    Submitting,
    Success { message: Option<String> },
    Failed(FailReason),
}

impl UploadState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, UploadState::Success { .. } | UploadState::Failed(_))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("a submission is already in progress")]
    AlreadySubmitting,

    #[error(transparent)]
    Failed(#[from] ApiError),
}

#[derive(Default)]
struct Inner {
    in_flight: AtomicBool,
    state: Mutex<UploadState>,
}

/// Cheap to clone; clones share state.
#[derive(Clone, Default)]
pub struct UploadWorkflow {
    name: &'static str,
    inner: Arc<Inner>,
}

/// Releases the in-flight flag however the submission ends, including when
/// its future is dropped mid-request.
struct InFlight<'a> {
    workflow: &'a UploadWorkflow,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = self.workflow.lock_state();
        if *state == UploadState::Submitting {
            *state = UploadState::Failed(FailReason::Cancelled);
        }
        drop(state);
        self.workflow.inner.in_flight.store(false, Ordering::Release);
    }
}

impl UploadWorkflow {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            inner: Arc::default(),
        }
    }

    pub fn state(&self) -> UploadState {
        self.lock_state().clone()
    }

    /// Whether the submit control should currently be disabled.
    pub fn is_submitting(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    /// Return to `Idle` after a terminal state has been shown. No-op otherwise.
    pub fn acknowledge(&self) -> bool {
        let mut state = self.lock_state();
        if state.is_terminal() {
            *state = UploadState::Idle;
            true
        } else {
            false
        }
    }

    pub async fn submit<F, Fut>(
        &self,
        session: &SessionContext,
        action: F,
    ) -> Result<MessageResponse, WorkflowError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<MessageResponse, ApiError>>,
    {
        if self
            .inner
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("{}: submission rejected, one is already in flight", self.name);
            return Err(WorkflowError::AlreadySubmitting);
        }
        let _guard = InFlight { workflow: self };

        if session.token().is_none() {
            self.set_state(UploadState::Failed(FailReason::Unauthenticated));
            return Err(ApiError::Unauthenticated.into());
        }

        self.set_state(UploadState::Submitting);
        match action().await {
            Ok(resp) => {
                info!("{}: submitted", self.name);
                self.set_state(UploadState::Success {
                    message: resp.message.clone(),
                });
                Ok(resp)
            }
            Err(e) => {
                error!("{}: submission failed: {}", self.name, e);
                self.set_state(UploadState::Failed(FailReason::from(&e)));
                Err(e.into())
            }
        }
    }

    fn set_state(&self, next: UploadState) {
        *self.lock_state() = next;
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, UploadState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use super::*;

    fn logged_in() -> SessionContext {
        let session = SessionContext::ephemeral();
        session.set_session("T1", "U1").unwrap();
        session
    }

    fn ok(message: &str) -> Result<MessageResponse, ApiError> {
        Ok(MessageResponse {
            message: Some(message.to_string()),
        })
    }

    #[tokio::test]
    async fn success_then_acknowledge_returns_to_idle() {
        let flow = UploadWorkflow::new("video");
        let resp = flow.submit(&logged_in(), || async { ok("Video uploaded") }).await.unwrap();
        assert_eq!(resp.message.as_deref(), Some("Video uploaded"));
        assert_eq!(
            flow.state(),
            UploadState::Success { message: Some("Video uploaded".into()) }
        );

        assert!(flow.acknowledge());
        assert_eq!(flow.state(), UploadState::Idle);
        assert!(!flow.acknowledge());
    }

    #[tokio::test]
    async fn missing_token_fails_without_running_action() {
        let flow = UploadWorkflow::new("video");
        let ran = AtomicUsize::new(0);

        let err = flow
            .submit(&SessionContext::ephemeral(), || async {
                ran.fetch_add(1, Ordering::SeqCst);
                ok("never")
            })
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Failed(ApiError::Unauthenticated)));
        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert_eq!(flow.state(), UploadState::Failed(FailReason::Unauthenticated));
        assert!(!flow.is_submitting());
    }

    #[tokio::test]
    async fn server_rejection_is_recorded() {
        let flow = UploadWorkflow::new("profile");
        let err = flow
            .submit(&logged_in(), || async {
                Err(ApiError::Server { status: 500, message: Some("boom".into()) })
            })
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Failed(ApiError::Server { status: 500, .. })));
        assert_eq!(
            flow.state(),
            UploadState::Failed(FailReason::Rejected { status: 500, message: Some("boom".into()) })
        );
    }

    #[tokio::test]
    async fn second_submit_while_in_flight_is_rejected() {
        let flow = UploadWorkflow::new("video");
        let session = logged_in();
        let runs = AtomicUsize::new(0);

        let first = flow.submit(&session, || async {
            runs.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(100)).await;
            ok("done")
        });
        let second = async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert!(flow.is_submitting());
            assert_eq!(flow.state(), UploadState::Submitting);
            flow.submit(&session, || async {
                runs.fetch_add(1, Ordering::SeqCst);
                ok("again")
            })
            .await
        };

        let (first, second) = tokio::join!(first, second);
        assert!(first.is_ok());
        assert!(matches!(second, Err(WorkflowError::AlreadySubmitting)));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!flow.is_submitting());
    }

    #[tokio::test]
    async fn dropped_submission_releases_the_flag() {
        let flow = UploadWorkflow::new("video");
        let session = logged_in();

        let pending = flow.submit(&session, || async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            ok("late")
        });
        let timed_out = tokio::time::timeout(Duration::from_millis(20), pending).await;
        assert!(timed_out.is_err());

        assert!(!flow.is_submitting());
        assert_eq!(flow.state(), UploadState::Failed(FailReason::Cancelled));
    }

    #[test]
    fn transport_errors_map_to_reasons() {
        assert_eq!(FailReason::from(&ApiError::Timeout), FailReason::Network("request timed out".into()));
        assert_eq!(FailReason::from(&ApiError::Cancelled), FailReason::Cancelled);
        assert_eq!(
            FailReason::from(&ApiError::Auth { status: 401, message: None }),
            FailReason::Rejected { status: 401, message: None }
        );
    }
}

use tracing::{error, info};
use vidshare_client::ApiError;
use vidshare_types::api::LoginRequest;

use crate::app::{AppContext, ScreenScope};
use crate::router::Route;
use crate::screens::Navigation;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub firstname: String,
    pub password: String,
}

pub struct LoginScreen {
    scope: ScreenScope,
    form: LoginForm,
}

impl LoginScreen {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            scope: ctx.scope(),
            form: LoginForm::default(),
        }
    }

    pub fn form(&self) -> &LoginForm {
        &self.form
    }

    pub fn set_firstname(&mut self, value: impl Into<String>) {
        self.form.firstname = value.into();
    }

    pub fn set_password(&mut self, value: impl Into<String>) {
        self.form.password = value.into();
    }

    pub fn go_to_register(&self) -> Navigation {
        Navigation::To(Route::Register)
    }

    /// Exchange the credentials for a session and store it.
    ///
    /// Nothing is stored unless the response carries both token and user id.
    pub async fn submit(&mut self) -> Navigation {
        let req = LoginRequest {
            firstname: self.form.firstname.clone(),
            password: self.form.password.clone(),
        };

        let message = match self.scope.client.login(&req).await {
            Ok(session) => match self.scope.session.set_session(&session.token, &session.user_id) {
                Ok(()) => {
                    info!("session stored for user {}", session.user_id);
                    return Navigation::To(Route::Profile);
                }
                Err(e) => {
                    error!("failed to store session: {:#}", e);
                    "An unexpected error occurred. Please try again later.".to_string()
                }
            },
            Err(ApiError::MalformedResponse(e)) => {
                error!("login response rejected: {}", e);
                "An unexpected error occurred. Please try again.".to_string()
            }
            Err(e) if e.is_server_response() => {
                error!("login failed: {}", e);
                e.server_message()
                    .unwrap_or("Login failed. Please try again.")
                    .to_string()
            }
            Err(e) => {
                error!("login request failed: {}", e);
                "An unexpected error occurred. Please try again later.".to_string()
            }
        };

        self.scope.notifier.error(&message);
        Navigation::Stay
    }

    pub fn teardown(&self) {
        self.scope.teardown();
    }
}

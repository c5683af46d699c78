use tracing::{error, info};
use vidshare_types::api::RegisterRequest;

use crate::app::{AppContext, ScreenScope};
use crate::router::Route;
use crate::screens::{Navigation, ValidationError};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub number: String,
}

impl RegisterForm {
    /// Required-field and email checks, in form order.
    pub fn validate(&self) -> Result<RegisterRequest, ValidationError> {
        let required = [
            ("firstname", &self.firstname, "Please input your first name!"),
            ("lastname", &self.lastname, "Please input your last name!"),
            ("email", &self.email, "Please input your email!"),
            ("number", &self.number, "Please input your phone number!"),
        ];
        for (field, value, message) in required {
            if value.trim().is_empty() {
                return Err(ValidationError::new(field, message));
            }
        }
        if !is_valid_email(self.email.trim()) {
            return Err(ValidationError::new("email", "Please enter a valid email!"));
        }

        Ok(RegisterRequest {
            firstname: self.firstname.trim().to_string(),
            lastname: self.lastname.trim().to_string(),
            email: self.email.trim().to_string(),
            number: self.number.trim().to_string(),
        })
    }
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !domain.contains("..")
}

pub struct RegisterScreen {
    scope: ScreenScope,
    form: RegisterForm,
}

impl RegisterScreen {
    pub fn new(ctx: &AppContext) -> Self {
        Self {
            scope: ctx.scope(),
            form: RegisterForm::default(),
        }
    }

    pub fn form(&self) -> &RegisterForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut RegisterForm {
        &mut self.form
    }

    pub fn go_to_login(&self) -> Navigation {
        Navigation::To(Route::Login)
    }

    /// Validate locally, then create the account. A failed check never
    /// reaches the network.
    pub async fn submit(&mut self) -> Navigation {
        let req = match self.form.validate() {
            Ok(req) => req,
            Err(e) => {
                self.scope.notifier.error(&e.message);
                return Navigation::Stay;
            }
        };

        match self.scope.client.register(&req).await {
            Ok(resp) if resp.is_success() => {
                info!("registered {}", req.email);
                let message = resp.message.as_deref().unwrap_or("Registration successful");
                self.scope.notifier.success(message);
                Navigation::To(Route::Login)
            }
            Ok(resp) => {
                error!("registration refused: code {:?}, {:?}", resp.code, resp.message);
                self.scope.notifier.error("Registration failed. Please try again.");
                Navigation::Stay
            }
            Err(e) => {
                error!("registration request failed: {}", e);
                self.scope
                    .notifier
                    .error("An error occurred during registration. Please try again.");
                Navigation::Stay
            }
        }
    }

    pub fn teardown(&self) {
        self.scope.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> RegisterForm {
        RegisterForm {
            firstname: "Ada".into(),
            lastname: "Lovelace".into(),
            email: "ada@example.com".into(),
            number: "555-0100".into(),
        }
    }

    #[test]
    fn complete_form_is_accepted() {
        let req = filled().validate().unwrap();
        assert_eq!(req.email, "ada@example.com");
    }

    #[test]
    fn first_missing_field_is_reported() {
        let form = RegisterForm {
            lastname: String::new(),
            number: String::new(),
            ..filled()
        };
        let err = form.validate().unwrap_err();
        assert_eq!(err.field, "lastname");
        assert_eq!(err.message, "Please input your last name!");
    }

    #[test]
    fn whitespace_only_counts_as_missing() {
        let form = RegisterForm {
            firstname: "   ".into(),
            ..filled()
        };
        assert_eq!(form.validate().unwrap_err().field, "firstname");
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for email in ["ada", "ada@", "@example.com", "ada@example", "ada@.com", "a da@example.com", "a@b@c.com"] {
            let form = RegisterForm {
                email: email.into(),
                ..filled()
            };
            let err = form.validate().unwrap_err();
            assert_eq!(err.message, "Please enter a valid email!", "{email}");
        }
    }
}

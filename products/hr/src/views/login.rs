use std::fmt;

use entity::users::LoginRequest;
use platform_authn::Session;

use crate::{
    context::ViewContext,
    error::ActionResult,
    forms::{FieldError, ValidationErrors},
};

pub const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";

/// Public entry page.
#[derive(Clone, Copy, Debug, Default)]
pub struct LandingView;

impl fmt::Display for LandingView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Ascend - performance evaluation")?;
        writeln!(f, "Role-based dashboards for HR, team leads and employees.")?;
        writeln!(f, "Sign in with `ascend login --email <address>` to continue.")
    }
}

#[derive(Clone, Debug, Default)]
pub struct LoginView {
    pub email: String,
    pub password: String,
    busy: bool,
    error: Option<String>,
}

impl LoginView {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = Vec::new();
        if self.email.trim().is_empty() {
            errors.push(FieldError::new("email", "Email is required"));
        }
        if self.password.is_empty() {
            errors.push(FieldError::new("password", "Password is required"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(errors))
        }
    }

    /// Authenticates and activates the session. The caller decides where
    /// to navigate next.
    pub async fn submit(&mut self, ctx: &ViewContext) -> ActionResult<Session> {
        self.error = None;
        self.validate().map_err(|errors| ctx.invalid(errors))?;
        self.busy = true;
        let credentials = LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        };
        let response = ctx.api.login(&credentials).await;
        self.busy = false;
        let response = match response {
            Ok(response) => response,
            Err(err) => {
                let failure = ctx.fail(err, LOGIN_FAILED);
                self.error = Some(failure.to_string());
                return Err(failure);
            }
        };
        let session = ctx.session.login(response.user, response.token)?;
        self.password.clear();
        Ok(session)
    }
}

impl fmt::Display for LoginView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sign in")?;
        writeln!(f, "  Email: {}", self.email)?;
        if self.busy {
            writeln!(f, "  Signing in...")?;
        }
        if let Some(error) = &self.error {
            writeln!(f, "  {error}")?;
        }
        Ok(())
    }
}

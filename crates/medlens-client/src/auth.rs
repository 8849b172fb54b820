//! Login, registration, logout and page guards.
//!
//! The flows pause before redirecting so a front end can show its success
//! message; the pauses come from `ClientConfig`. Nothing is retried.

use std::{sync::LazyLock, time::Duration};

use regex::Regex;
use serde_json::{json, Value};
use tracing::{info, warn};

use medlens_config::ClientConfig;
use medlens_contracts::{
    error::{MedlensError, MedlensResult},
    session::{AuthResponse, Role, Session},
};
use medlens_core::{traits::Transport, Routes};

use crate::ApiClient;

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";

const MIN_USERNAME_CHARS: usize = 3;
const MIN_PASSWORD_CHARS: usize = 6;

/// Pauses taken by the auth flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthDelays {
    pub login_redirect: Duration,
    pub register_login: Duration,
    pub register_failure_redirect: Duration,
}

impl AuthDelays {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            login_redirect: config.login_redirect_delay(),
            register_login: config.register_login_delay(),
            register_failure_redirect: config.register_failure_redirect_delay(),
        }
    }

    pub fn none() -> Self {
        Self {
            login_redirect: Duration::ZERO,
            register_login: Duration::ZERO,
            register_failure_redirect: Duration::ZERO,
        }
    }
}

impl Default for AuthDelays {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

/// One rejected form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl From<FieldError> for MedlensError {
    fn from(e: FieldError) -> Self {
        MedlensError::Validation {
            field: e.field.to_string(),
            reason: e.message.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationForm {
    pub full_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub role: Role,
}

impl RegistrationForm {
    /// Every problem with the form, in field order.
    pub fn field_errors(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        let email = self.email.trim();
        let username = self.username.trim();

        if email.is_empty() {
            errors.push(FieldError { field: "email", message: "Email is required" });
        } else if !is_valid_email(email) {
            errors.push(FieldError { field: "email", message: "Invalid email format" });
        }

        if username.is_empty() {
            errors.push(FieldError { field: "username", message: "Username is required" });
        } else if username.chars().count() < MIN_USERNAME_CHARS {
            errors.push(FieldError {
                field: "username",
                message: "Username must be at least 3 characters",
            });
        }

        if self.password.is_empty() {
            errors.push(FieldError { field: "password", message: "Password is required" });
        } else if self.password.chars().count() < MIN_PASSWORD_CHARS {
            errors.push(FieldError {
                field: "password",
                message: "Password must be at least 6 characters",
            });
        }

        if self.password != self.confirm_password {
            errors.push(FieldError {
                field: "confirm_password",
                message: "Passwords do not match",
            });
        }
        errors
    }

    /// The first field error, if any.
    pub fn validate(&self) -> MedlensResult<()> {
        match self.field_errors().into_iter().next() {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    fn request_body(&self) -> Value {
        json!({
            "username": self.username.trim(),
            "email": self.email.trim(),
            "password": self.password,
            "role": self.role,
            "full_name": self.full_name.trim(),
        })
    }
}

/// `local@domain.tld` with no whitespace and a single `@`.
static EMAIL_PATTERN: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());

fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN
        .as_ref()
        .is_some_and(|pattern| pattern.is_match(email))
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegisterOutcome {
    /// Registered and signed in.
    LoggedIn(Session),
    /// Registered, but the automatic login failed; the user was sent to the
    /// login page.
    AutoLoginFailed { reason: String },
}

/// Auth flows over an `ApiClient`.
pub struct AuthFlow<'a, T: Transport> {
    api: &'a ApiClient<T>,
    delays: AuthDelays,
}

impl<'a, T: Transport> AuthFlow<'a, T> {
    pub fn new(api: &'a ApiClient<T>, delays: AuthDelays) -> Self {
        Self { api, delays }
    }

    fn routes(&self) -> &Routes {
        self.api.routes()
    }

    /// Sign in, wait, then go to the dashboard of the user's role.
    pub async fn login(&self, username: &str, password: &str) -> MedlensResult<Session> {
        let username = username.trim();
        if username.is_empty() {
            return Err(FieldError { field: "username", message: "Username is required" }.into());
        }
        if password.is_empty() {
            return Err(FieldError { field: "password", message: "Password is required" }.into());
        }

        let session = self.authenticate(username, password).await?;
        pause(self.delays.login_redirect).await;
        self.api
            .navigator()
            .redirect(&self.routes().dashboard(&session.user.role));
        Ok(session)
    }

    /// Create an account, then sign in with it.
    pub async fn register(&self, form: &RegistrationForm) -> MedlensResult<RegisterOutcome> {
        form.validate()?;
        self.api.post(REGISTER_PATH, &form.request_body()).await?;
        info!(username = %form.username.trim(), role = %form.role, "account created");

        pause(self.delays.register_login).await;
        match self.authenticate(form.username.trim(), &form.password).await {
            Ok(session) => {
                self.api
                    .navigator()
                    .redirect(&self.routes().dashboard(&session.user.role));
                Ok(RegisterOutcome::LoggedIn(session))
            }
            Err(e) => {
                warn!(error = %e, "automatic login after registration failed");
                pause(self.delays.register_failure_redirect).await;
                self.api.navigator().redirect(&self.routes().login());
                Ok(RegisterOutcome::AutoLoginFailed {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Forget the session and go to the login page.
    pub fn logout(&self) -> MedlensResult<()> {
        self.api.session().clear()?;
        info!("logged out");
        self.api.navigator().redirect(&self.routes().login());
        Ok(())
    }

    /// Guard a page. Without a session the user is sent to the login page;
    /// with the wrong role, to their own dashboard.
    pub fn require_auth(&self, required: Option<&Role>) -> MedlensResult<Session> {
        let Some(session) = self.api.session().current()? else {
            self.api.navigator().redirect(&self.routes().login());
            return Err(MedlensError::NotAuthenticated);
        };
        if let Some(role) = required {
            if &session.user.role != role {
                warn!(
                    username = %session.user.username,
                    role = %session.user.role,
                    required = %role,
                    "role may not open this page"
                );
                self.api
                    .navigator()
                    .redirect(&self.routes().dashboard(&session.user.role));
                return Err(MedlensError::Forbidden {
                    role: session.user.role.to_string(),
                });
            }
        }
        Ok(session)
    }

    /// Restore a stored session on start-up. A user landing on an auth page
    /// while signed in is sent on to their dashboard.
    pub fn resume(&self) -> MedlensResult<Option<Session>> {
        if !self.api.session().init()? {
            return Ok(None);
        }
        let session = self.api.session().current()?;
        if let Some(s) = &session {
            if Routes::is_auth_page(&self.api.navigator().current_path()) {
                self.api
                    .navigator()
                    .redirect(&self.routes().dashboard(&s.user.role));
            }
        }
        Ok(session)
    }

    async fn authenticate(&self, username: &str, password: &str) -> MedlensResult<Session> {
        let body = json!({ "username": username, "password": password });
        let raw = self.api.post(LOGIN_PATH, &body).await?.ok_or_else(|| {
            MedlensError::ResponseParse {
                reason: "login returned an empty body".to_string(),
            }
        })?;
        let auth: AuthResponse =
            serde_json::from_value(raw).map_err(|e| MedlensError::ResponseParse {
                reason: format!("unexpected login response: {}", e),
            })?;
        let session = self.api.session().store(&auth)?;
        info!(username = %session.user.username, role = %session.user.role, "logged in");
        Ok(session)
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

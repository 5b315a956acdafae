use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use super::Screen;
use crate::api::CalorieApi;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[derive(Debug, Clone, Default)]
pub struct SignupForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignupForm {
    /// Checks run before any request is made.
    pub fn validate(&self) -> Result<(), String> {
        if self.username.trim().is_empty()
            || self.email.trim().is_empty()
            || self.password.is_empty()
            || self.confirm_password.is_empty()
        {
            return Err("All fields are required.".into());
        }
        if self.password != self.confirm_password {
            return Err("Passwords do not match.".into());
        }
        if !is_valid_email(self.email.trim()) {
            return Err("Please enter a valid email address.".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupState {
    Idle { error: Option<String> },
    Submitting,
    Registered,
}

pub struct SignupView {
    api: Arc<dyn CalorieApi>,
    state: SignupState,
}

impl SignupView {
    pub fn new(api: Arc<dyn CalorieApi>) -> Self {
        Self {
            api,
            state: SignupState::Idle { error: None },
        }
    }

    pub fn state(&self) -> &SignupState {
        &self.state
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            SignupState::Idle { error } => error.as_deref(),
            _ => None,
        }
    }

    pub async fn submit(&mut self, form: &SignupForm) -> Option<Screen> {
        if let Err(msg) = form.validate() {
            self.state = SignupState::Idle { error: Some(msg) };
            return None;
        }

        self.state = SignupState::Submitting;
        let email = form.email.trim();
        let result = self
            .api
            .signup(form.username.trim(), email, &form.password)
            .await;

        let error = match result {
            Ok(body) => match body.get("error").and_then(|e| e.as_str()) {
                Some(msg) if !msg.is_empty() => Some(msg.to_string()),
                _ => None,
            },
            Err(e) => Some(e.to_body().error),
        };

        match error {
            None => {
                info!(%email, "account created");
                self.state = SignupState::Registered;
                Some(Screen::Login)
            }
            Some(msg) => {
                warn!(%email, error = %msg, "signup refused");
                self.state = SignupState::Idle { error: Some(msg) };
                None
            }
        }
    }
}

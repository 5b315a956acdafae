use std::sync::Arc;

use tracing::{info, warn};

use super::Screen;
use crate::api::CalorieApi;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginState {
    Idle { error: Option<String> },
    Submitting,
    Authenticated,
}

pub struct LoginView {
    api: Arc<dyn CalorieApi>,
    state: LoginState,
}

impl LoginView {
    pub fn new(api: Arc<dyn CalorieApi>) -> Self {
        Self {
            api,
            state: LoginState::Idle { error: None },
        }
    }

    pub fn state(&self) -> &LoginState {
        &self.state
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            LoginState::Idle { error } => error.as_deref(),
            _ => None,
        }
    }

    /// Logs in and moves to the tracker, or stays idle with a message.
    pub async fn submit(&mut self, session: &mut Session, email: &str, password: &str) -> Option<Screen> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            self.state = LoginState::Idle {
                error: Some("Please enter your email and password.".into()),
            };
            return None;
        }

        self.state = LoginState::Submitting;
        match self.api.login(session, email, password).await {
            Ok(_) if session.has_token() => {
                info!(%email, "login screen authenticated");
                self.state = LoginState::Authenticated;
                Some(Screen::Tracker)
            }
            Ok(body) => {
                let message = match body.rest.get("error").and_then(|e| e.as_str()) {
                    Some(msg) if !msg.is_empty() => msg.to_string(),
                    _ => "Invalid email or password".to_string(),
                };
                warn!(%email, error = %message, "login accepted without a token");
                self.state = LoginState::Idle {
                    error: Some(message),
                };
                None
            }
            Err(e) => {
                self.state = LoginState::Idle {
                    error: Some(e.to_body().error),
                };
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{FakeApi, FAKE_PASSWORD, FAKE_TOKEN, UNVERIFIED_EMAIL};

    fn view() -> (Arc<FakeApi>, LoginView) {
        let api = Arc::new(FakeApi::new());
        (api.clone(), LoginView::new(api))
    }

    #[tokio::test]
    async fn successful_login_navigates_to_tracker() {
        let (_api, mut view) = view();
        let mut session = Session::new();

        let next = view.submit(&mut session, " a@b.co ", FAKE_PASSWORD).await;

        assert_eq!(next, Some(Screen::Tracker));
        assert_eq!(view.state(), &LoginState::Authenticated);
        assert_eq!(session.token(), Some(FAKE_TOKEN));
    }

    #[tokio::test]
    async fn rejected_login_returns_to_idle_with_message() {
        let (_api, mut view) = view();
        let mut session = Session::new();

        let next = view.submit(&mut session, "a@b.co", "nope").await;

        assert_eq!(next, None);
        assert_eq!(view.error(), Some("Invalid login"));
        assert!(!session.has_token());
    }

    #[tokio::test]
    async fn tokenless_success_shows_server_message() {
        let (_api, mut view) = view();
        let mut session = Session::new();

        let next = view.submit(&mut session, UNVERIFIED_EMAIL, FAKE_PASSWORD).await;

        assert_eq!(next, None);
        assert_eq!(view.error(), Some("Please verify your email first"));
        assert!(!session.has_token());
    }

    #[tokio::test]
    async fn empty_fields_never_reach_backend() {
        let (api, mut view) = view();
        let mut session = Session::new();

        assert_eq!(view.submit(&mut session, "", "x").await, None);
        assert_eq!(view.submit(&mut session, "a@b.co", "").await, None);
        assert_eq!(view.error(), Some("Please enter your email and password."));
        assert!(api.calls().is_empty());
    }
}

//! In-memory [`CalorieApi`] used by screen tests.

use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{CalorieApi, LoginResponse};
use crate::error::ApiError;
use crate::images::ImageUpload;
use crate::meals::{DailyEntry, Feedback, Meal};
use crate::session::Session;

pub const FAKE_TOKEN: &str = "fake-token";
pub const FAKE_PASSWORD: &str = "pass123";
/// Logs in with 200 but no token and an `error` message.
pub const UNVERIFIED_EMAIL: &str = "unverified@site.com";

#[derive(Default)]
pub struct FakeApi {
    /// Operation names that answer with a server error.
    failing: Mutex<HashSet<&'static str>>,
    /// Results handed out by `analyze_image`, front first.
    analyses: Mutex<VecDeque<Meal>>,
    pub history: Mutex<Vec<DailyEntry>>,
    pub feedback: Mutex<Vec<Feedback>>,
    pub reset_links: Mutex<Vec<String>>,
    pub signups: Mutex<Vec<(String, String)>>,
    pub calls: Mutex<Vec<&'static str>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, op: &'static str) {
        self.failing.lock().unwrap().insert(op);
    }

    pub fn recover(&self, op: &'static str) {
        self.failing.lock().unwrap().remove(op);
    }

    pub fn queue_analysis(&self, meal: Meal) {
        self.analyses.lock().unwrap().push_back(meal);
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn enter(&self, op: &'static str) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(op);
        if self.failing.lock().unwrap().contains(op) {
            return Err(ApiError::Rejected {
                status: 500,
                message: format!("{op} failed"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl CalorieApi for FakeApi {
    async fn login(
        &self,
        session: &mut Session,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, ApiError> {
        self.enter("login")?;
        if password != FAKE_PASSWORD {
            return Err(ApiError::Rejected {
                status: 401,
                message: "Invalid login".into(),
            });
        }
        let mut rest = serde_json::Map::new();
        if email == UNVERIFIED_EMAIL {
            rest.insert("error".into(), json!("Please verify your email first"));
            return Ok(LoginResponse { token: None, rest });
        }
        session.save_token(FAKE_TOKEN);
        rest.insert("user".into(), json!({ "email": email }));
        Ok(LoginResponse {
            token: Some(FAKE_TOKEN.into()),
            rest,
        })
    }

    async fn signup(&self, username: &str, email: &str, _password: &str) -> Result<Value, ApiError> {
        self.enter("signup")?;
        if email == "taken@site.com" {
            return Ok(json!({ "error": "Email already registered" }));
        }
        self.signups
            .lock()
            .unwrap()
            .push((username.to_string(), email.to_string()));
        Ok(json!({ "success": true }))
    }

    async fn request_reset_link(&self, email: &str) -> Result<(), ApiError> {
        self.enter("reset_link")?;
        self.reset_links.lock().unwrap().push(email.to_string());
        Ok(())
    }

    async fn validate_token(&self, session: &mut Session) -> bool {
        if !session.has_token() {
            return false;
        }
        if self.enter("auth_check").is_err() || session.token() != Some(FAKE_TOKEN) {
            session.clear_token();
            return false;
        }
        true
    }

    async fn analyze_image(&self, _session: &Session, _image: &ImageUpload) -> Result<Meal, ApiError> {
        self.enter("analyze")?;
        self.analyses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ApiError::Rejected {
                status: 422,
                message: "no food detected".into(),
            })
    }

    async fn submit_feedback(&self, session: &Session, feedback: &Feedback) -> Result<Value, ApiError> {
        if !session.has_token() {
            return Err(ApiError::MissingToken);
        }
        self.enter("feedback")?;
        self.feedback.lock().unwrap().push(feedback.clone());
        Ok(json!({ "message": "Feedback submitted!" }))
    }

    async fn get_history(&self, _session: &Session) -> Result<Vec<DailyEntry>, ApiError> {
        self.enter("get_history")?;
        Ok(self.history.lock().unwrap().clone())
    }

    async fn add_history(&self, session: &Session, entry: &DailyEntry) -> Result<Value, ApiError> {
        if !session.has_token() {
            return Err(ApiError::MissingToken);
        }
        self.enter("add_history")?;
        self.history.lock().unwrap().push(entry.clone());
        Ok(json!({ "message": "History added" }))
    }

    async fn reset_history(&self, _session: &Session) -> Result<Value, ApiError> {
        self.enter("wipe")?;
        let removed = std::mem::take(&mut *self.history.lock().unwrap()).len();
        Ok(json!({ "message": "History wiped", "removed": removed }))
    }
}

//! Gateway to the MacroMeter backend.
//!
//! One async operation per endpoint behind [`CalorieApi`]. The session is
//! passed explicitly to every call that needs the bearer token.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiError;
use crate::images::ImageUpload;
use crate::meals::{DailyEntry, Feedback, Meal};
use crate::session::Session;

mod client;
mod dto;
#[cfg(test)]
pub(crate) mod fake;

pub use client::ApiClient;
pub use dto::LoginResponse;

#[async_trait]
pub trait CalorieApi: Send + Sync {
    /// Stores the returned token in `session` when the backend issues one.
    async fn login(
        &self,
        session: &mut Session,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, ApiError>;

    async fn signup(&self, username: &str, email: &str, password: &str)
        -> Result<Value, ApiError>;

    async fn request_reset_link(&self, email: &str) -> Result<(), ApiError>;

    /// `false` when there is no token or the backend refuses it. A refused
    /// token, or a failed check, clears the session.
    async fn validate_token(&self, session: &mut Session) -> bool;

    async fn analyze_image(&self, session: &Session, image: &ImageUpload)
        -> Result<Meal, ApiError>;

    async fn submit_feedback(&self, session: &Session, feedback: &Feedback)
        -> Result<Value, ApiError>;

    async fn get_history(&self, session: &Session) -> Result<Vec<DailyEntry>, ApiError>;

    async fn add_history(&self, session: &Session, entry: &DailyEntry) -> Result<Value, ApiError>;

    async fn reset_history(&self, session: &Session) -> Result<Value, ApiError>;
}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    RequestBuilder, Response, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use super::dto::{
    AddHistoryRequest, ErrorPayload, HistoryResponse, LoginRequest, LoginResponse,
    ResetLinkRequest, SignupRequest,
};
use super::CalorieApi;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::images::ImageUpload;
use crate::meals::{DailyEntry, Feedback, Meal};
use crate::session::Session;

const LOGIN_FAILED: &str = "Invalid email or password";
const SIGNUP_FAILED: &str = "Registration failed";
const RESET_LINK_FAILED: &str = "Failed to send reset link";
const ANALYSIS_FAILED: &str = "Error analyzing the image. Please try again.";
const FEEDBACK_FAILED: &str = "Failed to submit feedback";
const HISTORY_LOAD_FAILED: &str = "Failed to load history";
const HISTORY_SAVE_FAILED: &str = "Failed to save daily consumption";
const HISTORY_WIPE_FAILED: &str = "Failed to clear history";

/// HTTP implementation of [`CalorieApi`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    strict_auth: bool,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::with_timeout(&config.api_base_url, config.request_timeout, config.strict_auth)
    }

    pub fn with_timeout(
        base_url: &str,
        timeout: Duration,
        strict_auth: bool,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Request(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            strict_auth,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attaches the bearer token. Without one the request still goes out
    /// unless strict auth is configured.
    fn authorized(
        &self,
        req: RequestBuilder,
        session: &Session,
        op: &'static str,
    ) -> Result<RequestBuilder, ApiError> {
        match session.token() {
            Some(token) => Ok(req.bearer_auth(token)),
            None if self.strict_auth => {
                warn!(op, "no token held, failing fast");
                Err(ApiError::MissingToken)
            }
            None => {
                warn!(op, "no token held, sending request without credentials");
                Ok(req)
            }
        }
    }
}

/// Sends `req` and turns any non-success answer into [`ApiError`].
async fn send(req: RequestBuilder, default_message: &str) -> Result<Response, ApiError> {
    let response = req.send().await.map_err(|e| {
        warn!(error = %e, "no response from backend");
        ApiError::Unreachable(e)
    })?;

    let status = response.status();
    debug!(%status, "response received");
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    let message = serde_json::from_slice::<ErrorPayload>(&body)
        .ok()
        .and_then(ErrorPayload::message)
        .unwrap_or_else(|| default_message.to_string());
    Err(ApiError::Rejected {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let body = response.bytes().await.map_err(ApiError::Unreachable)?;
    Ok(serde_json::from_slice(&body)?)
}

/// Like [`read_json`] but an empty body reads as `null`.
async fn read_value(response: Response) -> Result<Value, ApiError> {
    let body = response.bytes().await.map_err(ApiError::Unreachable)?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&body)?)
}

#[async_trait]
impl CalorieApi for ApiClient {
    #[instrument(skip(self, session, password), fields(session_id = %session.id()))]
    async fn login(
        &self,
        session: &mut Session,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, ApiError> {
        let req = self
            .http
            .post(self.url("/login"))
            .json(&LoginRequest { email, password });
        let response = send(req, LOGIN_FAILED)
            .await
            .inspect_err(|e| warn!(error = %e, "login failed"))?;
        let body: LoginResponse = read_json(response).await?;

        match body.token.as_deref() {
            Some(token) if !token.is_empty() => {
                session.save_token(token);
                info!("user logged in");
            }
            _ => warn!("login response carried no token"),
        }
        Ok(body)
    }

    #[instrument(skip(self, password))]
    async fn signup(&self, username: &str, email: &str, password: &str) -> Result<Value, ApiError> {
        let req = self.http.post(self.url("/signup")).json(&SignupRequest {
            username,
            email,
            password,
        });
        let response = send(req, SIGNUP_FAILED)
            .await
            .inspect_err(|e| warn!(error = %e, "signup failed"))?;
        let body = read_value(response).await?;
        info!("signup accepted");
        Ok(body)
    }

    #[instrument(skip(self))]
    async fn request_reset_link(&self, email: &str) -> Result<(), ApiError> {
        let req = self
            .http
            .post(self.url("/reset-link"))
            .json(&ResetLinkRequest { email });
        send(req, RESET_LINK_FAILED)
            .await
            .inspect_err(|e| error!(error = %e, "reset link request failed"))?;
        info!("reset link requested");
        Ok(())
    }

    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    async fn validate_token(&self, session: &mut Session) -> bool {
        let Some(token) = session.token() else {
            debug!("no token to validate");
            return false;
        };
        let req = self.http.get(self.url("/api/auth-check")).bearer_auth(token);

        match req.send().await {
            Ok(response) if response.status() == StatusCode::OK => true,
            Ok(response) if response.status().is_success() => {
                warn!(status = %response.status(), "auth check answered without 200");
                false
            }
            Ok(response) => {
                warn!(status = %response.status(), "token rejected, clearing session");
                session.clear_token();
                false
            }
            Err(e) => {
                error!(error = %e, "token validation failed, clearing session");
                session.clear_token();
                false
            }
        }
    }

    #[instrument(skip(self, session, image), fields(session_id = %session.id(), file = %image.file_name))]
    async fn analyze_image(&self, session: &Session, image: &ImageUpload) -> Result<Meal, ApiError> {
        let part = Part::bytes(image.body.to_vec())
            .file_name(image.file_name.clone())
            .mime_str(image.content_type)
            .map_err(|e| ApiError::Request(format!("invalid image content type: {e}")))?;
        let form = Form::new().part("image", part);

        let req = self.authorized(
            self.http.post(self.url("/analyze-image")),
            session,
            "analyze_image",
        )?;
        let response = send(req.multipart(form), ANALYSIS_FAILED)
            .await
            .inspect_err(|e| error!(error = %e, "image analysis failed"))?;
        let status = response.status().as_u16();
        let body = read_value(response).await?;

        // Some deployments answer 200 with an error payload.
        if let Some(message) = serde_json::from_value::<ErrorPayload>(body.clone())
            .ok()
            .and_then(ErrorPayload::message)
        {
            error!(%message, "analysis returned an error payload");
            return Err(ApiError::Rejected { status, message });
        }

        let meal: Meal = serde_json::from_value(body)?;
        info!(name = meal.display_name(), calories = meal.calories_value(), "image analyzed");
        Ok(meal)
    }

    #[instrument(skip(self, session, feedback), fields(session_id = %session.id(), stars = feedback.stars))]
    async fn submit_feedback(&self, session: &Session, feedback: &Feedback) -> Result<Value, ApiError> {
        if !session.has_token() {
            warn!("no token held, feedback not sent");
            return Err(ApiError::MissingToken);
        }
        let req = self.authorized(self.http.post(self.url("/feedback")), session, "submit_feedback")?;
        let response = send(req.json(feedback), FEEDBACK_FAILED)
            .await
            .inspect_err(|e| error!(error = %e, "feedback submission failed"))?;
        read_value(response)
            .await
            .inspect_err(|e| error!(error = %e, "feedback response unreadable"))
    }

    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    async fn get_history(&self, session: &Session) -> Result<Vec<DailyEntry>, ApiError> {
        let req = self.authorized(self.http.get(self.url("/history")), session, "get_history")?;
        let response = send(req, HISTORY_LOAD_FAILED)
            .await
            .inspect_err(|e| error!(error = %e, "fetching history failed"))?;
        let body: HistoryResponse = read_json(response).await?;
        let history = body.history.unwrap_or_default();
        debug!(entries = history.len(), "history loaded");
        Ok(history)
    }

    #[instrument(skip(self, session, entry), fields(session_id = %session.id(), date = %entry.date))]
    async fn add_history(&self, session: &Session, entry: &DailyEntry) -> Result<Value, ApiError> {
        if !session.has_token() {
            warn!("no token held, history entry not sent");
            return Err(ApiError::MissingToken);
        }
        let req = self.authorized(self.http.post(self.url("/history")), session, "add_history")?;
        let response = send(req.json(&AddHistoryRequest { history_entry: entry }), HISTORY_SAVE_FAILED)
            .await
            .inspect_err(|e| error!(error = %e, "adding history failed"))?;
        info!(meals = entry.meals.len(), total = entry.total_calories, "daily entry saved");
        read_value(response).await
    }

    #[instrument(skip(self, session), fields(session_id = %session.id()))]
    async fn reset_history(&self, session: &Session) -> Result<Value, ApiError> {
        let req = self.authorized(self.http.get(self.url("/wipe")), session, "reset_history")?;
        let response = send(req, HISTORY_WIPE_FAILED)
            .await
            .inspect_err(|e| error!(error = %e, "wiping history failed"))?;
        info!("history wiped");
        read_value(response).await
    }
}

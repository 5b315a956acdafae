use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::meals::DailyEntry;

/// Request body for `POST /login`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Request body for `POST /signup`.
#[derive(Debug, Serialize)]
pub struct SignupRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Request body for `POST /reset-link`.
#[derive(Debug, Serialize)]
pub struct ResetLinkRequest<'a> {
    pub email: &'a str,
}

/// Request body for `POST /history`.
#[derive(Debug, Serialize)]
pub struct AddHistoryRequest<'a> {
    pub history_entry: &'a DailyEntry,
}

/// Response of `GET /history`.
#[derive(Debug, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub history: Option<Vec<DailyEntry>>,
}

/// Response of `POST /login`: the token plus whatever else the backend sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LoginResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// Error payload the backend attaches to rejected requests.
#[derive(Debug, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub error: Option<Value>,
}

impl ErrorPayload {
    pub fn message(self) -> Option<String> {
        match self.error? {
            Value::String(s) if !s.is_empty() => Some(s),
            _ => None,
        }
    }
}

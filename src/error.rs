use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const NETWORK_ERROR: &str = "Network error or server is unreachable";

/// Uniform failure shape surfaced to screens: `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received at all.
    #[error("Network error or server is unreachable")]
    Unreachable(#[source] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("No token found. Please log in.")]
    MissingToken,

    #[error("invalid request: {0}")]
    Request(String),
}

impl ApiError {
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody::new(self.to_string())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unreachable(&self) -> bool {
        matches!(self, ApiError::Unreachable(_))
    }
}

impl From<ApiError> for ErrorBody {
    fn from(e: ApiError) -> Self {
        e.to_body()
    }
}

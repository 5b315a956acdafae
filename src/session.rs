use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use uuid::Uuid;

/// Per-shell session holding the bearer token.
///
/// Lives only in memory: a new shell starts logged out. The id is random and
/// exists purely to correlate log lines of one run.
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    token: Option<SecretString>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            token: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn save_token(&mut self, token: impl Into<String>) {
        self.token = Some(SecretString::from(token.into()));
        debug!(session_id = %self.id, "token stored");
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_ref().map(|t| t.expose_secret())
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn clear_token(&mut self) {
        if self.token.take().is_some() {
            debug!(session_id = %self.id, "token cleared");
        }
    }

    pub fn logout(&mut self) {
        self.clear_token();
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

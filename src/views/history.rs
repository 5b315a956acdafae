use std::sync::Arc;

use tracing::{error, warn};

use super::{Notice, Screen};
use crate::api::CalorieApi;
use crate::meals::DailyEntry;
use crate::session::Session;

pub struct HistoryView {
    api: Arc<dyn CalorieApi>,
    entries: Vec<DailyEntry>,
}

impl HistoryView {
    pub fn new(api: Arc<dyn CalorieApi>) -> Self {
        Self {
            api,
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &[DailyEntry] {
        &self.entries
    }

    /// Without a token the user is sent back to login (`Err`); otherwise
    /// the list is loaded and a failed load comes back as a notice.
    pub async fn mount(&mut self, session: &Session) -> Result<Option<Notice>, Screen> {
        if !session.has_token() {
            warn!(session_id = %session.id(), "history opened without a session");
            return Err(Screen::Login);
        }
        Ok(self.refresh(session).await)
    }

    pub async fn refresh(&mut self, session: &Session) -> Option<Notice> {
        match self.api.get_history(session).await {
            Ok(entries) => {
                self.entries = entries;
                None
            }
            Err(e) => {
                error!(error = %e, "error fetching history");
                Some(Notice::error("Could not load your history."))
            }
        }
    }

    /// Wipes every stored day. The list is emptied only when the backend
    /// confirms.
    pub async fn wipe(&mut self, session: &Session) -> Option<Notice> {
        match self.api.reset_history(session).await {
            Ok(_) => {
                self.entries.clear();
                None
            }
            Err(e) => {
                error!(error = %e, "error clearing history");
                Some(Notice::error("Could not clear your history."))
            }
        }
    }

    pub fn back(&self) -> Screen {
        Screen::Tracker
    }

    pub fn logout(&mut self, session: &mut Session) -> Screen {
        session.logout();
        self.entries.clear();
        Screen::Login
    }
}

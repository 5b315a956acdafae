use std::sync::Arc;

use tracing::debug;

use super::Notice;
use crate::api::CalorieApi;

pub struct ForgotPasswordView {
    api: Arc<dyn CalorieApi>,
    message: Option<Notice>,
}

impl ForgotPasswordView {
    pub fn new(api: Arc<dyn CalorieApi>) -> Self {
        Self { api, message: None }
    }

    pub fn message(&self) -> Option<&Notice> {
        self.message.as_ref()
    }

    /// Requests a reset link. Delivery failures are only logged by the
    /// gateway; the screen reports success either way.
    pub async fn submit(&mut self, email: &str) -> Notice {
        let email = email.trim();
        let notice = if email.is_empty() {
            Notice::error("Please enter your email.")
        } else {
            if let Err(e) = self.api.request_reset_link(email).await {
                debug!(error = %e, "reset link failure not shown to user");
            }
            Notice::success("Reset link sent successfully! Please check your email.")
        };
        self.message = Some(notice.clone());
        notice
    }
}

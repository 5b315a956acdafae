use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{error, info, warn};

use super::{Notice, Screen};
use crate::api::CalorieApi;
use crate::images::ImageUpload;
use crate::meals::{Feedback, FeedbackError, Meal, MealStack};
use crate::session::Session;

const ANALYSIS_ERROR: &str = "Error analyzing the image. Please try again.";

#[derive(Debug, Clone, PartialEq, Default)]
pub enum AnalysisState {
    #[default]
    Empty,
    InFlight,
    Ready(Meal),
    Failed(String),
}

/// Feedback modal contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackForm {
    pub visible: bool,
    pub rating: u8,
    pub comment: String,
}

/// Main screen: pick a photo, analyze it, collect the day's meals.
pub struct TrackerView {
    api: Arc<dyn CalorieApi>,
    selected: Option<ImageUpload>,
    analysis: AnalysisState,
    meals: MealStack,
    feedback: FeedbackForm,
}

impl TrackerView {
    pub fn new(api: Arc<dyn CalorieApi>) -> Self {
        Self {
            api,
            selected: None,
            analysis: AnalysisState::Empty,
            meals: MealStack::new(),
            feedback: FeedbackForm::default(),
        }
    }

    pub fn selected(&self) -> Option<&ImageUpload> {
        self.selected.as_ref()
    }

    pub fn analysis(&self) -> &AnalysisState {
        &self.analysis
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.analysis, AnalysisState::InFlight)
    }

    pub fn meals(&self) -> &MealStack {
        &self.meals
    }

    pub fn feedback(&self) -> &FeedbackForm {
        &self.feedback
    }

    /// Checks the session on arrival; an invalid one sends the user to login.
    pub async fn enter(&mut self, session: &mut Session) -> Option<Screen> {
        if self.api.validate_token(session).await {
            None
        } else {
            warn!(session_id = %session.id(), "session invalid, redirecting to login");
            Some(Screen::Login)
        }
    }

    pub fn select_image(&mut self, image: ImageUpload) -> Notice {
        let notice = Notice::info(format!("Selected: {}", image.file_name));
        self.selected = Some(image);
        notice
    }

    /// Analyzes the selected photo and appends the result to the stack.
    /// A failure leaves the stack untouched.
    pub async fn analyze(&mut self, session: &Session) -> Notice {
        let Some(image) = self.selected.as_ref() else {
            return Notice::error("Please upload an image first.");
        };

        self.analysis = AnalysisState::InFlight;
        match self.api.analyze_image(session, image).await {
            Ok(meal) => {
                self.meals.push(meal.clone());
                let notice = Notice::success(format!(
                    "{} added ({} meals, {} calories today)",
                    meal.display_name(),
                    self.meals.len(),
                    self.meals.total()
                ));
                self.analysis = AnalysisState::Ready(meal);
                notice
            }
            Err(e) => {
                error!(error = %e, "error analyzing image");
                self.analysis = AnalysisState::Failed(ANALYSIS_ERROR.into());
                Notice::error(ANALYSIS_ERROR)
            }
        }
    }

    pub fn delete_meal(&mut self, index: usize) -> Option<Meal> {
        self.meals.remove_at(index)
    }

    pub fn clear_meals(&mut self) {
        self.meals.clear();
    }

    /// Sends the stack as today's entry; it is cleared only once the
    /// backend accepts it.
    pub async fn save_daily(&mut self, session: &Session) -> Notice {
        self.save_daily_at(session, OffsetDateTime::now_utc()).await
    }

    pub async fn save_daily_at(&mut self, session: &Session, at: OffsetDateTime) -> Notice {
        if self.meals.is_empty() {
            return Notice::error("No meals to save for today.");
        }

        let entry = self.meals.to_daily_entry(at);
        match self.api.add_history(session, &entry).await {
            Ok(_) => {
                info!(meals = entry.meals.len(), total = entry.total_calories, "daily consumption saved");
                self.meals.clear();
                Notice::success("Daily consumption saved successfully!")
            }
            Err(e) => {
                error!(error = %e, "error saving daily consumption");
                Notice::error("Failed to save daily consumption.")
            }
        }
    }

    pub fn open_feedback(&mut self) {
        self.feedback.visible = true;
    }

    pub fn close_feedback(&mut self) {
        self.feedback.visible = false;
    }

    pub fn set_rating(&mut self, stars: u8) -> Result<(), FeedbackError> {
        Feedback::new(stars, "")?;
        self.feedback.rating = stars;
        Ok(())
    }

    pub fn set_comment(&mut self, comment: impl Into<String>) {
        self.feedback.comment = comment.into();
    }

    /// Sends the feedback form. The outcome of the request is not shown;
    /// the form resets and the modal closes once a rating is present.
    pub async fn submit_feedback(&mut self, session: &Session) -> Notice {
        let feedback = match Feedback::new(self.feedback.rating, self.feedback.comment.clone()) {
            Ok(f) => f,
            Err(e) => return Notice::error(e.to_string()),
        };

        if let Err(e) = self.api.submit_feedback(session, &feedback).await {
            warn!(error = %e, "feedback not delivered");
        }
        self.feedback = FeedbackForm::default();
        Notice::success("Thank you for your feedback!")
    }

    pub fn logout(&mut self, session: &mut Session) -> Screen {
        session.logout();
        info!(session_id = %session.id(), "logged out");
        Screen::Login
    }
}

//! Screens and their state machines.
//!
//! Each screen owns its transient state and talks to the backend through a
//! shared [`CalorieApi`](crate::api::CalorieApi). Operations that move the
//! user elsewhere return the next [`Screen`].

use std::fmt;

pub mod backdrop;
pub mod forgot;
pub mod history;
pub mod login;
pub mod render;
pub mod signup;
pub mod tracker;

pub use backdrop::Backdrop;
pub use forgot::ForgotPasswordView;
pub use history::HistoryView;
pub use login::LoginView;
pub use signup::{SignupForm, SignupView};
pub use tracker::TrackerView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Signup,
    ForgotPassword,
    Tracker,
    History,
}

impl Screen {
    pub fn label(self) -> &'static str {
        match self {
            Screen::Login => "login",
            Screen::Signup => "signup",
            Screen::ForgotPassword => "forgot",
            Screen::Tracker => "tracker",
            Screen::History => "history",
        }
    }

    /// Screens drawn over the rotating backdrop.
    pub fn has_backdrop(self) -> bool {
        matches!(self, Screen::Tracker | Screen::History)
    }
}

/// Inline message shown under a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Success(String),
    Error(String),
}

impl Notice {
    pub fn info(msg: impl Into<String>) -> Self {
        Notice::Info(msg.into())
    }

    pub fn success(msg: impl Into<String>) -> Self {
        Notice::Success(msg.into())
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Notice::Error(msg.into())
    }

    pub fn text(&self) -> &str {
        match self {
            Notice::Info(s) | Notice::Success(s) | Notice::Error(s) => s,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

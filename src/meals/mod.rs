mod dto;
pub mod stack;

pub use dto::{iso_timestamp, total_calories, Amount, DailyEntry, Feedback, FeedbackError, Meal};
pub use stack::MealStack;

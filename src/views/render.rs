//! Plain-text rendering of meals and history for the shell.

use std::fmt::Write;

use time::macros::format_description;

use super::tracker::AnalysisState;
use crate::meals::{Amount, DailyEntry, Meal, MealStack};

fn amount(value: &Option<Amount>) -> String {
    value
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "-".into())
}

/// `Salad - 200 Calories`
pub fn meal_line(meal: &Meal) -> String {
    format!("{} - {} Calories", meal.display_name(), amount(&meal.calories))
}

/// Full analysis card for the last photo.
pub fn analysis(state: &AnalysisState) -> Option<String> {
    match state {
        AnalysisState::Empty => None,
        AnalysisState::InFlight => Some("Analyzing...".into()),
        AnalysisState::Failed(msg) => Some(msg.clone()),
        AnalysisState::Ready(meal) => Some(format!(
            "AI Analysis Result:\n  Food: {}\n  Calories: {}\n  Carbohydrates: {}\n  Protein: {}\n  Fat: {}",
            meal.display_name(),
            amount(&meal.calories),
            amount(&meal.carbohydrates),
            amount(&meal.protein),
            amount(&meal.fat),
        )),
    }
}

pub fn meal_stack(stack: &MealStack) -> String {
    if stack.is_empty() {
        return "No meals yet. Upload a picture and analyze it.".into();
    }
    let mut out = String::from("Meals\n");
    for (i, meal) in stack.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", i + 1, meal_line(meal));
    }
    let _ = write!(out, "Total Calories: {}", stack.total());
    out
}

/// Long date such as `January 5, 2025`; the raw string when unparsable.
pub fn entry_date(entry: &DailyEntry) -> String {
    let fmt = format_description!("[month repr:long] [day padding:none], [year]");
    entry
        .parsed_date()
        .and_then(|d| d.format(fmt).ok())
        .unwrap_or_else(|| entry.date.clone())
}

pub fn history(entries: &[DailyEntry]) -> String {
    if entries.is_empty() {
        return "No daily records found.".into();
    }
    let mut out = String::new();
    for (i, entry) in entries.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "Date: {}", entry_date(entry));
        let _ = writeln!(out, "Total Calories: {}", entry.total_calories);
        if entry.meals.is_empty() {
            let _ = writeln!(out, "  No meals recorded for this day.");
            continue;
        }
        for meal in &entry.meals {
            let _ = writeln!(
                out,
                "  - {} - {} Calories, {}g Carbs, {}g Protein, {}g Fat",
                meal.display_name(),
                amount(&meal.calories),
                amount(&meal.carbohydrates),
                amount(&meal.protein),
                amount(&meal.fat),
            );
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn meal_line_uses_fallback_name() {
        assert_eq!(meal_line(&Meal::new("Salad", 200.0)), "Salad - 200 Calories");
        assert_eq!(meal_line(&Meal::default()), "Meal - - Calories");
    }

    #[test]
    fn stack_lists_meals_and_total() {
        let mut stack = MealStack::new();
        assert!(meal_stack(&stack).starts_with("No meals yet"));

        stack.push(Meal::new("Salad", 200.0));
        stack.push(Meal::new("Pie", 450.5));
        assert_eq!(
            meal_stack(&stack),
            "Meals\n  1. Salad - 200 Calories\n  2. Pie - 450.5 Calories\nTotal Calories: 650.5"
        );
    }

    #[test]
    fn analysis_card() {
        assert_eq!(analysis(&AnalysisState::Empty), None);
        let card = analysis(&AnalysisState::Ready(Meal::new("Salad", 200.0).with_macros(10.0, 5.0, 3.0)))
            .unwrap();
        assert!(card.contains("Food: Salad"));
        assert!(card.contains("Protein: 5"));
    }

    #[test]
    fn history_formats_dates_and_macros() {
        let entry = DailyEntry::new(
            vec![Meal::new("Salad", 200.0).with_macros(10.0, 5.0, 3.0)],
            datetime!(2025-01-05 12:00 UTC),
        );
        assert_eq!(entry_date(&entry), "January 5, 2025");
        assert_eq!(
            history(&[entry]),
            "Date: January 5, 2025\nTotal Calories: 200\n  - Salad - 200 Calories, 10g Carbs, 5g Protein, 3g Fat"
        );
    }

    #[test]
    fn history_handles_odd_rows() {
        let entry = DailyEntry {
            date: "yesterday".into(),
            meals: vec![],
            total_calories: 0.0,
        };
        assert_eq!(entry_date(&entry), "yesterday");
        assert!(history(&[entry]).contains("No meals recorded for this day."));
        assert_eq!(history(&[]), "No daily records found.");
    }
}

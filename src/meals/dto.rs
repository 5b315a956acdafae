use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;
use time::{macros::format_description, OffsetDateTime, UtcOffset};

/// A macronutrient value as the analysis service returns it.
///
/// The service is loose about types: numbers, numeric strings and strings
/// with units ("250 kcal") all show up, so the raw form is kept for display
/// and sent back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Amount {
    Number(Number),
    Text(String),
    Other(Value),
}

impl Amount {
    /// Numeric value with `parseFloat` leniency: leading numeric prefix, else 0.
    pub fn value(&self) -> f64 {
        match self {
            Amount::Number(n) => n.as_f64().filter(|n| n.is_finite()).unwrap_or(0.0),
            Amount::Text(s) => parse_leading_number(s).unwrap_or(0.0),
            Amount::Other(_) => 0.0,
        }
    }
}

impl From<f64> for Amount {
    fn from(n: f64) -> Self {
        Number::from_f64(n)
            .map(Amount::Number)
            .unwrap_or(Amount::Other(Value::Null))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // 200.0 prints as 200
            Amount::Number(n) if n.is_f64() => match n.as_f64() {
                Some(v) => write!(f, "{}", v),
                None => write!(f, "{}", n),
            },
            Amount::Number(n) => write!(f, "{}", n),
            Amount::Text(s) => f.write_str(s),
            Amount::Other(v) => write!(f, "{}", v),
        }
    }
}

pub(crate) fn parse_leading_number(s: &str) -> Option<f64> {
    lazy_static! {
        static ref NUMBER_RE: Regex =
            Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").unwrap();
    }
    let m = NUMBER_RE.find(s.trim_start())?;
    m.as_str().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// One analyzed meal, as produced by `/analyze-image`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Meal {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carbohydrates: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protein: Option<Amount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fat: Option<Amount>,
    /// Anything else the service sent; echoed back untouched on save.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl Meal {
    pub fn new(name: impl Into<String>, calories: f64) -> Self {
        Self {
            name: Some(name.into()),
            calories: Some(calories.into()),
            ..Default::default()
        }
    }

    pub fn with_macros(mut self, carbohydrates: f64, protein: f64, fat: f64) -> Self {
        self.carbohydrates = Some(carbohydrates.into());
        self.protein = Some(protein.into());
        self.fat = Some(fat.into());
        self
    }

    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => "Meal",
        }
    }

    pub fn calories_value(&self) -> f64 {
        self.calories.as_ref().map(Amount::value).unwrap_or(0.0)
    }
}

/// Sum of calories, missing or non-numeric values counting as zero.
pub fn total_calories(meals: &[Meal]) -> f64 {
    meals.iter().map(Meal::calories_value).sum()
}

/// One persisted day of meals.
///
/// Rows read back from the backend may be sparse or loosely typed; missing
/// fields default and a non-numeric total counts as zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyEntry {
    #[serde(default)]
    pub date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub meals: Vec<Meal>,
    #[serde(rename = "totalCalories", default, deserialize_with = "lenient_number")]
    pub total_calories: f64,
}

fn null_as_empty<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<Meal>, D::Error> {
    Ok(Option::<Vec<Meal>>::deserialize(de)?.unwrap_or_default())
}

fn lenient_number<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
    Ok(Amount::deserialize(de)?.value())
}

impl DailyEntry {
    /// Builds the entry; the total is fixed here and never recomputed.
    pub fn new(meals: Vec<Meal>, at: OffsetDateTime) -> Self {
        let total_calories = total_calories(&meals);
        Self {
            date: iso_timestamp(at),
            meals,
            total_calories,
        }
    }

    pub fn parsed_date(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::parse(&self.date, &time::format_description::well_known::Rfc3339).ok()
    }
}

/// `YYYY-MM-DDTHH:MM:SS.mmmZ`, always UTC.
pub fn iso_timestamp(at: OffsetDateTime) -> String {
    let fmt = format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    );
    at.to_offset(UtcOffset::UTC)
        .format(fmt)
        .unwrap_or_else(|_| at.unix_timestamp().to_string())
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeedbackError {
    #[error("Please select a rating before submitting.")]
    MissingRating,
    #[error("rating must be between 1 and 5, got {0}")]
    OutOfRange(u8),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub stars: u8,
    pub feedback: String,
}

impl Feedback {
    pub fn new(stars: u8, feedback: impl Into<String>) -> Result<Self, FeedbackError> {
        match stars {
            0 => Err(FeedbackError::MissingRating),
            1..=5 => Ok(Self {
                stars,
                feedback: feedback.into(),
            }),
            n => Err(FeedbackError::OutOfRange(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn amount_accepts_numbers_and_strings() {
        let meal: Meal = serde_json::from_value(json!({
            "name": "Pasta",
            "calories": "450 kcal",
            "carbohydrates": 60,
            "protein": "12.5",
            "fat": null
        }))
        .unwrap();
        assert_eq!(meal.calories_value(), 450.0);
        assert_eq!(meal.carbohydrates.as_ref().unwrap().value(), 60.0);
        assert_eq!(meal.protein.as_ref().unwrap().value(), 12.5);
        assert_eq!(meal.fat, None);
    }

    #[test]
    fn non_numeric_calories_count_as_zero() {
        for raw in [json!("unknown"), json!(true), json!({"kcal": 5}), json!("")] {
            let meal: Meal = serde_json::from_value(json!({ "name": "x", "calories": raw })).unwrap();
            assert_eq!(meal.calories_value(), 0.0);
        }
        assert_eq!(Meal::default().calories_value(), 0.0);
    }

    #[test]
    fn leading_number_follows_parse_float() {
        assert_eq!(parse_leading_number("  42abc"), Some(42.0));
        assert_eq!(parse_leading_number("-3.5e2 units"), Some(-350.0));
        assert_eq!(parse_leading_number(".5"), Some(0.5));
        assert_eq!(parse_leading_number("abc"), None);
    }

    #[test]
    fn unknown_fields_survive_a_save() {
        let meal: Meal = serde_json::from_value(json!({
            "name": "Soup",
            "calories": 120,
            "confidence": 0.9
        }))
        .unwrap();
        let back = serde_json::to_value(&meal).unwrap();
        assert_eq!(back["confidence"], json!(0.9));
        assert!(back.get("fat").is_none());
    }

    #[test]
    fn display_name_falls_back_to_meal() {
        assert_eq!(Meal::default().display_name(), "Meal");
        assert_eq!(Meal::new("", 1.0).display_name(), "Meal");
        assert_eq!(Meal::new("Salad", 1.0).display_name(), "Salad");
    }

    #[test]
    fn daily_entry_fixes_total_and_iso_date() {
        let at = datetime!(2025-03-04 10:20:30.123456 +02:00);
        let meals = vec![Meal::new("a", 250.0), Meal::new("b", 400.0), Meal::new("c", 0.0)];
        let entry = DailyEntry::new(meals, at);
        assert_eq!(entry.total_calories, 650.0);
        assert_eq!(entry.date, "2025-03-04T08:20:30.123Z");
        assert_eq!(entry.parsed_date().unwrap().unix_timestamp(), at.unix_timestamp());

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["totalCalories"], json!(650.0));
        assert_eq!(json["meals"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn daily_entry_tolerates_sparse_history_rows() {
        let entry: DailyEntry =
            serde_json::from_value(json!({ "date": "2025-01-05T00:00:00.000Z", "_id": "abc" }))
                .unwrap();
        assert!(entry.meals.is_empty());
        assert_eq!(entry.total_calories, 0.0);
    }

    #[test]
    fn daily_entry_reads_loose_rows() {
        let entry: DailyEntry = serde_json::from_value(json!({
            "meals": null,
            "totalCalories": "200",
            "meal": "Salad"
        }))
        .unwrap();
        assert_eq!(entry.date, "");
        assert!(entry.meals.is_empty());
        assert_eq!(entry.total_calories, 200.0);

        let entry: DailyEntry =
            serde_json::from_value(json!({ "date": "x", "totalCalories": "lots" })).unwrap();
        assert_eq!(entry.total_calories, 0.0);
    }

    #[test]
    fn integer_macros_are_sent_back_as_received() {
        let meal: Meal = serde_json::from_value(json!({
            "name": "Salad",
            "calories": 200,
            "protein": 4.5,
            "fat": "3g"
        }))
        .unwrap();
        let back = serde_json::to_string(&meal).unwrap();
        assert!(back.contains(r#""calories":200,"#));
        assert!(back.contains(r#""protein":4.5"#));
        assert!(back.contains(r#""fat":"3g""#));
        assert_eq!(meal.calories.as_ref().unwrap().to_string(), "200");
        assert_eq!(Amount::from(200.0).to_string(), "200");
    }

    #[test]
    fn feedback_requires_rating_in_range() {
        assert_eq!(Feedback::new(0, "meh"), Err(FeedbackError::MissingRating));
        assert_eq!(Feedback::new(6, "wow"), Err(FeedbackError::OutOfRange(6)));
        let fb = Feedback::new(5, "Great app").unwrap();
        assert_eq!(
            serde_json::to_value(&fb).unwrap(),
            json!({ "stars": 5, "feedback": "Great app" })
        );
    }
}

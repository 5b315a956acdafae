use time::OffsetDateTime;
use tracing::debug;

use super::dto::{total_calories, DailyEntry, Meal};

/// Meals analyzed during this session and not yet saved as a day.
///
/// Insertion order is display order. Only the shell loop mutates it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MealStack {
    meals: Vec<Meal>,
}

impl MealStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, meal: Meal) {
        self.meals.push(meal);
    }

    /// Removes the meal at `index`. Out of range is a no-op.
    pub fn remove_at(&mut self, index: usize) -> Option<Meal> {
        if index < self.meals.len() {
            Some(self.meals.remove(index))
        } else {
            debug!(index, len = self.meals.len(), "remove_at out of range, ignored");
            None
        }
    }

    pub fn clear(&mut self) {
        self.meals.clear();
    }

    pub fn total(&self) -> f64 {
        total_calories(&self.meals)
    }

    pub fn len(&self) -> usize {
        self.meals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meals.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Meal> {
        self.meals.iter()
    }

    pub fn as_slice(&self) -> &[Meal] {
        &self.meals
    }

    /// Snapshot of the current contents as a day entry stamped `at`.
    pub fn to_daily_entry(&self, at: OffsetDateTime) -> DailyEntry {
        DailyEntry::new(self.meals.clone(), at)
    }
}

impl<'a> IntoIterator for &'a MealStack {
    type Item = &'a Meal;
    type IntoIter = std::slice::Iter<'a, Meal>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{macros::format_description, Date, Duration};

use crate::recipes::dto::{RecipeId, RecipeRef};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MealPlanError {
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("day {day} is outside the week starting {week}")]
    OutsideWeek { day: Date, week: Week },

    #[error("unknown meal slot {0:?}")]
    UnknownSlot(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MealSlot {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealSlot {
    pub const ALL: [MealSlot; 4] = [
        MealSlot::Breakfast,
        MealSlot::Lunch,
        MealSlot::Dinner,
        MealSlot::Snack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealSlot::Breakfast => "Breakfast",
            MealSlot::Lunch => "Lunch",
            MealSlot::Dinner => "Dinner",
            MealSlot::Snack => "Snack",
        }
    }

    pub fn parse(s: &str) -> Result<Self, MealPlanError> {
        Self::ALL
            .into_iter()
            .find(|slot| slot.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| MealPlanError::UnknownSlot(s.to_string()))
    }
}

pub fn parse_day(s: &str) -> Result<Date, MealPlanError> {
    Date::parse(s, format_description!("[year]-[month]-[day]"))
        .map_err(|_| MealPlanError::InvalidDate(s.to_string()))
}

/// A calendar week, Monday through Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Week(Date);

impl Week {
    pub fn containing(day: Date) -> Self {
        let offset = day.weekday().number_days_from_monday();
        Week(day - Duration::days(i64::from(offset)))
    }

    /// Accepts any day of the week, not only its Monday.
    pub fn parse(s: &str) -> Result<Self, MealPlanError> {
        parse_day(s).map(Self::containing)
    }

    pub fn start(&self) -> Date {
        self.0
    }

    pub fn contains(&self, day: Date) -> bool {
        Week::containing(day) == *self
    }

    /// Storage key: ISO date of the Monday.
    pub fn key(&self) -> String {
        self.0.to_string()
    }
}

impl fmt::Display for Week {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub type DayPlan = BTreeMap<MealSlot, Vec<RecipeRef>>;

/// Recipes planned per day (`YYYY-MM-DD`) and meal slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MealPlan {
    days: BTreeMap<String, DayPlan>,
}

impl MealPlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.days
            .values()
            .all(|day| day.values().all(|recipes| recipes.is_empty()))
    }

    pub fn day(&self, day: Date) -> Option<&DayPlan> {
        self.days.get(&day.to_string())
    }

    pub fn slot(&self, day: Date, slot: MealSlot) -> &[RecipeRef] {
        self.day(day)
            .and_then(|d| d.get(&slot))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every distinct recipe referenced anywhere in the plan.
    pub fn recipe_ids(&self) -> HashSet<RecipeId> {
        self.days
            .values()
            .flat_map(|day| day.values())
            .flatten()
            .map(|recipe| recipe.id.clone())
            .collect()
    }

    /// Returns false when the slot already holds a recipe with the same id.
    pub fn add_recipe(&mut self, day: Date, slot: MealSlot, recipe: RecipeRef) -> bool {
        let recipes = self
            .days
            .entry(day.to_string())
            .or_default()
            .entry(slot)
            .or_default();
        if recipes.iter().any(|r| r.id == recipe.id) {
            return false;
        }
        recipes.push(recipe);
        true
    }

    pub fn remove_recipe(&mut self, day: Date, slot: MealSlot, id: &RecipeId) -> bool {
        let key = day.to_string();
        let Some(day_plan) = self.days.get_mut(&key) else {
            return false;
        };
        let Some(recipes) = day_plan.get_mut(&slot) else {
            return false;
        };
        let before = recipes.len();
        recipes.retain(|r| &r.id != id);
        let removed = recipes.len() != before;

        if recipes.is_empty() {
            day_plan.remove(&slot);
        }
        if day_plan.is_empty() {
            self.days.remove(&key);
        }
        removed
    }

    /// Rejects day keys that are not dates inside `week`.
    pub fn validate_for(&self, week: Week) -> Result<(), MealPlanError> {
        for key in self.days.keys() {
            let day = parse_day(key)?;
            if !week.contains(day) {
                return Err(MealPlanError::OutsideWeek { day, week });
            }
        }
        Ok(())
    }
}

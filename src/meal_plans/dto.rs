use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::model::{MealPlan, MealSlot, Week};
use super::repo::StoredMealPlan;
use crate::recipes::dto::RecipeRef;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MealPlanResponse {
    pub week_start: String,
    pub meals: MealPlan,
    #[serde(with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub updated_at: Option<OffsetDateTime>,
}

impl MealPlanResponse {
    /// Response for a week that has never been saved.
    pub fn empty(week: Week) -> Self {
        Self {
            week_start: week.key(),
            meals: MealPlan::new(),
            created_at: None,
            updated_at: None,
        }
    }
}

impl From<StoredMealPlan> for MealPlanResponse {
    fn from(p: StoredMealPlan) -> Self {
        Self {
            week_start: p.week.key(),
            meals: p.meals,
            created_at: Some(p.created_at),
            updated_at: Some(p.updated_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SaveMealPlanRequest {
    pub meals: MealPlan,
}

#[derive(Debug, Deserialize)]
pub struct AddRecipeRequest {
    pub day: String,
    pub slot: MealSlot,
    pub recipe: RecipeRef,
}

#[derive(Debug, Serialize)]
pub struct MealPlanListResponse {
    pub plans: Vec<MealPlanResponse>,
}

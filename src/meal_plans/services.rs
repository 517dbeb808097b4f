use time::Date;
use tracing::info;
use uuid::Uuid;

use super::dto::MealPlanResponse;
use super::model::{MealPlan, MealPlanError, MealSlot, Week};
use super::repo::{EditOutcome, PlanEdit};
use crate::recipes::dto::{RecipeId, RecipeRef};
use crate::state::AppState;

#[derive(Debug, thiserror::Error)]
pub enum PlanServiceError {
    #[error(transparent)]
    Invalid(#[from] MealPlanError),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

pub async fn load_plan(
    st: &AppState,
    user_id: Uuid,
    week: Week,
) -> Result<MealPlanResponse, PlanServiceError> {
    let stored = st.plans.get_meal_plan(user_id, week).await?;
    Ok(stored
        .map(MealPlanResponse::from)
        .unwrap_or_else(|| MealPlanResponse::empty(week)))
}

/// Saves the plan and invalidates any shopping list built from the old one.
pub async fn save_plan(
    st: &AppState,
    user_id: Uuid,
    week: Week,
    meals: MealPlan,
) -> Result<MealPlanResponse, PlanServiceError> {
    meals.validate_for(week)?;
    let stored = st.plans.save_meal_plan(user_id, week, &meals).await?;
    st.shopping.close(user_id);
    info!(%user_id, %week, recipes = meals.recipe_ids().len(), "meal plan saved");
    Ok(stored.into())
}

pub async fn add_recipe(
    st: &AppState,
    user_id: Uuid,
    week: Week,
    day: Date,
    slot: MealSlot,
    recipe: RecipeRef,
) -> Result<MealPlanResponse, PlanServiceError> {
    ensure_in_week(week, day)?;
    let recipe_id = recipe.id.clone();
    let edit: PlanEdit =
        Box::new(move |meals: &mut MealPlan| meals.add_recipe(day, slot, recipe));
    let outcome = st.plans.edit_meal_plan(user_id, week, edit).await?;
    if let EditOutcome::Unchanged(Some(current)) = &outcome {
        info!(
            %user_id,
            %day,
            slot = slot.as_str(),
            %recipe_id,
            planned = current.meals.slot(day, slot).len(),
            "recipe already planned in slot"
        );
    }
    Ok(finish_edit(st, user_id, week, outcome))
}

pub async fn remove_recipe(
    st: &AppState,
    user_id: Uuid,
    week: Week,
    day: Date,
    slot: MealSlot,
    recipe_id: &RecipeId,
) -> Result<MealPlanResponse, PlanServiceError> {
    ensure_in_week(week, day)?;
    let target = recipe_id.clone();
    let edit: PlanEdit =
        Box::new(move |meals: &mut MealPlan| meals.remove_recipe(day, slot, &target));
    let outcome = st.plans.edit_meal_plan(user_id, week, edit).await?;
    Ok(finish_edit(st, user_id, week, outcome))
}

/// Removes the week's plan and the shopping list built from it.
pub async fn delete_plan(st: &AppState, user_id: Uuid, week: Week) -> Result<(), PlanServiceError> {
    let existed = st.plans.delete_meal_plan(user_id, week).await?;
    st.shopping.close(user_id);
    info!(%user_id, %week, existed, "meal plan deleted");
    Ok(())
}

pub async fn list_plans(
    st: &AppState,
    user_id: Uuid,
) -> Result<Vec<MealPlanResponse>, PlanServiceError> {
    let plans = st.plans.list_meal_plans(user_id).await?;
    Ok(plans.into_iter().map(MealPlanResponse::from).collect())
}

fn finish_edit(st: &AppState, user_id: Uuid, week: Week, outcome: EditOutcome) -> MealPlanResponse {
    match outcome {
        EditOutcome::Saved(stored) => {
            st.shopping.close(user_id);
            info!(%user_id, %week, recipes = stored.meals.recipe_ids().len(), "meal plan edited");
            stored.into()
        }
        EditOutcome::Unchanged(Some(stored)) => stored.into(),
        EditOutcome::Unchanged(None) => MealPlanResponse::empty(week),
    }
}

fn ensure_in_week(week: Week, day: Date) -> Result<(), MealPlanError> {
    if week.contains(day) {
        Ok(())
    } else {
        Err(MealPlanError::OutsideWeek { day, week })
    }
}

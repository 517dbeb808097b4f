use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use tracing::{error, instrument, warn};

use super::dto::{AddRecipeRequest, MealPlanListResponse, MealPlanResponse, SaveMealPlanRequest};
use super::model::{parse_day, MealSlot, Week};
use super::services::{self, PlanServiceError};
use crate::auth::AuthUser;
use crate::recipes::dto::RecipeId;
use crate::state::AppState;

pub fn meal_plan_routes() -> Router<AppState> {
    Router::new()
        .route("/meal-plans", get(list_plans))
        .route(
            "/meal-plans/:week",
            get(get_plan).put(put_plan).delete(delete_plan),
        )
        .route("/meal-plans/:week/recipes", post(add_recipe))
        .route("/meal-plans/:week/:day/:slot/:recipe_id", delete(remove_recipe))
}

#[instrument(skip(state))]
pub async fn list_plans(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<MealPlanListResponse>, (StatusCode, String)> {
    let plans = services::list_plans(&state, user_id)
        .await
        .map_err(plan_error)?;
    Ok(Json(MealPlanListResponse { plans }))
}

#[instrument(skip(state))]
pub async fn get_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(week): Path<String>,
) -> Result<Json<MealPlanResponse>, (StatusCode, String)> {
    let week = Week::parse(&week).map_err(bad_request)?;
    services::load_plan(&state, user_id, week)
        .await
        .map(Json)
        .map_err(plan_error)
}

#[instrument(skip(state, body))]
pub async fn put_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(week): Path<String>,
    Json(body): Json<SaveMealPlanRequest>,
) -> Result<Json<MealPlanResponse>, (StatusCode, String)> {
    let week = Week::parse(&week).map_err(bad_request)?;
    services::save_plan(&state, user_id, week, body.meals)
        .await
        .map(Json)
        .map_err(plan_error)
}

#[instrument(skip(state))]
pub async fn delete_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(week): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let week = Week::parse(&week).map_err(bad_request)?;
    services::delete_plan(&state, user_id, week)
        .await
        .map_err(plan_error)?;
    Ok(StatusCode::NO_CONTENT)
}

#[instrument(skip(state, body))]
pub async fn add_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(week): Path<String>,
    Json(body): Json<AddRecipeRequest>,
) -> Result<Json<MealPlanResponse>, (StatusCode, String)> {
    let week = Week::parse(&week).map_err(bad_request)?;
    let day = parse_day(&body.day).map_err(bad_request)?;
    services::add_recipe(&state, user_id, week, day, body.slot, body.recipe)
        .await
        .map(Json)
        .map_err(plan_error)
}

#[instrument(skip(state))]
pub async fn remove_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path((week, day, slot, recipe_id)): Path<(String, String, String, String)>,
) -> Result<Json<MealPlanResponse>, (StatusCode, String)> {
    let week = Week::parse(&week).map_err(bad_request)?;
    let day = parse_day(&day).map_err(bad_request)?;
    let slot = MealSlot::parse(&slot).map_err(bad_request)?;
    let recipe_id = RecipeId::from(recipe_id.as_str());
    services::remove_recipe(&state, user_id, week, day, slot, &recipe_id)
        .await
        .map(Json)
        .map_err(plan_error)
}

fn bad_request<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    warn!(error = %e, "rejected meal plan request");
    (StatusCode::BAD_REQUEST, e.to_string())
}

fn plan_error(e: PlanServiceError) -> (StatusCode, String) {
    match e {
        PlanServiceError::Invalid(inner) => bad_request(inner),
        PlanServiceError::Store(inner) => {
            error!(error = %inner, "meal plan store failed");
            (StatusCode::INTERNAL_SERVER_ERROR, inner.to_string())
        }
    }
}

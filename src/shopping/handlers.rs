use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument};

use super::dto::{GenerateRequest, ShoppingListView};
use super::services::run_generation;
use super::session::SessionError;
use crate::auth::AuthUser;
use crate::meal_plans::model::Week;
use crate::state::AppState;

pub fn shopping_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/shopping-list",
            get(current_list).post(generate_from_body).delete(close_list),
        )
        .route("/shopping-list/week/:week", post(generate_for_week))
        .route("/shopping-list/items/:id/toggle", post(toggle_item))
        .route("/shopping-list/clear", post(clear_checked))
}

#[instrument(skip(state, body))]
pub async fn generate_from_body(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(body): Json<GenerateRequest>,
) -> Json<ShoppingListView> {
    let view = run_generation(&state.shopping, state.recipes.clone(), user_id, &body.meals).await;
    Json(view)
}

#[instrument(skip(state))]
pub async fn generate_for_week(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(week): Path<String>,
) -> Result<Json<ShoppingListView>, (StatusCode, String)> {
    let week = Week::parse(&week).map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let plan = state
        .plans
        .get_meal_plan(user_id, week)
        .await
        .map_err(|e| {
            error!(error = %e, %user_id, %week, "load meal plan failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?
        .map(|stored| stored.meals)
        .unwrap_or_default();

    let view = run_generation(&state.shopping, state.recipes.clone(), user_id, &plan).await;
    Ok(Json(view))
}

#[instrument(skip(state))]
pub async fn current_list(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Json<ShoppingListView> {
    Json(state.shopping.view(user_id))
}

#[instrument(skip(state))]
pub async fn toggle_item(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ShoppingListView>, (StatusCode, String)> {
    state
        .shopping
        .toggle(user_id, id)
        .map(Json)
        .map_err(session_error)
}

#[instrument(skip(state))]
pub async fn clear_checked(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ShoppingListView>, (StatusCode, String)> {
    state
        .shopping
        .clear_checked(user_id)
        .map(Json)
        .map_err(session_error)
}

#[instrument(skip(state))]
pub async fn close_list(State(state): State<AppState>, AuthUser(user_id): AuthUser) -> StatusCode {
    state.shopping.close(user_id);
    info!(%user_id, "shopping list closed");
    StatusCode::NO_CONTENT
}

fn session_error(e: SessionError) -> (StatusCode, String) {
    let status = match e {
        SessionError::NoList => StatusCode::CONFLICT,
        SessionError::UnknownItem(_) => StatusCode::NOT_FOUND,
    };
    (status, e.to_string())
}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{instrument, warn};

use super::client::RecipeApiError;
use super::dto::{IngredientSearch, Recipe, RecipeId, RecipeRef, RecipeSearch};
use crate::state::AppState;

pub fn recipe_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes/search", get(search_recipes))
        .route("/recipes/by-ingredients", get(search_by_ingredients))
        .route("/recipes/:id", get(get_recipe))
        .route("/recipes/:id/similar", get(similar_recipes))
}

#[instrument(skip(state))]
pub async fn search_recipes(
    State(state): State<AppState>,
    Query(search): Query<RecipeSearch>,
) -> Result<Json<Vec<RecipeRef>>, (StatusCode, String)> {
    let results = state.recipes.search(&search).await.map_err(upstream)?;
    Ok(Json(results))
}

#[instrument(skip(state))]
pub async fn search_by_ingredients(
    State(state): State<AppState>,
    Query(search): Query<IngredientSearch>,
) -> Result<Json<Vec<RecipeRef>>, (StatusCode, String)> {
    if search.names().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "no ingredients given".into()));
    }
    let results = state
        .recipes
        .search_by_ingredients(&search)
        .await
        .map_err(upstream)?;
    Ok(Json(results))
}

#[instrument(skip(state))]
pub async fn similar_recipes(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<RecipeRef>>, (StatusCode, String)> {
    let id = RecipeId::from(id.as_str());
    let results = state.recipes.similar(&id).await.map_err(upstream)?;
    Ok(Json(results))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Recipe>, (StatusCode, String)> {
    let id = RecipeId::from(id.as_str());
    let recipe = state.recipes.get_recipe(&id).await.map_err(upstream)?;
    Ok(Json(recipe))
}

pub(crate) fn upstream(e: RecipeApiError) -> (StatusCode, String) {
    match e {
        RecipeApiError::NotFound(_) => (StatusCode::NOT_FOUND, e.to_string()),
        _ => {
            warn!(error = %e, "recipe service error");
            (StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

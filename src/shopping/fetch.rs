use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::recipes::client::{RecipeApiError, RecipeSource};
use crate::recipes::dto::{Recipe, RecipeId};

#[derive(Debug, Error)]
pub enum ShoppingListError {
    #[error("failed to fetch recipe {recipe_id}: {source}")]
    Fetch {
        recipe_id: RecipeId,
        #[source]
        source: RecipeApiError,
    },

    #[error("recipe fetch task failed: {0}")]
    Task(String),
}

/// Fetches every recipe concurrently; all or nothing.
///
/// The first failure to settle is returned and the remaining fetches are
/// aborted. Successful recipes come back in settle order.
pub async fn fetch_recipes(
    source: Arc<dyn RecipeSource>,
    ids: HashSet<RecipeId>,
) -> Result<Vec<Recipe>, ShoppingListError> {
    let mut tasks = JoinSet::new();
    for id in ids {
        let source = source.clone();
        tasks.spawn(async move {
            let result = source.get_recipe(&id).await;
            (id, result)
        });
    }

    let mut recipes = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        let (recipe_id, result) = joined.map_err(|e| ShoppingListError::Task(e.to_string()))?;
        match result {
            Ok(recipe) => {
                debug!(%recipe_id, "recipe ready");
                recipes.push(recipe);
            }
            Err(source) => {
                warn!(%recipe_id, error = %source, "recipe fetch failed, aborting generation");
                tasks.abort_all();
                return Err(ShoppingListError::Fetch { recipe_id, source });
            }
        }
    }
    Ok(recipes)
}

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, instrument};
use uuid::Uuid;

use super::classify::{categorize, CategoryGroup};
use super::consolidate::{consolidate, ConsolidatedIngredient};
use super::dto::ShoppingListView;
use super::fetch::{fetch_recipes, ShoppingListError};
use super::session::ShoppingSessions;
use crate::meal_plans::model::MealPlan;
use crate::recipes::client::RecipeSource;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShoppingList {
    pub categories: Vec<CategoryGroup>,
    pub ingredients: Vec<ConsolidatedIngredient>,
}

impl ShoppingList {
    pub fn is_empty(&self) -> bool {
        self.ingredients.is_empty()
    }

    pub fn contains(&self, ingredient_id: i64) -> bool {
        self.ingredients.iter().any(|i| i.id == ingredient_id)
    }
}

/// Builds the categorised shopping list for every recipe in `plan`.
pub async fn generate_shopping_list(
    source: Arc<dyn RecipeSource>,
    plan: &MealPlan,
) -> Result<ShoppingList, ShoppingListError> {
    let ids = plan.recipe_ids();
    if ids.is_empty() {
        return Ok(ShoppingList::default());
    }

    let recipes = fetch_recipes(source, ids).await?;
    let ingredients = consolidate(recipes.iter().flat_map(|r| r.ingredients()));
    let categories = categorize(&ingredients);
    Ok(ShoppingList {
        categories,
        ingredients,
    })
}

/// Runs one generation for `user_id` and publishes it unless a newer
/// generation or a close superseded it meanwhile. If the returned future
/// is dropped early the generation is reported as failed.
#[instrument(skip(sessions, source, plan))]
pub async fn run_generation(
    sessions: &ShoppingSessions,
    source: Arc<dyn RecipeSource>,
    user_id: Uuid,
    plan: &MealPlan,
) -> ShoppingListView {
    let generation = sessions.start(user_id);
    let epoch = generation.token().epoch();
    info!(
        epoch,
        recipes = plan.recipe_ids().len(),
        "shopping list generation started"
    );

    let outcome = generate_shopping_list(source, plan).await;
    if let Err(e) = &outcome {
        error!(error = %e, epoch, "shopping list generation failed");
    }
    generation.finish(outcome);
    sessions.view(user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meal_plans::model::MealSlot;
    use crate::recipes::dto::RecipeId;
    use crate::recipes::mock::{line, recipe, recipe_ref, ScriptedRecipeSource};
    use crate::shopping::classify::Category;
    use crate::shopping::dto::ViewStatus;
    use time::macros::date;

    fn plan_with(ids: &[i64]) -> MealPlan {
        let mut plan = MealPlan::new();
        for (n, id) in ids.iter().enumerate() {
            let day = date!(2024 - 05 - 13) + time::Duration::days(n as i64 % 7);
            plan.add_recipe(day, MealSlot::Dinner, recipe_ref(*id, "planned"));
        }
        plan
    }

    #[tokio::test]
    async fn empty_plan_gives_empty_list_without_fetching() {
        let source = Arc::new(ScriptedRecipeSource::new());
        let list = generate_shopping_list(source.clone(), &MealPlan::new())
            .await
            .unwrap();
        assert!(list.is_empty());
        assert!(list.categories.is_empty());
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn repeated_recipe_is_fetched_once() {
        let source = Arc::new(
            ScriptedRecipeSource::new().with_recipe(recipe(1, "Soup", vec![line(1, "onion", 1.0, "")])),
        );
        let mut plan = MealPlan::new();
        plan.add_recipe(date!(2024 - 05 - 13), MealSlot::Lunch, recipe_ref(1, "Soup"));
        plan.add_recipe(date!(2024 - 05 - 15), MealSlot::Dinner, recipe_ref(1, "Soup"));

        let list = generate_shopping_list(source.clone(), &plan).await.unwrap();
        assert_eq!(source.calls(), vec![RecipeId::Numeric(1)]);
        assert_eq!(list.ingredients.len(), 1);
    }

    #[tokio::test]
    async fn pipeline_merges_and_groups() {
        let source = Arc::new(
            ScriptedRecipeSource::new()
                .with_recipe(recipe(
                    1,
                    "Pasta",
                    vec![
                        line(20420, "pasta", 8.0, "oz"),
                        line(11529, "Tomato Sauce", 1.0, "can"),
                    ],
                ))
                .with_recipe(recipe(
                    2,
                    "Salad",
                    vec![line(11529, "tomato", 2.0, ""), line(4053, "olive oil", 2.0, "tbsp")],
                ))
                .with_recipe({
                    let mut r = recipe(3, "Water", vec![]);
                    r.extended_ingredients = None;
                    r
                }),
        );

        let list = generate_shopping_list(source, &plan_with(&[1, 2, 3])).await.unwrap();

        // 11529 appears in both recipes; whichever settled first is kept.
        let mut ids: Vec<i64> = list.ingredients.iter().map(|i| i.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![4053, 11529, 20420]);

        let cats: Vec<Category> = list.categories.iter().map(|g| g.category).collect();
        assert_eq!(cats, vec![Category::Produce, Category::Grains, Category::Oils]);
    }

    #[tokio::test]
    async fn any_fetch_failure_fails_generation() {
        let source = Arc::new(
            ScriptedRecipeSource::new()
                .with_recipe(recipe(1, "A", vec![line(1, "rice", 1.0, "cup")]))
                .with_recipe(recipe(2, "B", vec![line(2, "beans", 1.0, "can")]))
                .with_recipe(recipe(3, "C", vec![line(3, "milk", 1.0, "cup")]))
                .failing(4),
        );
        let err = generate_shopping_list(source, &plan_with(&[1, 2, 3, 4]))
            .await
            .unwrap_err();
        assert!(matches!(err, ShoppingListError::Fetch { .. }));
    }

    #[tokio::test]
    async fn failed_generation_shows_no_partial_list() {
        let sessions = ShoppingSessions::default();
        let user = Uuid::new_v4();
        let source = Arc::new(
            ScriptedRecipeSource::new()
                .with_recipe(recipe(1, "A", vec![line(1, "rice", 1.0, "cup")]))
                .with_recipe(recipe(2, "B", vec![line(2, "beans", 1.0, "can")]))
                .with_recipe(recipe(3, "C", vec![line(3, "milk", 1.0, "cup")]))
                .failing(4),
        );

        let view = run_generation(&sessions, source, user, &plan_with(&[1, 2, 3, 4])).await;
        assert_eq!(view.status, ViewStatus::Failed);
        assert!(view.ingredients.is_empty());
        assert!(view.categories.is_empty());
        assert_eq!(
            view.message.as_deref(),
            Some("Failed to generate shopping list. Please try again.")
        );
    }

    async fn wait_for_first_call(source: &ScriptedRecipeSource) {
        for _ in 0..100 {
            if !source.calls().is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(!source.calls().is_empty());
    }

    #[tokio::test]
    async fn aborted_generation_reports_failure() {
        let mut source = ScriptedRecipeSource::new()
            .with_recipe(recipe(1, "Stew", vec![line(100, "beef", 1.0, "lb")]));
        let _gate = source.gated(1);
        let source: Arc<ScriptedRecipeSource> = Arc::new(source);
        let sessions = ShoppingSessions::default();
        let user = Uuid::new_v4();

        let handle = {
            let sessions = sessions.clone();
            let source = source.clone();
            tokio::spawn(async move {
                run_generation(&sessions, source, user, &plan_with(&[1])).await
            })
        };
        wait_for_first_call(&source).await;
        assert_eq!(sessions.view(user).status, ViewStatus::Pending);

        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());

        let view = sessions.view(user);
        assert_eq!(view.status, ViewStatus::Failed);
        assert!(view.ingredients.is_empty());
    }

    #[tokio::test]
    async fn stale_generation_does_not_overwrite_newer_one() {
        let mut source = ScriptedRecipeSource::new()
            .with_recipe(recipe(1, "Plan A", vec![line(100, "chicken", 1.0, "lb")]))
            .with_recipe(recipe(2, "Plan B", vec![line(200, "salmon", 1.0, "lb")]));
        let gate_a = source.gated(1);
        let source: Arc<ScriptedRecipeSource> = Arc::new(source);
        let sessions = ShoppingSessions::default();
        let user = Uuid::new_v4();

        let slow = {
            let sessions = sessions.clone();
            let source = source.clone();
            tokio::spawn(async move {
                run_generation(&sessions, source, user, &plan_with(&[1])).await
            })
        };
        wait_for_first_call(&source).await;
        assert_eq!(source.calls(), vec![RecipeId::Numeric(1)]);

        let fresh = run_generation(&sessions, source.clone(), user, &plan_with(&[2])).await;
        assert_eq!(fresh.status, ViewStatus::Ready);

        gate_a.notify_one();
        slow.await.unwrap();

        let shown = sessions.view(user);
        let ids: Vec<i64> = shown.ingredients.iter().map(|i| i.ingredient.id).collect();
        assert_eq!(ids, vec![200]);
    }
}

//! Scripted recipe source for tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::client::{RecipeApiError, RecipeSource};
use super::dto::{IngredientLine, IngredientSearch, Recipe, RecipeId, RecipeRef, RecipeSearch};

#[derive(Default)]
pub struct ScriptedRecipeSource {
    recipes: HashMap<RecipeId, Recipe>,
    failures: HashSet<RecipeId>,
    gates: HashMap<RecipeId, Arc<Notify>>,
    calls: Mutex<Vec<RecipeId>>,
}

impl ScriptedRecipeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_recipe(mut self, recipe: Recipe) -> Self {
        self.recipes.insert(recipe.id.clone(), recipe);
        self
    }

    pub fn failing(mut self, id: i64) -> Self {
        self.failures.insert(RecipeId::Numeric(id));
        self
    }

    /// Holds fetches of `id` open until the returned handle is notified.
    pub fn gated(&mut self, id: i64) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.insert(RecipeId::Numeric(id), gate.clone());
        gate
    }

    pub fn calls(&self) -> Vec<RecipeId> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl RecipeSource for ScriptedRecipeSource {
    async fn get_recipe(&self, id: &RecipeId) -> Result<Recipe, RecipeApiError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(id.clone());
        }
        if let Some(gate) = self.gates.get(id) {
            gate.notified().await;
        }
        if self.failures.contains(id) {
            return Err(RecipeApiError::Service {
                status: 500,
                message: "scripted failure".into(),
            });
        }
        self.recipes
            .get(id)
            .cloned()
            .ok_or_else(|| RecipeApiError::NotFound(id.clone()))
    }

    async fn search(&self, search: &RecipeSearch) -> Result<Vec<RecipeRef>, RecipeApiError> {
        let needle = search.query.clone().unwrap_or_default().to_lowercase();
        Ok(self.refs_where(|r| r.title.to_lowercase().contains(&needle)))
    }

    async fn search_by_ingredients(
        &self,
        search: &IngredientSearch,
    ) -> Result<Vec<RecipeRef>, RecipeApiError> {
        let wanted: Vec<String> = search.names().iter().map(|n| n.to_lowercase()).collect();
        Ok(self.refs_where(|r| {
            r.ingredients()
                .iter()
                .any(|l| wanted.iter().any(|w| l.name.to_lowercase().contains(w.as_str())))
        }))
    }

    async fn similar(&self, id: &RecipeId) -> Result<Vec<RecipeRef>, RecipeApiError> {
        if !self.recipes.contains_key(id) {
            return Err(RecipeApiError::NotFound(id.clone()));
        }
        Ok(self.refs_where(|r| &r.id != id))
    }
}

impl ScriptedRecipeSource {
    fn refs_where(&self, keep: impl Fn(&Recipe) -> bool) -> Vec<RecipeRef> {
        let mut hits: Vec<RecipeRef> = self
            .recipes
            .values()
            .filter(|r| keep(r))
            .map(|r| RecipeRef {
                id: r.id.clone(),
                title: r.title.clone(),
                image: r.image.clone(),
                ready_in_minutes: r.ready_in_minutes,
                servings: r.servings,
            })
            .collect();
        hits.sort_by(|a, b| a.id.cmp(&b.id));
        hits
    }
}

pub fn line(id: i64, name: &str, amount: f64, unit: &str) -> IngredientLine {
    IngredientLine {
        id,
        name: name.to_string(),
        amount,
        unit: unit.to_string(),
        aisle: None,
    }
}

pub fn recipe(id: i64, title: &str, lines: Vec<IngredientLine>) -> Recipe {
    Recipe {
        id: RecipeId::Numeric(id),
        title: title.to_string(),
        image: None,
        ready_in_minutes: Some(30),
        servings: Some(2),
        extended_ingredients: Some(lines),
        instructions: None,
        nutrition: None,
    }
}

pub fn recipe_ref(id: i64, title: &str) -> RecipeRef {
    RecipeRef {
        id: RecipeId::Numeric(id),
        title: title.to_string(),
        image: None,
        ready_in_minutes: Some(30),
        servings: Some(2),
    }
}

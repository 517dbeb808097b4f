use std::fmt;

use serde::{Deserialize, Serialize};

/// Recipe identifier as the upstream API and user-submitted recipes use it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecipeId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipeId::Numeric(n) => write!(f, "{n}"),
            RecipeId::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for RecipeId {
    fn from(s: &str) -> Self {
        match s.parse::<i64>() {
            Ok(n) => RecipeId::Numeric(n),
            Err(_) => RecipeId::Text(s.to_string()),
        }
    }
}

impl From<i64> for RecipeId {
    fn from(n: i64) -> Self {
        RecipeId::Numeric(n)
    }
}

/// Lightweight projection of a recipe, as shown in search results and
/// inside meal-plan slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeRef {
    pub id: RecipeId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub ready_in_minutes: Option<u32>,
    #[serde(default)]
    pub servings: Option<u32>,
}

/// One ingredient entry of a detailed recipe.
///
/// `id` is assigned by the upstream API per recipe and is not guaranteed
/// to be unique across recipes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientLine {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub aisle: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub ready_in_minutes: Option<u32>,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub extended_ingredients: Option<Vec<IngredientLine>>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub nutrition: Option<serde_json::Value>,
}

impl Recipe {
    /// Ingredient lines, empty when the upstream omitted them.
    pub fn ingredients(&self) -> &[IngredientLine] {
        self.extended_ingredients.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSearch {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub cuisine: Option<String>,
    #[serde(default)]
    pub diet: Option<String>,
    #[serde(default, rename = "type")]
    pub meal_type: Option<String>,
    #[serde(default)]
    pub max_ready_time: Option<u32>,
    #[serde(default)]
    pub min_calories: Option<u32>,
    #[serde(default)]
    pub max_calories: Option<u32>,
    #[serde(default)]
    pub exclude_ingredients: Option<String>,
}

impl RecipeSearch {
    /// Query parameters understood by `/recipes/complexSearch`, minus the key.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("query", self.query.clone().unwrap_or_default()),
            ("number", "12".to_string()),
            ("addRecipeInformation", "true".to_string()),
            ("fillIngredients", "true".to_string()),
            ("instructionsRequired", "true".to_string()),
        ];
        let optional = [
            ("cuisine", self.cuisine.clone()),
            ("diet", self.diet.clone()),
            ("type", self.meal_type.clone()),
            ("maxReadyTime", self.max_ready_time.map(|v| v.to_string())),
            ("minCalories", self.min_calories.map(|v| v.to_string())),
            ("maxCalories", self.max_calories.map(|v| v.to_string())),
            ("excludeIngredients", self.exclude_ingredients.clone()),
        ];
        for (key, value) in optional {
            if let Some(v) = value.filter(|v| !v.is_empty()) {
                params.push((key, v));
            }
        }
        params
    }
}

/// Pantry-driven search: recipes that use the listed ingredients.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IngredientSearch {
    #[serde(default)]
    pub ingredients: String,
}

impl IngredientSearch {
    /// Trimmed, non-empty ingredient names.
    pub fn names(&self) -> Vec<&str> {
        self.ingredients
            .split(',')
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .collect()
    }

    /// Query parameters understood by `/recipes/findByIngredients`, minus the key.
    /// Ranks by most used ingredients and ignores pantry staples.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("ingredients", self.names().join(",")),
            ("number", "12".to_string()),
            ("ranking", "1".to_string()),
            ("ignorePantry", "true".to_string()),
        ]
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub results: Vec<RecipeRef>,
}

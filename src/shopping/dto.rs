use serde::{Deserialize, Serialize};

use super::checklist::ChecklistState;
use super::classify::Category;
use super::consolidate::ConsolidatedIngredient;
use super::services::ShoppingList;
use crate::meal_plans::model::MealPlan;

pub const EMPTY_MESSAGE: &str = "No ingredients found. Add recipes to your meal plan first.";
pub const FAILED_MESSAGE: &str = "Failed to generate shopping list. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewStatus {
    Idle,
    Pending,
    Ready,
    Empty,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShoppingItem {
    #[serde(flatten)]
    pub ingredient: ConsolidatedIngredient,
    pub checked: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategorySection {
    pub category: Category,
    pub label: &'static str,
    pub items: Vec<ShoppingItem>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingListView {
    pub status: ViewStatus,
    pub message: Option<String>,
    pub categories: Vec<CategorySection>,
    pub ingredients: Vec<ShoppingItem>,
    pub completion_percentage: u32,
}

impl ShoppingListView {
    pub fn without_list(status: ViewStatus, message: Option<&str>) -> Self {
        Self {
            status,
            message: message.map(str::to_string),
            categories: Vec::new(),
            ingredients: Vec::new(),
            completion_percentage: 0,
        }
    }

    pub fn from_list(list: &ShoppingList, checklist: &ChecklistState) -> Self {
        if list.is_empty() {
            return Self::without_list(ViewStatus::Empty, Some(EMPTY_MESSAGE));
        }
        let item = |ingredient: &ConsolidatedIngredient| ShoppingItem {
            ingredient: ingredient.clone(),
            checked: checklist.is_checked(ingredient.id),
        };
        Self {
            status: ViewStatus::Ready,
            message: None,
            categories: list
                .categories
                .iter()
                .map(|group| CategorySection {
                    category: group.category,
                    label: group.category.label(),
                    items: group.items.iter().map(item).collect(),
                })
                .collect(),
            ingredients: list.ingredients.iter().map(item).collect(),
            completion_percentage: checklist.completion_percentage(list.ingredients.len()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub meals: MealPlan,
}

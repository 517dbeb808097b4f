use serde::Serialize;

use super::consolidate::ConsolidatedIngredient;

/// Grocery aisle used to group the shopping list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Produce,
    Dairy,
    Meat,
    Grains,
    Canned,
    Spices,
    Oils,
    Baking,
    Frozen,
    Snacks,
    Beverages,
    Other,
}

impl Category {
    /// Display order; also the order groups are returned in.
    pub const ALL: [Category; 12] = [
        Category::Produce,
        Category::Dairy,
        Category::Meat,
        Category::Grains,
        Category::Canned,
        Category::Spices,
        Category::Oils,
        Category::Baking,
        Category::Frozen,
        Category::Snacks,
        Category::Beverages,
        Category::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Produce => "Produce",
            Category::Dairy => "Dairy",
            Category::Meat => "Meat",
            Category::Grains => "Grains",
            Category::Canned => "Canned",
            Category::Spices => "Spices",
            Category::Oils => "Oils",
            Category::Baking => "Baking",
            Category::Frozen => "Frozen",
            Category::Snacks => "Snacks",
            Category::Beverages => "Beverages",
            Category::Other => "Other",
        }
    }
}

/// Keyword substrings per category, checked top to bottom.
///
/// Order matters: "tomato sauce" lands in produce because "tomato" is seen
/// first, "herb" in produce before spices, "flour" in grains before baking.
pub const AISLE_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Produce,
        &[
            "vegetable", "fruit", "lettuce", "tomato", "onion", "potato", "carrot", "apple",
            "banana", "berry", "herb", "garlic",
        ],
    ),
    (
        Category::Dairy,
        &["milk", "cheese", "yogurt", "butter", "cream", "egg"],
    ),
    (
        Category::Meat,
        &[
            "chicken", "beef", "pork", "fish", "salmon", "tuna", "turkey", "bacon", "sausage",
            "meat",
        ],
    ),
    (
        Category::Grains,
        &["flour", "rice", "pasta", "bread", "cereal", "oat", "quinoa", "noodle"],
    ),
    (
        Category::Canned,
        &["can", "bean", "soup", "tomato sauce", "broth"],
    ),
    (
        Category::Spices,
        &[
            "salt", "pepper", "spice", "herb", "seasoning", "cinnamon", "oregano", "basil",
            "thyme",
        ],
    ),
    (Category::Oils, &["oil", "vinegar", "dressing"]),
    (
        Category::Baking,
        &["sugar", "baking", "chocolate", "vanilla", "honey", "maple", "flour"],
    ),
    (Category::Frozen, &["frozen", "ice cream"]),
    (Category::Snacks, &["chip", "snack", "cracker", "nut"]),
    (
        Category::Beverages,
        &["water", "juice", "soda", "wine", "beer", "coffee", "tea"],
    ),
];

pub fn classify_name(name: &str) -> Category {
    let name = name.to_lowercase();
    AISLE_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| name.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(Category::Other)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryGroup {
    pub category: Category,
    pub items: Vec<ConsolidatedIngredient>,
}

/// Non-empty groups in `Category::ALL` order; items keep their input order.
pub fn categorize(ingredients: &[ConsolidatedIngredient]) -> Vec<CategoryGroup> {
    let mut buckets: Vec<Vec<ConsolidatedIngredient>> = vec![Vec::new(); Category::ALL.len()];
    for ingredient in ingredients {
        let category = classify_name(&ingredient.name);
        let slot = Category::ALL
            .iter()
            .position(|c| *c == category)
            .unwrap_or(Category::ALL.len() - 1);
        buckets[slot].push(ingredient.clone());
    }

    Category::ALL
        .into_iter()
        .zip(buckets)
        .filter(|(_, items)| !items.is_empty())
        .map(|(category, items)| CategoryGroup { category, items })
        .collect()
}

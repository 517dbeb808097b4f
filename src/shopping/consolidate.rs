use std::collections::HashSet;

use serde::Serialize;

use crate::recipes::dto::IngredientLine;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidatedIngredient {
    pub id: i64,
    pub name: String,
    pub name_and_amount: String,
    pub amount: f64,
    pub unit: String,
    pub aisle: String,
}

impl ConsolidatedIngredient {
    fn from_line(line: &IngredientLine) -> Self {
        Self {
            id: line.id,
            name: line.name.clone(),
            name_and_amount: display_line(line),
            amount: line.amount,
            unit: line.unit.clone(),
            aisle: line
                .aisle
                .clone()
                .filter(|a| !a.is_empty())
                .unwrap_or_else(|| "Other".to_string()),
        }
    }
}

/// "amount unit name", skipping an empty unit.
fn display_line(line: &IngredientLine) -> String {
    let amount = line.amount.to_string();
    [amount.as_str(), line.unit.trim(), line.name.trim()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// One entry per ingredient id, in order of first appearance.
///
/// The first line seen for an id wins outright; later amounts are not added.
/// Ids come from the recipe API and are only scoped to their recipe, so the
/// same food from two recipes may stay separate, and unrelated foods sharing
/// an id collapse into one entry.
pub fn consolidate<'a, I>(lines: I) -> Vec<ConsolidatedIngredient>
where
    I: IntoIterator<Item = &'a IngredientLine>,
{
    let mut seen = HashSet::new();
    lines
        .into_iter()
        .filter(|line| seen.insert(line.id))
        .map(ConsolidatedIngredient::from_line)
        .collect()
}

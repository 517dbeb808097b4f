use std::collections::HashMap;

/// Checked state of shopping-list items, keyed by ingredient id.
///
/// Ids never toggled read as unchecked.
#[derive(Debug, Clone, Default)]
pub struct ChecklistState {
    checked: HashMap<i64, bool>,
}

impl ChecklistState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips `id` and returns its new state.
    pub fn toggle(&mut self, id: i64) -> bool {
        let entry = self.checked.entry(id).or_insert(false);
        *entry = !*entry;
        *entry
    }

    pub fn is_checked(&self, id: i64) -> bool {
        self.checked.get(&id).copied().unwrap_or(false)
    }

    pub fn checked_count(&self) -> usize {
        self.checked.values().filter(|v| **v).count()
    }

    /// Rounded share of checked items; 0 for an empty list.
    pub fn completion_percentage(&self, total: usize) -> u32 {
        if total == 0 {
            return 0;
        }
        (100.0 * self.checked_count() as f64 / total as f64).round() as u32
    }

    pub fn clear_all(&mut self) {
        self.checked.clear();
    }
}

//! The view-side copy of a remote collection.
//!
//! Every operation here is pure: it takes `&self` and hands back a new
//! list, leaving the receiver untouched. Operations addressing an id that
//! is not present return an equal list rather than an error.

use std::collections::HashSet;

use shared::domain::Record;

/// Ordered records, newest first, with no two records sharing an id.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T: Record> {
    items: Vec<T>,
}

impl<T: Record> Default for ListState<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Record> ListState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from a store listing: sorted by descending
    /// `created_at` (stable, so ties keep the store's order) and with later
    /// duplicates of an id dropped.
    pub fn from_snapshot(records: impl IntoIterator<Item = T>) -> Self {
        let mut seen = HashSet::new();
        let mut items: Vec<T> = records
            .into_iter()
            .filter(|record| seen.insert(record.id().clone()))
            .collect();
        items.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Self { items }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: &T::Id) -> bool {
        self.get(id).is_some()
    }

    pub fn update_title_by_id(&self, id: &T::Id, title: &str) -> Self {
        Self {
            items: self
                .items
                .iter()
                .map(|item| {
                    if item.id() == id {
                        item.with_title(title)
                    } else {
                        item.clone()
                    }
                })
                .collect(),
        }
    }

    pub fn remove_by_id(&self, id: &T::Id) -> Self {
        Self {
            items: self
                .items
                .iter()
                .filter(|item| item.id() != id)
                .cloned()
                .collect(),
        }
    }

    /// Puts `record` at the front. An existing record with the same id is
    /// dropped first, so prepending twice yields the same list.
    pub fn prepend(&self, record: T) -> Self {
        let rest = self.items.iter().filter(|item| item.id() != record.id());
        let items = std::iter::once(record.clone()).chain(rest.cloned()).collect();
        Self { items }
    }

    /// Swaps in the store's copy of a record, keeping its position.
    pub fn replace_by_id(&self, record: &T) -> Self {
        Self {
            items: self
                .items
                .iter()
                .map(|item| {
                    if item.id() == record.id() {
                        record.clone()
                    } else {
                        item.clone()
                    }
                })
                .collect(),
        }
    }
}

impl<T: Record> From<Vec<T>> for ListState<T> {
    fn from(records: Vec<T>) -> Self {
        Self::from_snapshot(records)
    }
}

#[cfg(test)]
#[path = "tests/list_state_tests.rs"]
mod tests;

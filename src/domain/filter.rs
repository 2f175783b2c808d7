//! Filter selection over the item list
//!
//! A filter holds at most one category and one urgency. `None` means "no
//! filter" for that field; an empty string selects the same thing. An item
//! is visible when it matches both selections.

use super::item::Item;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    category: Option<String>,
    urgency: Option<String>,
}

impl Filter {
    /// A filter that shows every item
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new(category: Option<String>, urgency: Option<String>) -> Self {
        Self {
            category: category.filter(|c| !c.is_empty()),
            urgency: urgency.filter(|u| !u.is_empty()),
        }
    }

    pub fn by_category(category: impl Into<String>) -> Self {
        Self::new(Some(category.into()), None)
    }

    pub fn by_urgency(urgency: impl Into<String>) -> Self {
        Self::new(None, Some(urgency.into()))
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn urgency(&self) -> Option<&str> {
        self.urgency.as_deref()
    }

    /// Returns true if either selection is set
    pub fn is_active(&self) -> bool {
        self.category.is_some() || self.urgency.is_some()
    }

    pub fn matches(&self, item: &Item) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .map_or(true, |c| item.category.as_deref() == Some(c));
        let urgency_ok = self
            .urgency
            .as_deref()
            .map_or(true, |u| item.urgency.as_deref() == Some(u));

        category_ok && urgency_ok
    }

    /// Returns the matching items in list order
    pub fn apply<'a>(&self, items: &'a [Item]) -> Vec<&'a Item> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}

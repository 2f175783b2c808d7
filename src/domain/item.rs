//! Shopping list item model
//!
//! Items are stored as one JSON object each:
//! `{"id": "...", "name": "...", "quantity": "...", "category": "...", "urgency": "..."}`.
//! `category` and `urgency` are omitted when a profile does not use them.
//! Quantity is free text ("2", "1 kg", "a few") and is never parsed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::id::ItemId;

/// How soon an item is needed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    pub const ALL: [Urgency; 3] = [Urgency::Low, Urgency::Medium, Urgency::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "Low",
            Urgency::Medium => "Medium",
            Urgency::High => "High",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Urgency::ALL
            .into_iter()
            .find(|u| u.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| s.to_string())
    }
}

/// The user-editable fields of an item
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFields {
    pub name: String,
    pub quantity: String,
    pub category: Option<String>,
    pub urgency: Option<String>,
}

impl ItemFields {
    pub fn new(name: impl Into<String>, quantity: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
            category: None,
            urgency: None,
        }
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn urgency(mut self, urgency: impl Into<String>) -> Self {
        self.urgency = Some(urgency.into());
        self
    }
}

/// One entry in the shopping list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier, fixed at creation
    pub id: ItemId,

    pub name: String,

    pub quantity: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub urgency: Option<String>,
}

impl Item {
    /// Creates an item from already-validated fields
    pub fn new(id: ItemId, fields: ItemFields) -> Self {
        Self {
            id,
            name: fields.name,
            quantity: fields.quantity,
            category: fields.category,
            urgency: fields.urgency,
        }
    }

    /// Overwrites every mutable field; the ID is left untouched
    pub fn apply(&mut self, fields: ItemFields) {
        self.name = fields.name;
        self.quantity = fields.quantity;
        self.category = fields.category;
        self.urgency = fields.urgency;
    }

    /// Returns the current fields, e.g. as the starting point of an edit
    pub fn fields(&self) -> ItemFields {
        ItemFields {
            name: self.name.clone(),
            quantity: self.quantity.clone(),
            category: self.category.clone(),
            urgency: self.urgency.clone(),
        }
    }
}

//! Shopping List - a local-first shopping list
//!
//! Items (name, quantity, category, urgency) live in an [`ItemStore`] that
//! derives a filtered view and persists the whole list to a single
//! key-value slot after every change. The `shop` CLI is a thin
//! presentation layer on top.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{FieldProfile, Filter, Item, ItemFields, ItemId, ValidationError};
pub use storage::{Change, Command, ItemStore, KeyValueStore};

//! Domain models for the shopping list
//!
//! Contains the core business logic without any I/O concerns.

mod id;
mod item;
mod profile;
mod filter;

pub use id::{IdError, IdGenerator, ItemId};
pub use item::{Item, ItemFields, Urgency};
pub use profile::{
    FieldProfile, ProfileKind, ValidationError, GROCERY_CATEGORIES, HOUSEHOLD_CATEGORIES,
};
pub use filter::Filter;

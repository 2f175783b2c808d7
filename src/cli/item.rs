//! Item CLI commands

use anyhow::{bail, Result};
use clap::Args;

use super::app::Session;
use super::output::Output;
use super::share::share_text;
use crate::domain::{FieldProfile, Filter, Item, ItemFields, ItemId, Urgency};
use crate::storage::Change;

/// Category/urgency selection shared by `list` and `share`
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Only items in this category
    #[arg(long, short)]
    pub category: Option<String>,

    /// Only items with this urgency (Low, Medium, High)
    #[arg(long, short)]
    pub urgency: Option<String>,
}

impl FilterArgs {
    /// Builds a filter, matching known names case-insensitively
    fn to_filter(&self, profile: &FieldProfile) -> Filter {
        let category = self.category.as_ref().map(|c| {
            profile
                .categories
                .and_then(|allowed| allowed.iter().find(|a| a.eq_ignore_ascii_case(c.trim())))
                .map_or_else(|| c.clone(), |a| (*a).to_string())
        });
        let urgency = self.urgency.as_ref().map(|u| {
            u.parse::<Urgency>()
                .map_or_else(|_| u.clone(), |u| u.as_str().to_string())
        });

        Filter::new(category, urgency)
    }
}

pub fn add(session: &Session, output: &Output, fields: ItemFields) -> Result<()> {
    let mut store = session.open_store()?;
    let item = store.add(fields)?;

    output.emit(item, || println!("Added item: {} - {}", item.id, item.name))
}

/// Changes to apply in `edit`; `None` keeps the current value
#[derive(Debug, Default)]
pub struct FieldUpdates {
    pub name: Option<String>,
    pub quantity: Option<String>,
    pub category: Option<String>,
    pub urgency: Option<String>,
}

impl FieldUpdates {
    fn merge_into(self, mut fields: ItemFields) -> ItemFields {
        if let Some(name) = self.name {
            fields.name = name;
        }
        if let Some(quantity) = self.quantity {
            fields.quantity = quantity;
        }
        if let Some(category) = self.category {
            fields.category = Some(category);
        }
        if let Some(urgency) = self.urgency {
            fields.urgency = Some(urgency);
        }
        fields
    }
}

pub fn edit(session: &Session, output: &Output, id_str: &str, updates: FieldUpdates) -> Result<()> {
    let id: ItemId = id_str.parse()?;
    let mut store = session.open_store()?;

    let current = match store.get(&id) {
        Some(item) => item.fields(),
        None => bail!("Item not found: {}", id),
    };

    let change = store.edit(&id, updates.merge_into(current))?;
    let item = match (change, store.get(&id)) {
        (Change::Edited(_), Some(item)) => item,
        _ => bail!("Item not found: {}", id),
    };

    output.emit(item, || println!("Updated item: {} - {}", item.id, item.name))
}

pub fn delete(session: &Session, output: &Output, id_str: &str) -> Result<()> {
    let id: ItemId = id_str.parse()?;
    let mut store = session.open_store()?;

    let deleted = store.delete(&id);

    let result = serde_json::json!({ "id": id, "deleted": deleted });
    output.emit(&result, || {
        if deleted {
            println!("Deleted item: {}", id);
        } else {
            println!("No item with ID {} (nothing to delete)", id);
        }
    })
}

pub fn list(session: &Session, output: &Output, filter_args: &FilterArgs) -> Result<()> {
    let mut store = session.open_store()?;
    let filter = filter_args.to_filter(store.profile());
    store.set_filter(filter);

    let items = store.filtered_items();
    tracing::debug!(visible = items.len(), total = store.items().len(), "listing items");

    output.emit(&items, || {
        if !items.is_empty() {
            print_table(&items, store.profile());
        } else if store.filter().is_active() {
            println!("No items match the filter");
        } else {
            println!("Shopping list is empty");
        }
    })
}

fn print_table(items: &[&Item], profile: &FieldProfile) {
    if profile.urgency {
        println!(
            "{:<16} {:<24} {:<12} {:<16} URGENCY",
            "ID", "NAME", "QUANTITY", "CATEGORY"
        );
        println!("{}", "-".repeat(80));
        for item in items {
            println!(
                "{:<16} {:<24} {:<12} {:<16} {}",
                item.id,
                item.name,
                item.quantity,
                item.category.as_deref().unwrap_or("-"),
                item.urgency.as_deref().unwrap_or("-"),
            );
        }
    } else {
        println!("{:<16} {:<24} {:<12} CATEGORY", "ID", "NAME", "QUANTITY");
        println!("{}", "-".repeat(70));
        for item in items {
            println!(
                "{:<16} {:<24} {:<12} {}",
                item.id,
                item.name,
                item.quantity,
                item.category.as_deref().unwrap_or("-"),
            );
        }
    }
}

pub fn show(session: &Session, output: &Output, id_str: &str) -> Result<()> {
    let id: ItemId = id_str.parse()?;
    let store = session.open_store()?;

    let item = store
        .get(&id)
        .ok_or_else(|| anyhow::anyhow!("Item not found: {}", id))?;

    output.emit(item, || {
        println!("Item: {}", item.id);
        println!("Name: {}", item.name);
        println!("Quantity: {}", item.quantity);
        if let Some(category) = &item.category {
            println!("Category: {}", category);
        }
        if let Some(urgency) = &item.urgency {
            println!("Urgency: {}", urgency);
        }
    })
}

pub fn share(session: &Session, output: &Output, filter_args: &FilterArgs) -> Result<()> {
    let mut store = session.open_store()?;
    let filter = filter_args.to_filter(store.profile());
    store.set_filter(filter);

    let text = share_text(store.filtered_items());

    output.emit(&serde_json::json!({ "message": text }), || println!("{}", text))
}

pub fn categories(session: &Session, output: &Output) -> Result<()> {
    let profile = session.profile();
    let urgencies: Vec<&str> = if profile.urgency {
        Urgency::ALL.iter().map(|u| u.as_str()).collect()
    } else {
        Vec::new()
    };

    let summary = serde_json::json!({
        "profile": session.profile_kind().as_str(),
        "categories": profile.categories,
        "urgencies": urgencies,
        "validated": profile.validate,
    });

    output.emit(&summary, || {
        println!("Profile: {}", session.profile_kind().as_str());
        match profile.categories {
            Some(categories) => {
                println!("Categories:");
                for category in categories {
                    println!("  {}", category);
                }
            }
            None => println!("Categories: free text"),
        }
        if urgencies.is_empty() {
            println!("Urgency: not used");
        } else {
            println!("Urgencies: {}", urgencies.join(", "));
        }
    })
}

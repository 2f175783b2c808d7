//! Plain-text rendering of the list for sharing
//!
//! ```text
//! Shopping List:
//! Item: Milk, Quantity: 2, Category: Dairy, Urgency: High
//! Item: Bread, Quantity: 1
//! ```

use crate::domain::Item;

/// Formats one line per item under a `Shopping List:` header
pub fn share_text<'a>(items: impl IntoIterator<Item = &'a Item>) -> String {
    let lines: Vec<String> = items.into_iter().map(share_line).collect();
    format!("Shopping List:\n{}", lines.join("\n"))
}

fn share_line(item: &Item) -> String {
    let mut line = format!("Item: {}, Quantity: {}", item.name, item.quantity);
    if let Some(category) = &item.category {
        line.push_str(&format!(", Category: {}", category));
    }
    if let Some(urgency) = &item.urgency {
        line.push_str(&format!(", Urgency: {}", urgency));
    }
    line
}

//! The item store
//!
//! [`ItemStore`] owns the shopping list and the active filter. Every change
//! goes through [`ItemStore::dispatch`] (or the typed helpers that wrap it),
//! is applied to memory in one step, and is then written to the backing
//! [`KeyValueStore`] under [`STORAGE_KEY`] as a JSON array.
//!
//! Persistence never fails a command: write errors are logged and the
//! in-memory list stays authoritative for the rest of the session. Restoring
//! is just as forgiving; a missing, unreadable or malformed slot leaves the
//! list empty.
//!
//! ```
//! use shopping_list::storage::{ItemStore, MemoryKv};
//! use shopping_list::domain::{FieldProfile, Filter, ItemFields};
//!
//! let mut store = ItemStore::open(MemoryKv::new(), FieldProfile::GROCERY);
//! store.add(ItemFields::new("Milk", "2").category("Dairy").urgency("High")).unwrap();
//! store.add(ItemFields::new("Apples", "6").category("Fruits").urgency("Low")).unwrap();
//!
//! store.set_filter(Filter::by_category("Dairy"));
//! assert_eq!(store.filtered_items().len(), 1);
//! ```

use std::collections::HashSet;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};

use super::kv::{KeyValueStore, KvError};
use crate::domain::{FieldProfile, Filter, IdGenerator, Item, ItemFields, ItemId, ValidationError};

/// Key of the persisted slot holding the item list
pub const STORAGE_KEY: &str = "shoppingItems";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] KvError),

    #[error("Invalid shopping list JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// A state change requested by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add(ItemFields),
    Edit { id: ItemId, fields: ItemFields },
    Delete(ItemId),
    SetFilter(Filter),
}

/// What happened to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Added(ItemId),
    Edited(ItemId),
    Deleted(ItemId),
    FilterChanged,
    /// The list was replaced by `count` persisted items
    Restored(usize),
    /// An edit or delete named an ID that is not in the list; nothing changed
    NotFound(ItemId),
}

impl Change {
    /// Returns true if the item list or filter actually changed
    pub fn is_change(&self) -> bool {
        !matches!(self, Change::NotFound(_))
    }
}

/// Read-only view of the store handed to listeners
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    pub items: &'a [Item],
    pub filter: &'a Filter,
}

impl<'a> View<'a> {
    /// Items that pass the active filter, in list order
    pub fn filtered(&self) -> Vec<&'a Item> {
        self.filter.apply(self.items)
    }
}

/// Callback run after every state change
pub type Listener = Box<dyn FnMut(&Change, View<'_>)>;

/// Authoritative shopping list state, bound to one persisted slot
pub struct ItemStore<K> {
    items: Vec<Item>,
    filter: Filter,
    profile: FieldProfile,
    ids: IdGenerator,
    backend: K,
    listener: Option<Listener>,
}

impl<K: KeyValueStore> ItemStore<K> {
    /// Creates an empty store without reading persisted data
    pub fn new(backend: K, profile: FieldProfile) -> Self {
        Self {
            items: Vec::new(),
            filter: Filter::none(),
            profile,
            ids: IdGenerator::new(),
            backend,
            listener: None,
        }
    }

    /// Creates a store and restores the persisted list, if any
    pub fn open(backend: K, profile: FieldProfile) -> Self {
        let mut store = Self::new(backend, profile);
        store.restore();
        store
    }

    /// Returns the field profile
    pub fn profile(&self) -> &FieldProfile {
        &self.profile
    }

    /// Returns the backing key-value store
    pub fn backend(&self) -> &K {
        &self.backend
    }

    /// Consumes the store, returning the backing key-value store
    pub fn into_backend(self) -> K {
        self.backend
    }

    /// All items in insertion order
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Items that pass the active filter, in insertion order
    pub fn filtered_items(&self) -> Vec<&Item> {
        self.view().filtered()
    }

    /// Looks up an item by ID
    pub fn get(&self, id: &ItemId) -> Option<&Item> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Returns the active filter
    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn view(&self) -> View<'_> {
        View {
            items: &self.items,
            filter: &self.filter,
        }
    }

    /// Installs the listener, replacing any previous one
    pub fn subscribe(&mut self, listener: impl FnMut(&Change, View<'_>) + 'static) {
        self.listener = Some(Box::new(listener));
    }

    /// Removes the listener
    pub fn unsubscribe(&mut self) {
        self.listener = None;
    }

    /// Applies a command.
    ///
    /// Validation failures leave the store untouched. Item changes are
    /// persisted before this returns; filter changes are not persisted.
    pub fn dispatch(&mut self, command: Command) -> Result<Change, ValidationError> {
        let change = match command {
            Command::Add(fields) => self.apply_add(fields)?,
            Command::Edit { id, fields } => self.apply_edit(id, fields)?,
            Command::Delete(id) => self.apply_delete(id),
            Command::SetFilter(filter) => {
                debug!(category = ?filter.category(), urgency = ?filter.urgency(), "filter changed");
                self.filter = filter;
                Change::FilterChanged
            }
        };

        if matches!(
            change,
            Change::Added(_) | Change::Edited(_) | Change::Deleted(_)
        ) {
            self.flush();
        }
        if change.is_change() {
            self.notify(&change);
        }

        Ok(change)
    }

    /// Adds an item and returns it
    pub fn add(&mut self, fields: ItemFields) -> Result<&Item, ValidationError> {
        self.dispatch(Command::Add(fields))?;
        // A successful add always appends
        Ok(&self.items[self.items.len() - 1])
    }

    /// Overwrites the mutable fields of `id`.
    ///
    /// An unknown ID is not an error: nothing changes and
    /// [`Change::NotFound`] is returned.
    pub fn edit(&mut self, id: &ItemId, fields: ItemFields) -> Result<Change, ValidationError> {
        self.dispatch(Command::Edit {
            id: id.clone(),
            fields,
        })
    }

    /// Removes `id`; returns false if it was not in the list
    pub fn delete(&mut self, id: &ItemId) -> bool {
        matches!(
            self.dispatch(Command::Delete(id.clone())),
            Ok(Change::Deleted(_))
        )
    }

    /// Replaces the active filter
    pub fn set_filter(&mut self, filter: Filter) {
        // SetFilter never fails validation
        let _ = self.dispatch(Command::SetFilter(filter));
    }

    /// Writes the full item list to the backing store
    pub fn persist(&self) -> Result<(), StoreError> {
        let payload = serde_json::to_string(&self.items)?;
        self.backend.set(STORAGE_KEY, &payload)?;
        debug!(count = self.items.len(), key = STORAGE_KEY, "persisted items");
        Ok(())
    }

    /// Replaces the list with the persisted one.
    ///
    /// Returns the number of items loaded. Any failure is logged and leaves
    /// the current list as it was.
    pub fn restore(&mut self) -> usize {
        match self.load() {
            Ok(Some(items)) => {
                let count = items.len();
                self.ids.observe(items.iter().map(|item| &item.id));
                self.items = items;
                debug!(count, "restored items");
                self.notify(&Change::Restored(count));
                count
            }
            Ok(None) => {
                debug!(key = STORAGE_KEY, "no saved items");
                0
            }
            Err(e) => {
                warn!(error = %e, "could not restore saved items, starting empty");
                0
            }
        }
    }

    fn load(&self) -> Result<Option<Vec<Item>>, StoreError> {
        let Some(payload) = self.backend.get(STORAGE_KEY)? else {
            return Ok(None);
        };

        let items: Vec<Item> = serde_json::from_str(&payload)?;
        Ok(Some(dedup_ids(items)))
    }

    fn apply_add(&mut self, fields: ItemFields) -> Result<Change, ValidationError> {
        let fields = self.profile.normalize(fields)?;

        let items = &self.items;
        let id = self
            .ids
            .next(Utc::now(), |candidate| items.iter().any(|i| &i.id == candidate));

        debug!(id = %id, name = %fields.name, "adding item");
        self.items.push(Item::new(id.clone(), fields));
        Ok(Change::Added(id))
    }

    fn apply_edit(&mut self, id: ItemId, fields: ItemFields) -> Result<Change, ValidationError> {
        let fields = self.profile.normalize(fields)?;

        match self.items.iter_mut().find(|item| item.id == id) {
            Some(item) => {
                debug!(id = %id, "editing item");
                item.apply(fields);
                Ok(Change::Edited(id))
            }
            None => {
                debug!(id = %id, "edit target not found");
                Ok(Change::NotFound(id))
            }
        }
    }

    fn apply_delete(&mut self, id: ItemId) -> Change {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);

        if self.items.len() < before {
            debug!(id = %id, "deleted item");
            Change::Deleted(id)
        } else {
            Change::NotFound(id)
        }
    }

    fn flush(&self) {
        if let Err(e) = self.persist() {
            warn!(error = %e, "failed to save items, keeping changes in memory");
        }
    }

    fn notify(&mut self, change: &Change) {
        if let Some(mut listener) = self.listener.take() {
            listener(change, self.view());
            self.listener = Some(listener);
        }
    }
}

/// Keeps the first item for each ID so the loaded list has unique IDs
fn dedup_ids(items: Vec<Item>) -> Vec<Item> {
    let mut seen = HashSet::new();
    let total = items.len();

    let unique: Vec<Item> = items
        .into_iter()
        .filter(|item| seen.insert(item.id.clone()))
        .collect();

    if unique.len() < total {
        warn!(
            dropped = total - unique.len(),
            "saved list repeats item IDs, keeping the first of each"
        );
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryKv;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn milk() -> ItemFields {
        ItemFields::new("Milk", "2").category("Dairy").urgency("High")
    }

    fn apples() -> ItemFields {
        ItemFields::new("Apples", "6").category("Fruits").urgency("Low")
    }

    fn cheese() -> ItemFields {
        ItemFields::new("Cheese", "1").category("Dairy").urgency("Medium")
    }

    fn grocery_store() -> ItemStore<MemoryKv> {
        ItemStore::new(MemoryKv::new(), FieldProfile::GROCERY)
    }

    fn saved(store: &ItemStore<MemoryKv>) -> Vec<Item> {
        let payload = store.backend().get(STORAGE_KEY).unwrap().unwrap();
        serde_json::from_str(&payload).unwrap()
    }

    // =========================================================================
    // Commands
    // =========================================================================

    #[test]
    fn add_appends_with_fresh_id() {
        let mut store = grocery_store();
        store.add(apples()).unwrap();
        let added = store.add(milk()).unwrap().clone();

        let last = store.items().last().unwrap();
        assert_eq!(last, &added);
        assert_eq!(last.name, "Milk");
        assert_eq!(last.quantity, "2");
        assert_eq!(last.category.as_deref(), Some("Dairy"));
        assert_eq!(last.urgency.as_deref(), Some("High"));
        assert_ne!(store.items()[0].id, last.id);
    }

    #[test]
    fn add_persists_immediately() {
        let mut store = grocery_store();
        store.add(milk()).unwrap();

        assert_eq!(saved(&store), store.items());
    }

    #[test]
    fn add_with_empty_name_is_rejected() {
        let mut store = grocery_store();
        store.add(milk()).unwrap();

        let err = store
            .add(ItemFields::new("", "2").category("Dairy").urgency("High"))
            .unwrap_err();

        assert_eq!(err, ValidationError::MissingField("name"));
        assert_eq!(store.items().len(), 1);
        assert_eq!(saved(&store).len(), 1);
    }

    #[test]
    fn rejected_add_does_not_consume_an_id() {
        let mut store = grocery_store();
        store.add(milk()).unwrap();
        let mut untouched = store.ids.clone();

        store.add(ItemFields::new("", "")).unwrap_err();

        let now = Utc::now();
        assert_eq!(store.ids.next(now, |_| false), untouched.next(now, |_| false));
        assert_eq!(store.items().len(), 1);
    }

    #[test]
    fn basic_profile_accepts_empty_fields() {
        let mut store = ItemStore::new(MemoryKv::new(), FieldProfile::BASIC);
        let item = store.add(ItemFields::new("", "").urgency("High")).unwrap();

        assert_eq!(item.name, "");
        assert_eq!(item.urgency, None);
    }

    #[test]
    fn edit_overwrites_fields_and_keeps_id() {
        let mut store = grocery_store();
        let id = store.add(milk()).unwrap().id.clone();

        let change = store
            .edit(&id, ItemFields::new("Oat milk", "1 l").category("Dairy").urgency("Low"))
            .unwrap();

        assert_eq!(change, Change::Edited(id.clone()));
        let item = store.get(&id).unwrap();
        assert_eq!(item.name, "Oat milk");
        assert_eq!(item.quantity, "1 l");
        assert_eq!(item.urgency.as_deref(), Some("Low"));
        assert_eq!(saved(&store)[0].name, "Oat milk");
    }

    #[test]
    fn edit_missing_id_changes_nothing() {
        let mut store = grocery_store();
        store.add(milk()).unwrap();
        let before = store.items().to_vec();

        let missing: ItemId = "does-not-exist".parse().unwrap();
        let change = store.edit(&missing, apples()).unwrap();

        assert_eq!(change, Change::NotFound(missing));
        assert!(!change.is_change());
        assert_eq!(store.items(), before.as_slice());
    }

    #[test]
    fn invalid_edit_is_rejected() {
        let mut store = grocery_store();
        let id = store.add(milk()).unwrap().id.clone();

        let err = store
            .edit(&id, ItemFields::new("Milk", "").category("Dairy").urgency("High"))
            .unwrap_err();

        assert_eq!(err, ValidationError::MissingField("quantity"));
        assert_eq!(store.get(&id).unwrap().quantity, "2");
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = grocery_store();
        let id = store.add(milk()).unwrap().id.clone();
        store.add(apples()).unwrap();

        assert!(store.delete(&id));
        let once = store.items().to_vec();

        assert!(!store.delete(&id));
        assert_eq!(store.items(), once.as_slice());
        assert_eq!(saved(&store), once);
    }

    // =========================================================================
    // Filtered view
    // =========================================================================

    #[test]
    fn no_filter_view_equals_items() {
        let mut store = grocery_store();
        store.add(milk()).unwrap();
        store.add(apples()).unwrap();
        store.add(cheese()).unwrap();

        let filtered: Vec<Item> = store.filtered_items().into_iter().cloned().collect();
        assert_eq!(filtered, store.items());
    }

    #[test]
    fn category_filter_keeps_relative_order() {
        let mut store = grocery_store();
        store.add(milk()).unwrap();
        store.add(apples()).unwrap();
        store.add(cheese()).unwrap();

        store.set_filter(Filter::by_category("Dairy"));

        let names: Vec<_> = store.filtered_items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Milk", "Cheese"]);
        assert_eq!(store.items().len(), 3);
    }

    #[test]
    fn filter_is_not_persisted() {
        let mut store = grocery_store();
        store.add(milk()).unwrap();
        store.set_filter(Filter::by_category("Fruits"));

        let reopened = ItemStore::open(store.into_backend(), FieldProfile::GROCERY);
        assert_eq!(reopened.filter(), &Filter::none());
        assert_eq!(reopened.filtered_items().len(), 1);
    }

    #[test]
    fn view_is_recomputed_after_mutation() {
        let mut store = grocery_store();
        store.set_filter(Filter::by_urgency("High"));
        assert!(store.filtered_items().is_empty());

        let id = store.add(milk()).unwrap().id.clone();
        assert_eq!(store.filtered_items().len(), 1);

        store
            .edit(&id, ItemFields::new("Milk", "2").category("Dairy").urgency("Low"))
            .unwrap();
        assert!(store.filtered_items().is_empty());
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    #[test]
    fn restore_roundtrip() {
        let payload = r#"[{"id":"1","name":"Milk","quantity":"2","category":"Dairy","urgency":"High"}]"#;
        let store = ItemStore::open(
            MemoryKv::with_entry(STORAGE_KEY, payload),
            FieldProfile::GROCERY,
        );

        let expected = vec![Item::new("1".parse().unwrap(), milk())];
        assert_eq!(store.items(), expected.as_slice());

        store.persist().unwrap();
        let reopened = ItemStore::open(store.into_backend(), FieldProfile::GROCERY);
        assert_eq!(reopened.items(), expected.as_slice());
    }

    #[test]
    fn restore_without_saved_data_is_empty() {
        let store = ItemStore::open(MemoryKv::new(), FieldProfile::GROCERY);
        assert!(store.items().is_empty());
    }

    #[test]
    fn malformed_payload_starts_empty() {
        let mut store = ItemStore::open(
            MemoryKv::with_entry(STORAGE_KEY, "{not json"),
            FieldProfile::GROCERY,
        );
        assert!(store.items().is_empty());

        // The store is fully usable afterwards
        store.add(milk()).unwrap();
        assert_eq!(saved(&store).len(), 1);
    }

    #[test]
    fn restore_drops_repeated_ids() {
        let payload = r#"[
            {"id":"1","name":"Milk","quantity":"2"},
            {"id":"1","name":"Duplicate","quantity":"9"},
            {"id":"2","name":"Bread","quantity":"1"}
        ]"#;
        let store = ItemStore::open(
            MemoryKv::with_entry(STORAGE_KEY, payload),
            FieldProfile::BASIC,
        );

        let names: Vec<_> = store.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Milk", "Bread"]);
    }

    #[test]
    fn new_ids_never_collide_with_restored_ones() {
        let future = Utc::now().timestamp_millis() + 60_000;
        let payload = format!(r#"[{{"id":"{}","name":"Milk","quantity":"2"}}]"#, future);
        let mut store = ItemStore::open(
            MemoryKv::with_entry(STORAGE_KEY, payload),
            FieldProfile::BASIC,
        );

        let id = store.add(ItemFields::new("Bread", "1")).unwrap().id.clone();
        assert!(id.timestamp_millis().unwrap() > future);
    }

    #[test]
    fn unreadable_backend_starts_empty_and_usable() {
        let payload = r#"[{"id":"1","name":"Milk","quantity":"2"}]"#;
        let kv = MemoryKv::with_entry(STORAGE_KEY, payload);
        kv.fail_reads(true);

        let mut store = ItemStore::open(kv, FieldProfile::BASIC);
        assert!(store.items().is_empty());

        store.add(ItemFields::new("Bread", "1")).unwrap();
        store.backend().fail_reads(false);

        let names: Vec<_> = saved(&store).into_iter().map(|i| i.name).collect();
        assert_eq!(names, vec!["Bread"]);
    }

    #[test]
    fn add_after_restoring_largest_possible_id() {
        let payload = format!(r#"[{{"id":"{}","name":"Milk","quantity":"2"}}]"#, i64::MAX);
        let mut store = ItemStore::open(
            MemoryKv::with_entry(STORAGE_KEY, payload),
            FieldProfile::BASIC,
        );

        let first = store.add(ItemFields::new("Bread", "1")).unwrap().id.clone();
        let second = store.add(ItemFields::new("Eggs", "12")).unwrap().id.clone();

        assert_ne!(first.as_str(), i64::MAX.to_string());
        assert_ne!(first, second);
        assert_eq!(saved(&store).len(), 3);
    }

    #[test]
    fn write_failure_keeps_memory_authoritative() {
        let mut store = grocery_store();
        store.add(milk()).unwrap();
        store.backend().fail_writes(true);

        store.add(apples()).unwrap();
        assert_eq!(store.items().len(), 2);
        assert_eq!(saved(&store).len(), 1);

        store.backend().fail_writes(false);
        store.add(cheese()).unwrap();
        assert_eq!(saved(&store).len(), 3);
    }

    #[test]
    fn persist_reports_errors_when_called_directly() {
        let store = grocery_store();
        store.backend().fail_writes(true);
        assert!(matches!(store.persist(), Err(StoreError::Storage(_))));
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    #[test]
    fn listener_sees_every_change() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut store = grocery_store();
        {
            let seen = Rc::clone(&seen);
            store.subscribe(move |change, view| {
                seen.borrow_mut().push((change.clone(), view.filtered().len()));
            });
        }

        let id = store.add(milk()).unwrap().id.clone();
        store.set_filter(Filter::by_category("Fruits"));
        store.delete(&id);
        store.delete(&id);

        assert_eq!(
            *seen.borrow(),
            vec![
                (Change::Added(id.clone()), 1),
                (Change::FilterChanged, 0),
                (Change::Deleted(id), 0),
            ]
        );
    }

    #[test]
    fn rejected_command_does_not_notify() {
        let calls = Rc::new(RefCell::new(0));
        let mut store = grocery_store();
        {
            let calls = Rc::clone(&calls);
            store.subscribe(move |_, _| *calls.borrow_mut() += 1);
        }

        store.add(ItemFields::new("", "1")).unwrap_err();
        assert_eq!(*calls.borrow(), 0);
    }

    #[test]
    fn subscribe_replaces_previous_listener() {
        let first = Rc::new(RefCell::new(0));
        let second = Rc::new(RefCell::new(0));
        let mut store = grocery_store();
        {
            let first = Rc::clone(&first);
            store.subscribe(move |_, _| *first.borrow_mut() += 1);
        }
        {
            let second = Rc::clone(&second);
            store.subscribe(move |_, _| *second.borrow_mut() += 1);
        }

        store.add(milk()).unwrap();
        assert_eq!(*first.borrow(), 0);
        assert_eq!(*second.borrow(), 1);

        store.unsubscribe();
        store.add(apples()).unwrap();
        assert_eq!(*second.borrow(), 1);
    }

    // =========================================================================
    // Properties
    // =========================================================================

    #[derive(Debug, Clone)]
    enum Op {
        Add(String),
        Edit(usize, String),
        Delete(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            "[a-z]{0,6}".prop_map(Op::Add),
            (0usize..8, "[a-z]{1,6}").prop_map(|(i, n)| Op::Edit(i, n)),
            (0usize..8).prop_map(Op::Delete),
        ]
    }

    proptest! {
        #[test]
        fn ids_stay_unique(ops in prop::collection::vec(op(), 0..40)) {
            let mut store = ItemStore::new(MemoryKv::new(), FieldProfile::BASIC);

            for op in ops {
                match op {
                    Op::Add(name) => {
                        store.add(ItemFields::new(name, "1")).unwrap();
                    }
                    Op::Edit(i, name) => {
                        if let Some(id) = store.items().get(i).map(|item| item.id.clone()) {
                            store.edit(&id, ItemFields::new(name, "2")).unwrap();
                        }
                    }
                    Op::Delete(i) => {
                        if let Some(id) = store.items().get(i).map(|item| item.id.clone()) {
                            store.delete(&id);
                        }
                    }
                }

                let ids: HashSet<_> = store.items().iter().map(|item| &item.id).collect();
                prop_assert_eq!(ids.len(), store.items().len());
            }
        }

        #[test]
        fn filtered_view_is_ordered_subsequence(
            categories in prop::collection::vec(prop::sample::select(vec!["Dairy", "Fruits", "Meat"]), 0..20)
        ) {
            let mut store = ItemStore::new(MemoryKv::new(), FieldProfile::GROCERY);
            for (n, category) in categories.iter().enumerate() {
                store
                    .add(ItemFields::new(format!("item {}", n), "1").category(*category).urgency("Low"))
                    .unwrap();
            }

            store.set_filter(Filter::by_category("Dairy"));
            let visible: Vec<Item> = store.filtered_items().into_iter().cloned().collect();
            let expected: Vec<Item> = store
                .items()
                .iter()
                .filter(|item| item.category.as_deref() == Some("Dairy"))
                .cloned()
                .collect();

            prop_assert_eq!(visible, expected);
        }
    }
}

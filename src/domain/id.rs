//! Item identifiers
//!
//! IDs are the decimal millisecond timestamp of creation (e.g. `1718040000123`),
//! matching lists written by earlier versions of the app. Any non-empty token
//! is accepted when parsing, so hand-edited lists with ids like `"1"` still load.
//!
//! [`IdGenerator`] keeps issued ids strictly increasing within a process and
//! skips over ids that are already taken, so two items created in the same
//! millisecond never collide.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Item ID must not be empty")]
    Empty,

    #[error("Invalid item ID '{0}': must not contain whitespace")]
    Whitespace(String),
}

/// Identifier of a shopping list item
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    /// Returns the ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the numeric timestamp value, if the ID is timestamp-based
    pub fn timestamp_millis(&self) -> Option<i64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ItemId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(IdError::Empty);
        }
        if s.chars().any(char::is_whitespace) {
            return Err(IdError::Whitespace(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for ItemId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

/// Issues fresh, timestamp-based item IDs
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: Option<i64>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the generator so later ids sort after every timestamp id in `ids`
    pub fn observe<'a>(&mut self, ids: impl IntoIterator<Item = &'a ItemId>) {
        let max = ids.into_iter().filter_map(ItemId::timestamp_millis).max();
        if let Some(max) = max {
            self.last = Some(self.last.map_or(max, |last| last.max(max)));
        }
    }

    /// Returns an ID derived from `now` that `taken` does not report as in use
    pub fn next(&mut self, now: DateTime<Utc>, taken: impl Fn(&ItemId) -> bool) -> ItemId {
        let now = now.timestamp_millis();
        // Past i64::MAX there is no later id, so fall back to the clock and
        // rely on `taken` alone
        let mut millis = match self.last.and_then(|last| last.checked_add(1)) {
            Some(after_last) => now.max(after_last),
            None => now,
        };

        loop {
            let id = ItemId(millis.to_string());
            if !taken(&id) {
                self.last = Some(millis);
                return id;
            }
            millis = millis.checked_add(1).unwrap_or(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_timestamp_and_short_ids() {
        let id: ItemId = "1718040000123".parse().unwrap();
        assert_eq!(id.timestamp_millis(), Some(1_718_040_000_123));

        let id: ItemId = "1".parse().unwrap();
        assert_eq!(id.as_str(), "1");
    }

    #[test]
    fn rejects_empty_and_whitespace() {
        assert_eq!("".parse::<ItemId>(), Err(IdError::Empty));
        assert!("12 34".parse::<ItemId>().is_err());
    }

    #[test]
    fn non_numeric_ids_have_no_timestamp() {
        let id: ItemId = "milk".parse().unwrap();
        assert_eq!(id.timestamp_millis(), None);
    }

    #[test]
    fn generator_uses_timestamp() {
        let now = Utc::now();
        let id = IdGenerator::new().next(now, |_| false);
        assert_eq!(id.timestamp_millis(), Some(now.timestamp_millis()));
    }

    #[test]
    fn generator_is_strictly_increasing_within_one_millisecond() {
        let now = Utc::now();
        let mut ids = IdGenerator::new();

        let first = ids.next(now, |_| false);
        let second = ids.next(now, |_| false);

        assert_ne!(first, second);
        assert!(second.timestamp_millis() > first.timestamp_millis());
    }

    #[test]
    fn generator_skips_taken_ids() {
        let now = Utc::now();
        let taken = ItemId(now.timestamp_millis().to_string());

        let id = IdGenerator::new().next(now, |candidate| candidate == &taken);

        assert_ne!(id, taken);
        assert_eq!(id.timestamp_millis(), Some(now.timestamp_millis() + 1));
    }

    #[test]
    fn observe_moves_generator_past_existing_ids() {
        let now = Utc::now();
        let future: ItemId = (now.timestamp_millis() + 1000).to_string().parse().unwrap();
        let mut ids = IdGenerator::new();
        ids.observe([&future]);

        let id = ids.next(now, |_| false);
        assert!(id.timestamp_millis() > future.timestamp_millis());
    }

    #[test]
    fn generator_survives_largest_observed_id() {
        let now = Utc::now();
        let max: ItemId = i64::MAX.to_string().parse().unwrap();
        let mut ids = IdGenerator::new();
        ids.observe([&max]);

        let id = ids.next(now, |candidate| candidate == &max);
        assert_eq!(id.timestamp_millis(), Some(now.timestamp_millis()));
    }

    #[test]
    fn serde_roundtrip_is_a_plain_string() {
        let id: ItemId = "42".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"42\"");

        let parsed: ItemId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn serde_rejects_empty_id() {
        assert!(serde_json::from_str::<ItemId>("\"\"").is_err());
    }
}

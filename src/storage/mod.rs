//! # Storage Layer
//!
//! The item store and the key-value backends it persists into.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Items (file backend) | JSON array | `{data-dir}/shoppingItems.json` |
//! | Items (sqlite backend) | JSON array in a `kv` table | `{data-dir}/shop.db` |
//! | Config | TOML | `{data-dir}/config.toml` |
//!
//! Both backends hold the list under the single key [`STORAGE_KEY`].
//!
//! ## Concurrency Safety
//!
//! - [`ItemStore`] has a single owner; commands never interleave
//! - [`FileKv`] locks a sidecar `.lock` file (`fs2`) and writes atomically
//!   (temp file + rename)
//! - [`SqliteKv`] runs in WAL mode
//!
//! ## Key Types
//!
//! - [`ItemStore`] - In-memory list, filter and persistence
//! - [`KeyValueStore`] - Backend interface
//! - [`DataDir`] - Resolves the data directory and opens the configured store
//! - [`Config`] - User configuration

mod kv;
mod file;
mod sqlite;
mod store;
mod config;
mod data_dir;

pub use kv::{KeyValueStore, KvError, MemoryKv};
pub use file::FileKv;
pub use sqlite::SqliteKv;
pub use store::{Change, Command, ItemStore, Listener, StoreError, View, STORAGE_KEY};
pub use config::{Backend, Config, ConfigError, OutputFormat};
pub use data_dir::{DataDir, DataDirError, DynItemStore};

//! Data directory management
//!
//! Resolves where the shopping list lives, loads its configuration and opens
//! the configured backend.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use thiserror::Error;

use super::{Backend, Config, FileKv, ItemStore, KeyValueStore, SqliteKv};
use crate::domain::FieldProfile;

#[derive(Debug, Error)]
pub enum DataDirError {
    #[error("Could not determine a data directory; pass --data-dir or set SHOP_DATA_DIR")]
    NoDefault,
}

/// Item store over whichever backend the configuration selects
pub type DynItemStore = ItemStore<Box<dyn KeyValueStore>>;

const DEFAULT_CONFIG: &str = r#"# Shopping list configuration

# Field profile: "basic" (free-text category, no urgency, no validation),
# "grocery" or "household"
profile = "grocery"

# Where the list is stored: "file" (shoppingItems.json) or "sqlite" (shop.db)
backend = "file"

# Default output format: "text" or "json"
default_format = "text"
"#;

/// A directory holding the list and its configuration
pub struct DataDir {
    root: PathBuf,
    config: Config,
}

impl DataDir {
    /// Returns the platform default data directory
    pub fn default_root() -> Option<PathBuf> {
        ProjectDirs::from("dev", "shop", "shopping-list").map(|dirs| dirs.data_dir().to_path_buf())
    }

    /// Returns `explicit` if given, otherwise the platform default
    pub fn resolve_root(explicit: Option<PathBuf>) -> Result<PathBuf> {
        match explicit {
            Some(root) => Ok(root),
            None => Ok(Self::default_root().ok_or(DataDirError::NoDefault)?),
        }
    }

    /// Opens a data directory; it need not exist yet
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let config = Config::load(&root)?;

        Ok(Self { root, config })
    }

    /// Creates the directory and a commented default config (idempotent)
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create data directory: {}", root.display()))?;

        let config_path = Config::path(&root);
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        Self::open(root)
    }

    /// Returns the data directory path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a mutable reference to the configuration
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Returns the SQLite database path
    pub fn db_path(&self) -> PathBuf {
        self.root.join("shop.db")
    }

    /// Opens the configured backend
    pub fn backend(&self) -> Result<Box<dyn KeyValueStore>> {
        let backend: Box<dyn KeyValueStore> = match self.config.backend {
            Backend::File => Box::new(FileKv::new(&self.root)),
            Backend::Sqlite => Box::new(
                SqliteKv::open(self.db_path())
                    .with_context(|| format!("Failed to open {}", self.db_path().display()))?,
            ),
        };

        Ok(backend)
    }

    /// Opens the backend and restores the item store from it
    pub fn open_store(&self, profile: FieldProfile) -> Result<DynItemStore> {
        Ok(ItemStore::open(self.backend()?, profile))
    }
}

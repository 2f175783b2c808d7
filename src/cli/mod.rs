//! # Command-Line Interface
//!
//! The `shop` binary: the presentation layer over [`ItemStore`](crate::storage::ItemStore).
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `init` | Create the data directory and default config |
//! | `add`, `edit`, `delete` | Change the list |
//! | `list`, `show` | Read the list, `list` takes `--category`/`--urgency` |
//! | `share` | Print the list as shareable text |
//! | `categories`, `config` | Inspect the active profile and configuration |
//!
//! ## Output Formats
//!
//! All commands support the `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Data Directory
//!
//! `--data-dir` (or `SHOP_DATA_DIR`) picks where the list lives; otherwise the
//! platform data directory is used.
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod item;
mod share;
mod logging;

pub use app::{run, Cli, Commands, Session};
pub use output::{Output, OutputFormat};
pub use share::share_text;

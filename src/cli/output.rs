//! Output formatting for CLI commands

use anyhow::Result;
use serde::Serialize;

use crate::storage;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<storage::OutputFormat> for OutputFormat {
    fn from(format: storage::OutputFormat) -> Self {
        match format {
            storage::OutputFormat::Text => OutputFormat::Text,
            storage::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Prints each command result as either text or a single JSON document
pub struct Output {
    format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Serializes `data` on one line in JSON mode, otherwise runs `text`
    pub fn emit<T: Serialize>(&self, data: &T, text: impl FnOnce()) -> Result<()> {
        match self.format {
            OutputFormat::Text => text(),
            OutputFormat::Json => println!("{}", serde_json::to_string(data)?),
        }
        Ok(())
    }
}

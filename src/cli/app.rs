//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::item::{self, FieldUpdates, FilterArgs};
use super::logging;
use super::output::{Output, OutputFormat};
use crate::domain::{FieldProfile, ItemFields, ProfileKind};
use crate::storage::{Config, DataDir, DynItemStore};

#[derive(Parser)]
#[command(name = "shop")]
#[command(author, version, about = "Local-first shopping list")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the configured format)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Directory holding the list and config.toml
    #[arg(long, global = true, env = "SHOP_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Field profile, overriding the configured one
    #[arg(long, global = true, env = "SHOP_PROFILE")]
    pub profile: Option<ProfileKind>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the data directory with a default config
    Init,

    /// Add an item to the list
    Add {
        /// Item name
        name: String,

        /// Quantity (free text, e.g. "2" or "1 kg")
        quantity: String,

        /// Category
        #[arg(long, short)]
        category: Option<String>,

        /// Urgency (Low, Medium, High)
        #[arg(long, short)]
        urgency: Option<String>,
    },

    /// Edit an item; fields not given keep their value
    Edit {
        /// Item ID
        id: String,

        /// New name
        #[arg(long, short)]
        name: Option<String>,

        /// New quantity
        #[arg(long, short)]
        quantity: Option<String>,

        /// New category
        #[arg(long, short)]
        category: Option<String>,

        /// New urgency
        #[arg(long, short)]
        urgency: Option<String>,
    },

    /// Delete an item
    Delete {
        /// Item ID
        id: String,
    },

    /// List items, optionally filtered
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Show item details
    Show {
        /// Item ID
        id: String,
    },

    /// Print the list as shareable text
    Share {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Show the categories and urgencies of the active profile
    Categories,

    /// Show the effective configuration
    Config,
}

/// Resolved data directory plus the profile in effect for this invocation
pub struct Session {
    data: DataDir,
    profile: ProfileKind,
}

impl Session {
    pub fn new(data: DataDir, profile_override: Option<ProfileKind>) -> Self {
        let profile = profile_override.unwrap_or(data.config().profile);
        Self { data, profile }
    }

    pub fn data(&self) -> &DataDir {
        &self.data
    }

    pub fn profile_kind(&self) -> ProfileKind {
        self.profile
    }

    pub fn profile(&self) -> FieldProfile {
        self.profile.profile()
    }

    /// Opens the configured backend and restores the list
    pub fn open_store(&self) -> Result<DynItemStore> {
        tracing::debug!(
            data_dir = %self.data.root().display(),
            profile = self.profile.as_str(),
            backend = self.data.config().backend.as_str(),
            "opening item store"
        );
        self.data.open_store(self.profile())
    }
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let root = DataDir::resolve_root(cli.data_dir)?;

    let data = match cli.command {
        Commands::Init => DataDir::init(&root)?,
        _ => DataDir::open(&root)?,
    };

    let format = cli
        .format
        .unwrap_or_else(|| data.config().default_format.into());
    let output = Output::new(format);
    let session = Session::new(data, cli.profile);

    match cli.command {
        Commands::Init => {
            let root = session.data().root();
            let result = serde_json::json!({ "data_dir": root.display().to_string() });
            output.emit(&result, || {
                println!("Initialized shopping list at {}", root.display())
            })?
        }

        Commands::Add {
            name,
            quantity,
            category,
            urgency,
        } => {
            let fields = ItemFields {
                name,
                quantity,
                category,
                urgency,
            };
            item::add(&session, &output, fields)?
        }

        Commands::Edit {
            id,
            name,
            quantity,
            category,
            urgency,
        } => {
            let updates = FieldUpdates {
                name,
                quantity,
                category,
                urgency,
            };
            item::edit(&session, &output, &id, updates)?
        }

        Commands::Delete { id } => item::delete(&session, &output, &id)?,
        Commands::List { filter } => item::list(&session, &output, &filter)?,
        Commands::Show { id } => item::show(&session, &output, &id)?,
        Commands::Share { filter } => item::share(&session, &output, &filter)?,
        Commands::Categories => item::categories(&session, &output)?,
        Commands::Config => show_config(&session, &output)?,
    }

    tracing::debug!("command completed");
    Ok(())
}

/// Prints the effective configuration
fn show_config(session: &Session, output: &Output) -> Result<()> {
    let data = session.data();
    let config = data.config();
    let config_path = Config::path(data.root());

    let summary = serde_json::json!({
        "data_dir": data.root().display().to_string(),
        "config_file": config_path.display().to_string(),
        "config_file_exists": config_path.exists(),
        "profile": session.profile_kind().as_str(),
        "backend": config.backend.as_str(),
        "default_format": config.default_format,
    });

    output.emit(&summary, || {
        println!("Data directory: {}", data.root().display());
        let note = if config_path.exists() { "" } else { " (not created, using defaults)" };
        println!("Config file:    {}{}", config_path.display(), note);
        println!("Profile:        {}", session.profile_kind().as_str());
        println!("Backend:        {}", config.backend.as_str());
    })
}

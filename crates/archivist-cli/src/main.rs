//! Archivist command-line interface.
//!
//! Shelve documents into version-controlled collections and browse their
//! editions.
//!
//! # Quick Start
//!
//! ```bash
//! # Initialize a project
//! archivist init ./shelf
//!
//! # Shelve a document (prints the new collection id)
//! archivist -C ./shelf shelve '{"record_type": 1, "title": "Report", ...}'
//!
//! # Browse it
//! archivist -C ./shelf editions 1
//! ```

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Archivist - a card catalog for versioned documents.
#[derive(Parser)]
#[command(name = "archivist")]
#[command(author, version, long_about = None)]
#[command(about = "Archivist - a card catalog for versioned documents.")]
#[command(propagate_version = true)]
struct Cli {
    /// Project directory containing archivist.toml.
    #[arg(short = 'C', long, global = true, default_value = ".")]
    project: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information.
    Version,

    /// Initialize a new catalog project.
    Init {
        /// Path to the project directory to create.
        path: PathBuf,

        /// Enable development mode (no fsync, debug logging).
        #[arg(long)]
        development: bool,
    },

    /// Show catalog counts and the state hash.
    Status,

    /// Shelve a new collection from a record JSON object.
    Shelve {
        /// Record payload as JSON.
        payload: String,
    },

    /// Show a collection with its current edition.
    Show {
        /// Collection ID.
        collection_id: u64,
    },

    /// Shelve the next edition of a collection.
    AddEdition {
        /// Collection ID.
        collection_id: u64,

        /// Record payload as JSON.
        payload: String,
    },

    /// List every edition of a collection.
    Editions {
        /// Collection ID.
        collection_id: u64,
    },

    /// Show one edition of a collection.
    Edition {
        /// Collection ID.
        collection_id: u64,

        /// Edition number, starting at 1.
        edition: u64,
    },

    /// Tag management commands.
    #[command(subcommand)]
    Tag(TagCommands),
}

#[derive(Subcommand)]
enum TagCommands {
    /// Register a new tag.
    Create {
        /// Tag name.
        name: String,
    },

    /// Attach an existing tag to a collection.
    Attach {
        /// Collection ID.
        collection_id: u64,

        /// Tag name.
        name: String,
    },

    /// List the tags of a collection.
    List {
        /// Collection ID.
        collection_id: u64,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let project = cli.project;

    match cli.command {
        Commands::Version => {
            commands::version::run();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Init { path, development } => {
            commands::init::run(&path, development)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Status => commands::status::run(&project),
        Commands::Shelve { payload } => commands::collection::shelve(&project, &payload),
        Commands::Show { collection_id } => commands::collection::show(&project, collection_id),
        Commands::AddEdition {
            collection_id,
            payload,
        } => commands::collection::add_edition(&project, collection_id, &payload),
        Commands::Editions { collection_id } => {
            commands::collection::editions(&project, collection_id)
        }
        Commands::Edition {
            collection_id,
            edition,
        } => commands::collection::edition(&project, collection_id, edition),
        Commands::Tag(cmd) => match cmd {
            TagCommands::Create { name } => commands::tag::create(&project, &name),
            TagCommands::Attach {
                collection_id,
                name,
            } => commands::tag::attach(&project, collection_id, &name),
            TagCommands::List { collection_id } => commands::tag::list(&project, collection_id),
        },
    }
}

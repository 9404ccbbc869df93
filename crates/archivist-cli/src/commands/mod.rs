//! CLI command implementations.

pub mod collection;
pub mod init;
pub mod status;
pub mod tag;
pub mod version;

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use archivist::{Catalog, CatalogConfig, LogStore};
use archivist_config::ArchivistConfig;
use archivist_wire::{Request, RequestHandler, Response};
use tracing_subscriber::EnvFilter;

/// A loaded project: its configuration and an open catalog.
pub struct Session {
    pub config: ArchivistConfig,
    pub handler: RequestHandler<LogStore>,
}

impl Session {
    /// Loads the project configuration, installs logging, and opens the
    /// catalog log in the configured data directory.
    pub fn open(project_dir: &Path) -> Result<Self> {
        let config = ArchivistConfig::load_from_dir(project_dir).with_context(|| {
            format!("Failed to load configuration in {}", project_dir.display())
        })?;

        init_logging(&config.logging.filter);

        let catalog_config =
            CatalogConfig::new(&config.catalog.data_dir).with_fsync(config.catalog.fsync);
        let catalog = Catalog::open(catalog_config).with_context(|| {
            format!(
                "Failed to open catalog at {}",
                config.catalog.data_dir.display()
            )
        })?;

        Ok(Self {
            config,
            handler: RequestHandler::new(catalog),
        })
    }

    /// Dispatches a request and prints the response envelope.
    pub fn dispatch(&self, request: Request) -> Result<ExitCode> {
        let response = self.handler.handle(request);
        print_response(&response)
    }
}

/// Opens the project and dispatches one request.
pub fn dispatch(project_dir: &Path, request: Request) -> Result<ExitCode> {
    Session::open(project_dir)?.dispatch(request)
}

/// Prints the envelope as pretty JSON. A failed request exits non-zero.
pub fn print_response(response: &Response) -> Result<ExitCode> {
    let json = response
        .to_json_pretty()
        .context("Failed to encode response")?;
    println!("{json}");

    Ok(if response.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Installs the fmt subscriber on stderr. `RUST_LOG` wins over the
/// configured filter.
fn init_logging(filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // A second install (tests driving several commands) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Parses a JSON argument.
pub fn parse_payload(payload: &str) -> Result<serde_json::Value> {
    serde_json::from_str(payload).context("Payload is not valid JSON")
}

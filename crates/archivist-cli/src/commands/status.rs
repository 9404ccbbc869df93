//! Status command - show catalog counts and fingerprint.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;

use super::Session;

pub fn run(project_dir: &Path) -> Result<ExitCode> {
    let session = Session::open(project_dir)?;
    let stats = session.handler.catalog().stats()?;

    println!("Catalog Status");
    println!("--------------");
    println!("Project:     {}", session.config.project.name);
    println!("Data dir:    {}", session.config.catalog.data_dir.display());
    println!("Collections: {}", stats.collections);
    println!("Records:     {}", stats.records);
    println!("Tags:        {}", stats.tags);
    println!("Batches:     {}", stats.store.batches_committed);
    println!("State hash:  {}", stats.state_hash);

    Ok(ExitCode::SUCCESS)
}

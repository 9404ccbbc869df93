//! Initialize command - creates a new Archivist project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use archivist_config::{ArchivistConfig, Paths};

const GITIGNORE: &str = r"# Archivist local state and data
.archivist/

# Local config overrides (not tracked in git)
archivist.local.toml
";

pub fn run(project_dir: &Path, development: bool) -> Result<()> {
    if Paths::is_initialized(project_dir) {
        anyhow::bail!(
            "Project already initialized in {}. archivist.toml already exists.",
            project_dir.display()
        );
    }

    fs::create_dir_all(project_dir).context("Failed to create project directory")?;

    let config = if development {
        ArchivistConfig::development()
    } else {
        ArchivistConfig::default()
    };

    // The data directory is created relative to the project, as the loader
    // resolves it
    let mut resolved = config.clone();
    resolved.resolve_paths(project_dir);
    fs::create_dir_all(&resolved.catalog.data_dir).context("Failed to create data directory")?;

    let config_path = Paths::project_config_file(project_dir);
    fs::write(&config_path, config.to_toml()?).context("Failed to write archivist.toml")?;

    let gitignore_path = project_dir.join(".gitignore");
    if !gitignore_path.exists() {
        fs::write(&gitignore_path, GITIGNORE).context("Failed to write .gitignore")?;
    }

    println!("Initialized Archivist project in {}", project_dir.display());
    println!("  Config:   {}", config_path.display());
    println!("  Data dir: {}", resolved.catalog.data_dir.display());
    if development {
        println!("  Mode:     development (fsync off)");
    }

    Ok(())
}

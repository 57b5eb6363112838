//! Initialize a skein repository

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use skein_core::{Repository, META_DIR};

pub fn run() -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let repo = Repository::init(&cwd)?;
    let config = repo.config()?;

    println!(
        "{} empty skein repository in {}",
        "Initialized".green().bold(),
        repo.root().join(META_DIR).display()
    );
    println!(
        "{}",
        format!(
            "Commits are recorded as '{}' on branch '{}'",
            config.user.name, config.branch.default
        )
        .dimmed()
    );
    Ok(())
}

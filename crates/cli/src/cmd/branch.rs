//! Create, delete, rename and list branches

use crate::util::{self, Session};
use anyhow::Result;
use owo_colors::OwoColorize;

pub fn create(name: &str, at: Option<&str>) -> Result<()> {
    let session = Session::open()?;

    let commit = match at {
        Some(reference) => util::resolve_commit_ref(&session, reference)?,
        None => match session.head_commit()? {
            Some(head) => head,
            None => anyhow::bail!("No commit to branch from: commit something first"),
        },
    };

    session.refs.create_branch(name, commit.hash)?;
    session.refs.save_head_branch(name)?;

    println!(
        "{} branch '{}' at {}",
        "Created".green(),
        name.cyan(),
        commit.hash.short(12).yellow()
    );
    Ok(())
}

pub fn delete(name: &str) -> Result<()> {
    let session = Session::open()?;
    session.refs.delete_branch(name)?;
    println!("{} branch '{}'", "Deleted".green(), name);
    Ok(())
}

pub fn rename(old: &str, new: &str) -> Result<()> {
    let session = Session::open()?;
    session.refs.rename_branch(old, new)?;
    println!("{} '{}' to '{}'", "Renamed".green(), old, new.cyan());
    Ok(())
}

pub fn list() -> Result<()> {
    let session = Session::open()?;
    let current = session.refs.head_branch()?;
    let branches = session.refs.list_branches()?;

    if branches.is_empty() {
        println!("{}", "No branches yet".dimmed());
        return Ok(());
    }

    for (name, hash) in branches {
        let target = hash.map(|h| h.short(12)).unwrap_or_else(|| "(empty)".to_string());
        if current.as_deref() == Some(name.as_str()) {
            println!("* {} {}", name.green().bold(), target.yellow());
        } else {
            println!("  {} {}", name, target.dimmed());
        }
    }
    Ok(())
}

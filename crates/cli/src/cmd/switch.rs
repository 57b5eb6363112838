//! Switch to a branch

use crate::util::Session;
use anyhow::Result;
use owo_colors::OwoColorize;

pub fn run(branch: &str) -> Result<()> {
    let session = Session::open()?;

    let Some(commit) = session.branch_head(branch)? else {
        anyhow::bail!("Branch '{}' not found or has no commits", branch);
    };

    session.graph.apply_commit(&commit)?;
    session.refs.save_head(commit.hash)?;
    session.refs.save_head_branch(branch)?;

    println!(
        "{} '{}' at {}",
        "Switched to branch".green(),
        branch.cyan(),
        commit.hash.short(12).yellow()
    );
    Ok(())
}

//! Materialize a commit in the working tree

use crate::util::{self, Session};
use anyhow::Result;
use owo_colors::OwoColorize;

pub fn run(reference: &str) -> Result<()> {
    let session = Session::open()?;
    let commit = util::resolve_commit_ref(&session, reference)?;

    session.graph.apply_commit(&commit)?;
    session.refs.save_head(commit.hash)?;

    println!(
        "{} {} {}",
        "HEAD is now at".green(),
        commit.hash.short(12).yellow(),
        commit.message
    );
    Ok(())
}

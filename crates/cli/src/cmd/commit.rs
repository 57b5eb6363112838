//! Record the working tree as a commit

use crate::util::Session;
use anyhow::Result;
use owo_colors::OwoColorize;

pub fn run(message: &[String]) -> Result<()> {
    let session = Session::open()?;
    let message = message.join(" ");

    let head = session.head_commit()?;
    let parents: Vec<_> = head.into_iter().collect();

    let Some(commit) = session
        .graph
        .create_commit(&session.config.user.name, &message, &parents)?
    else {
        println!("{}", "Nothing to commit".dimmed());
        return Ok(());
    };

    // The first commit starts the default branch
    if session.refs.head_branch()?.is_none() {
        session.refs.save_head_branch(&session.config.branch.default)?;
    }
    session.advance_head(&commit)?;

    let branch = session.refs.head_branch()?.unwrap_or_default();
    println!(
        "[{} {}] {}",
        branch.cyan(),
        commit.hash.short(12).yellow(),
        commit.message
    );
    println!(
        "{}",
        format!("{} files tracked", commit.objects.len()).dimmed()
    );
    Ok(())
}

//! Display commit history

use crate::util::{self, Session};
use anyhow::Result;
use owo_colors::OwoColorize;
use skein_history::walk;

pub fn run(limit: Option<usize>, oneline: bool) -> Result<()> {
    let session = Session::open()?;

    let Some(head) = session.head_commit()? else {
        println!("{}", "No commits yet".dimmed());
        return Ok(());
    };

    let commits = walk::log(&session.graph, &head)?;
    let limit = limit.or(session.config.log.limit).unwrap_or(commits.len());
    let branches = session.branches_by_commit()?;

    for commit in commits.iter().take(limit) {
        if oneline {
            util::print_commit_short(commit);
        } else {
            util::print_commit(commit, branches.get(&commit.hash));
        }
    }

    if commits.len() > limit {
        println!(
            "{}",
            format!("... {} more commits", commits.len() - limit).dimmed()
        );
    }
    Ok(())
}

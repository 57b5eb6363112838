//! Commits that changed one path

use crate::util::{self, Session};
use anyhow::Result;
use owo_colors::OwoColorize;
use skein_history::walk;

pub fn run(path: &str) -> Result<()> {
    let session = Session::open()?;
    let path = path.trim_start_matches("./");

    let Some(head) = session.head_commit()? else {
        println!("{}", "No commits yet".dimmed());
        return Ok(());
    };

    let commits = walk::file_history(&session.graph, &head, path)?;
    if commits.is_empty() {
        println!("{}", format!("No history for {}", path).dimmed());
        return Ok(());
    }

    println!("{} {}", "History of".bold(), path.cyan());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    for commit in &commits {
        let hash = commit.hash_for(path).map(|h| h.short(12)).unwrap_or_default();
        println!(
            "{} {} {} {}",
            commit.hash.short(12).yellow(),
            util::format_time(commit.timestamp).dimmed(),
            hash.dimmed(),
            commit.message
        );
    }
    Ok(())
}

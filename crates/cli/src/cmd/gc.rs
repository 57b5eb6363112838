//! Run garbage collection

use crate::util::Session;
use anyhow::Result;
use owo_colors::OwoColorize;
use skein_history::{GarbageCollector, GcOptions};

pub fn run(dry_run: bool) -> Result<()> {
    let session = Session::open()?;

    // HEAD counts as a root so a checked-out commit is never collected
    let mut heads = session.refs.all_branch_heads()?;
    if let Some(head) = session.refs.head()? {
        if !heads.contains(&head) {
            heads.push(head);
        }
    }

    println!("{}", "Running Garbage Collection...".bold());
    println!();

    let gc = GarbageCollector::new(GcOptions { dry_run });
    let metrics = gc.collect(&session.graph, &heads)?;

    if dry_run {
        println!("{}", "GC Dry Run".yellow().bold());
    } else {
        println!("{}", "GC Complete".green().bold());
    }
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();

    if metrics.commits_deleted == 0 {
        println!("{}", "No garbage found - repository is already clean".dimmed());
    } else {
        let verb = if dry_run { "would be deleted" } else { "deleted" };
        println!("Commits scanned:  {}", metrics.commits_scanned);
        println!("Commits retained: {}", metrics.commits_retained.to_string().green());
        println!("Commits {}: {}", verb, metrics.commits_deleted.to_string().yellow());
    }
    Ok(())
}

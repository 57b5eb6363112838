//! Merge two commits into the working tree

use crate::util::{self, Session};
use anyhow::Result;
use owo_colors::OwoColorize;
use skein_history::{merge, Commit, MergeOutcome};

pub fn run(a: &str, b: &str, no_force: bool) -> Result<()> {
    let session = Session::open()?;
    let x = util::resolve_commit_ref(&session, a)?;
    let y = util::resolve_commit_ref(&session, b)?;

    let force = session.config.merge.force && !no_force;
    merge_commits(&session, &x, &y, force)?;
    Ok(())
}

/// Run the merge and report it; true when the working tree was updated
pub(crate) fn merge_commits(session: &Session, x: &Commit, y: &Commit, force: bool) -> Result<bool> {
    let outcome = merge(&session.graph, &session.config.user.name, x, y, force)?;

    match &outcome {
        MergeOutcome::Applied { base, resolved } => {
            println!(
                "{} {} and {} (base {})",
                "Merged".green().bold(),
                x.hash.short(12).yellow(),
                y.hash.short(12).yellow(),
                base.short(12).dimmed()
            );
            for path in resolved {
                println!("  {} {}", "interleaved".yellow(), path);
            }
        }
        MergeOutcome::Aborted { conflicts, .. } => {
            println!("{}", "Merge aborted: conflicting changes".red().bold());
            for path in conflicts {
                println!("  {} {}", "conflict".red(), path);
            }
            println!();
            println!("{}", "Working tree left untouched. Drop --no-force to interleave.".dimmed());
        }
    }

    Ok(outcome.is_applied())
}

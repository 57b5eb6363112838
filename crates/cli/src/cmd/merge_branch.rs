//! Merge a branch into the current branch and commit the result

use crate::cmd::merge::merge_commits;
use crate::util::Session;
use anyhow::Result;
use owo_colors::OwoColorize;

pub fn run(branch: &str, no_force: bool) -> Result<()> {
    let session = Session::open()?;

    let current = session.refs.head_branch()?;
    let other_head = session.branch_head(branch)?;
    let current_head = match &current {
        Some(name) => session.branch_head(name)?,
        None => None,
    };

    let (Some(current), Some(other_head), Some(current_head)) = (current, other_head, current_head)
    else {
        println!("{}", "Merge not possible".yellow());
        return Ok(());
    };
    if other_head.hash == current_head.hash {
        println!("{}", "Merge not possible".yellow());
        return Ok(());
    }

    let force = session.config.merge.force && !no_force;
    if !merge_commits(&session, &other_head, &current_head, force)? {
        return Ok(());
    }

    let message = format!("Merge {} into {}", branch, current);
    let parents = [other_head.clone(), current_head];
    match session
        .graph
        .create_commit(&session.config.user.name, &message, &parents)?
    {
        Some(commit) => {
            session.advance_head(&commit)?;
            println!(
                "[{} {}] {}",
                current.cyan(),
                commit.hash.short(12).yellow(),
                commit.message
            );
        }
        None => {
            // Merged tree is exactly the branch head: fast-forward
            session.refs.save_head(other_head.hash)?;
            session.refs.update_head_branch(other_head.hash)?;
            println!(
                "{} {} to {}",
                "Fast-forward".green(),
                current.cyan(),
                other_head.hash.short(12).yellow()
            );
        }
    }
    Ok(())
}

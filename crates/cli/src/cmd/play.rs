//! Step through history one commit at a time
//!
//! `l` moves to the first parent, `r` to the first child; any other input
//! exits.

use crate::util::Session;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use skein_history::walk::{find_child, first_parent};
use std::io::{BufRead, Write};

pub fn run() -> Result<()> {
    let session = Session::open()?;
    let stdin = std::io::stdin();
    navigate(&session, stdin.lock())
}

pub(crate) fn navigate<R: BufRead>(session: &Session, input: R) -> Result<()> {
    let Some(mut current) = session.head_commit()? else {
        println!("{}", "No commits yet".dimmed());
        return Ok(());
    };

    println!("{}", "l: parent  r: child  anything else: quit".dimmed());
    show(&current);

    for line in input.lines() {
        let line = line.context("Failed to read input")?;
        let next = match line.trim() {
            "l" => first_parent(&session.graph, &current)?,
            "r" => find_child(&session.graph, &current)?,
            _ => break,
        };

        match next {
            Some(commit) => {
                session.graph.apply_commit(&commit)?;
                session.refs.save_head(commit.hash)?;
                current = commit;
                show(&current);
            }
            None => println!("{}", "No commit in that direction".dimmed()),
        }
    }
    Ok(())
}

fn show(commit: &skein_history::Commit) {
    print!("{} {} > ", commit.hash.short(12).yellow(), commit.message);
    let _ = std::io::stdout().flush();
}

//! Search commit messages by similarity

use crate::util::Session;
use anyhow::Result;
use owo_colors::OwoColorize;
use skein_history::{search_commits, SimilarityMetric};

pub fn run(query: &[String], metric: SimilarityMetric) -> Result<()> {
    let session = Session::open()?;
    let query = query.join(" ");

    let results = search_commits(session.graph.all_commits()?, &query, metric);
    if results.is_empty() {
        println!("{}", format!("No commits match '{}'", query).dimmed());
        return Ok(());
    }

    for (score, commit) in results {
        println!(
            "{} {} {}",
            format!("{:.2}", score).green(),
            commit.hash.short(12).yellow(),
            commit.message
        );
    }
    Ok(())
}

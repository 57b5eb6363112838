//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use skein_core::{Blake3Hash, RepoConfig, Repository};
use skein_history::{Commit, CommitGraph, RefStore};
use std::collections::HashMap;
use std::path::Path;

/// Handles every command needs, opened from the repository enclosing cwd
pub struct Session {
    pub graph: CommitGraph,
    pub refs: RefStore,
    pub config: RepoConfig,
}

impl Session {
    pub fn open() -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;
        Self::open_at(&cwd)
    }

    pub fn open_at(start: &Path) -> Result<Self> {
        let repo = Repository::discover(start)
            .context("Not a skein repository (no .skein directory found)")?;
        let config = repo.config()?;
        tracing::debug!("Opened repository at {}", repo.root().display());
        Ok(Self {
            graph: CommitGraph::new(repo.clone()),
            refs: RefStore::new(repo),
            config,
        })
    }

    pub fn repo(&self) -> &Repository {
        self.graph.repo()
    }

    /// Commit HEAD points at, if any
    pub fn head_commit(&self) -> Result<Option<Commit>> {
        self.refs.head()?.map(|h| self.graph.load(h)).transpose()
    }

    /// Head commit of a branch; missing or empty branches yield `None`
    pub fn branch_head(&self, name: &str) -> Result<Option<Commit>> {
        self.refs
            .branch_commit(name)?
            .map(|h| self.graph.load(h))
            .transpose()
    }

    /// Commit hash -> branch names pointing at it
    pub fn branches_by_commit(&self) -> Result<HashMap<Blake3Hash, Vec<String>>> {
        let mut by_commit: HashMap<Blake3Hash, Vec<String>> = HashMap::new();
        for (name, hash) in self.refs.list_branches()? {
            if let Some(hash) = hash {
                by_commit.entry(hash).or_default().push(name);
            }
        }
        Ok(by_commit)
    }

    /// Point HEAD (and the current branch) at a freshly recorded commit
    pub fn advance_head(&self, commit: &Commit) -> Result<()> {
        self.graph.record(commit)?;
        self.refs.save_head(commit.hash)?;
        self.refs.update_head_branch(commit.hash)
    }
}

/// Resolve a commit reference to a commit
///
/// Supports:
/// - Full hash: 64 hex chars
/// - Hash prefix: at least 4 chars, must be unique among indexed commits
/// - Branch name
pub fn resolve_commit_ref(session: &Session, reference: &str) -> Result<Commit> {
    let reference = reference.trim();

    if reference.len() == 64 {
        if let Ok(hash) = Blake3Hash::from_hex(reference) {
            if session.graph.contains(hash) {
                return session.graph.load(hash);
            }
            anyhow::bail!("Commit not found: {}", reference);
        }
    }

    if reference.len() >= 4 && reference.chars().all(|c| c.is_ascii_hexdigit()) {
        let prefix = reference.to_ascii_lowercase();
        let matching: Vec<Blake3Hash> = session
            .graph
            .index_hashes()?
            .into_iter()
            .filter(|h| h.to_hex().starts_with(&prefix))
            .collect();

        match matching.as_slice() {
            [hash] => return session.graph.load(*hash),
            [] => {}
            _ => anyhow::bail!(
                "Ambiguous commit prefix '{}': matches {} commits",
                reference,
                matching.len()
            ),
        }
    }

    if let Some(commit) = session.branch_head(reference)? {
        return Ok(commit);
    }

    anyhow::bail!("Commit not found: {}", reference)
}

/// Format a unix timestamp as local time
pub fn format_time(timestamp: i64) -> String {
    match chrono::DateTime::from_timestamp(timestamp, 0) {
        Some(utc) => utc
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => timestamp.to_string(),
    }
}

/// Print a commit in the long log format
pub fn print_commit(commit: &Commit, branches: Option<&Vec<String>>) {
    print!("{} {}", "commit".yellow(), commit.hash.to_hex().yellow());
    if let Some(names) = branches {
        let mut names = names.clone();
        names.sort();
        print!(" ({})", names.join(", ").cyan());
    }
    println!();

    if commit.is_merge() {
        let parents: Vec<String> = commit.parents.iter().map(|p| p.short(12)).collect();
        println!("Merge:  {}", parents.join(" "));
    }
    println!("Author: {}", commit.user);
    println!("Date:   {}", format_time(commit.timestamp).dimmed());
    println!("Files:  {}", commit.objects.len());
    println!();
    println!("    {}", commit.message);
    println!();
}

/// Print a commit as one line: short hash and message
pub fn print_commit_short(commit: &Commit) {
    println!("{} {}", commit.hash.short(12).yellow(), commit.message);
}

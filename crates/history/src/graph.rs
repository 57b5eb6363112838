//! Commit graph storage
//!
//! Commits live one per file under `.skein/commits/`. The flat `index`
//! file lists every known commit hash so "all commits" never needs a
//! directory walk.

use crate::commit::Commit;
use crate::error::HistoryError;
use anyhow::{Context, Result};
use dashmap::DashMap;
use skein_core::snapshot::{clear_working_tree, restore_objects};
use skein_core::{Blake3Hash, CoreError, Object, Repository, Snapshot};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Commit DAG backed by a repository's `commits/` directory
pub struct CommitGraph {
    repo: Repository,
    /// Parsed commits (hash -> commit)
    cache: DashMap<Blake3Hash, Arc<Commit>>,
}

impl CommitGraph {
    pub fn new(repo: Repository) -> Self {
        Self {
            repo,
            cache: DashMap::new(),
        }
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }

    /// Snapshot the working tree and record it as a commit
    ///
    /// Returns `None` ("nothing to commit") when the snapshot matches the
    /// first parent's path/hash pairs exactly.
    pub fn create_commit(
        &self,
        user: &str,
        message: &str,
        parents: &[Commit],
    ) -> Result<Option<Commit>> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("System clock is before the unix epoch")?
            .as_secs() as i64;
        self.create_commit_at(user, message, parents, now)
    }

    /// [`create_commit`](Self::create_commit) with an explicit timestamp
    pub fn create_commit_at(
        &self,
        user: &str,
        message: &str,
        parents: &[Commit],
        timestamp: i64,
    ) -> Result<Option<Commit>> {
        if user.contains('\n') {
            return Err(CoreError::InvalidArgument("user name cannot contain a newline".into()).into());
        }
        if message.contains('\n') {
            return Err(CoreError::InvalidArgument("commit message cannot contain a newline".into()).into());
        }

        // Snapshot fully before hashing
        let snapshot = Snapshot::capture(&self.repo)?;
        check_recordable(&snapshot.objects)?;

        if let Some(first) = parents.first() {
            if same_tree(&snapshot.objects, &first.objects) {
                tracing::info!("Nothing to commit (tree matches {})", first.hash.short(12));
                return Ok(None);
            }
        }

        let hash = Commit::compute_hash(&snapshot.objects, timestamp);
        if self.commit_path(hash).exists() {
            return Err(HistoryError::DuplicateCommit(hash).into());
        }

        let commit = Commit {
            user: user.to_string(),
            hash,
            objects: snapshot.objects,
            parents: parents.iter().map(|p| p.hash).collect(),
            timestamp,
            message: message.to_string(),
        };
        self.save_commit(&commit)?;

        tracing::info!(
            "Created commit {} ({} files, {} parents)",
            hash.short(12),
            commit.objects.len(),
            commit.parents.len()
        );
        Ok(Some(commit))
    }

    fn save_commit(&self, commit: &Commit) -> Result<()> {
        let path = self.commit_path(commit.hash);
        self.repo
            .write_meta(&path, commit.serialize().as_bytes())
            .with_context(|| format!("Failed to write commit {}", commit.hash))?;
        self.cache.insert(commit.hash, Arc::new(commit.clone()));
        tracing::debug!("Stored commit {}", commit.hash);
        Ok(())
    }

    /// Look up a commit by hex id
    ///
    /// An empty id is the "no commit" sentinel and yields `None`; a
    /// non-empty id that is not stored is a `NotFound` error.
    pub fn get_commit(&self, id: &str) -> Result<Option<Commit>> {
        let id = id.trim();
        if id.is_empty() {
            return Ok(None);
        }
        let hash = Blake3Hash::from_hex(id).map_err(|_| CoreError::not_found("commit", id))?;
        self.load(hash).map(Some)
    }

    /// Load a commit that is expected to exist
    pub fn load(&self, hash: Blake3Hash) -> Result<Commit> {
        if let Some(cached) = self.cache.get(&hash) {
            return Ok((**cached).clone());
        }

        let path = self.commit_path(hash);
        if !path.exists() {
            return Err(CoreError::not_found("commit", hash.to_hex()).into());
        }

        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read commit {}", hash))?;
        let commit = Commit::parse(&text).with_context(|| format!("Failed to parse commit {}", hash))?;
        if commit.hash != hash {
            return Err(CoreError::Corrupt(format!(
                "commit file {} holds commit {}",
                hash, commit.hash
            ))
            .into());
        }

        self.cache.insert(hash, Arc::new(commit.clone()));
        Ok(commit)
    }

    pub fn contains(&self, hash: Blake3Hash) -> bool {
        self.cache.contains_key(&hash) || self.commit_path(hash).exists()
    }

    /// Resolve a commit's parents, in recorded order
    pub fn parents(&self, commit: &Commit) -> Result<Vec<Commit>> {
        commit.parents.iter().map(|&p| self.load(p)).collect()
    }

    /// Remove a commit's record
    ///
    /// Objects the commit referenced are left in place, they may be shared
    /// with live commits.
    pub fn delete_commit(&self, commit: &Commit) -> Result<()> {
        if !self.remove_record(commit.hash)? {
            return Err(CoreError::not_found("commit", commit.hash.to_hex()).into());
        }
        Ok(())
    }

    /// Drop a commit record if present; returns whether one was removed
    pub(crate) fn remove_record(&self, hash: Blake3Hash) -> Result<bool> {
        self.cache.remove(&hash);

        let path = self.commit_path(hash);
        if !path.exists() {
            return Ok(false);
        }

        fs::remove_file(&path).with_context(|| format!("Failed to delete commit {}", hash))?;
        tracing::debug!("Deleted commit {}", hash);
        Ok(true)
    }

    /// Materialize a commit's snapshot as the working tree
    ///
    /// Every tracked file is removed before any object is restored.
    pub fn apply_commit(&self, commit: &Commit) -> Result<()> {
        clear_working_tree(&self.repo)?;
        let entries = commit
            .objects
            .iter()
            .map(|o| (o.relative_path.as_str(), o.hash));
        let restored = restore_objects(&self.repo, entries)
            .with_context(|| format!("Failed to apply commit {}", commit.hash))?;

        tracing::info!("Applied commit {} ({} files)", commit.hash.short(12), restored);
        Ok(())
    }

    /// Hashes listed in the commit index, in order
    pub fn index_hashes(&self) -> Result<Vec<Blake3Hash>> {
        let path = self.repo.index_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let text = fs::read_to_string(&path).context("Failed to read commit index")?;
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                Blake3Hash::from_hex(line).map_err(|_| {
                    anyhow::Error::from(CoreError::Corrupt(format!(
                        "bad hash in commit index: {:?}",
                        line
                    )))
                })
            })
            .collect()
    }

    /// Every indexed commit, in index order
    pub fn all_commits(&self) -> Result<Vec<Commit>> {
        self.index_hashes()?
            .into_iter()
            .map(|hash| self.load(hash))
            .collect()
    }

    /// Append a commit to the index (no-op if already listed)
    pub fn record(&self, commit: &Commit) -> Result<()> {
        let mut hashes = self.index_hashes()?;
        if hashes.contains(&commit.hash) {
            return Ok(());
        }
        hashes.push(commit.hash);
        self.write_index(&hashes)
    }

    /// Replace the index with exactly `commits`
    pub fn save_index(&self, commits: &[Commit]) -> Result<()> {
        let hashes: Vec<Blake3Hash> = commits.iter().map(|c| c.hash).collect();
        self.write_index(&hashes)
    }

    pub(crate) fn write_index(&self, hashes: &[Blake3Hash]) -> Result<()> {
        let content: String = hashes.iter().map(|h| format!("{}\n", h)).collect();
        self.repo
            .write_meta(&self.repo.index_path(), content.as_bytes())
            .context("Failed to write commit index")
    }

    fn commit_path(&self, hash: Blake3Hash) -> PathBuf {
        self.repo.commits_dir().join(hash.to_hex())
    }
}

/// Equality-only tree comparison: same count and every path/hash pair equal
fn same_tree(current: &[Object], parent: &[Object]) -> bool {
    if current.len() != parent.len() {
        return false;
    }
    let current = Snapshot::path_map(current);
    parent
        .iter()
        .all(|o| current.get(o.relative_path.as_str()) == Some(&o.hash))
}

/// The record format separates objects with `,` and fields with newlines
fn check_recordable(objects: &[Object]) -> Result<()> {
    for object in objects {
        if object.relative_path.contains(',') || object.relative_path.contains('\n') {
            return Err(CoreError::InvalidArgument(format!(
                "path {:?} cannot be recorded (contains ',' or a newline)",
                object.relative_path
            ))
            .into());
        }
    }
    Ok(())
}

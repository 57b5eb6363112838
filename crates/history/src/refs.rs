//! Branches and the HEAD pointers
//!
//! Branches are flat files `.skein/branches/<name>` holding a commit hash.
//! `HEAD` holds the current commit hash and `HEAD_BRANCH` the current
//! branch name; either may be empty.

use anyhow::{Context, Result};
use skein_core::{Blake3Hash, CoreError, Repository};
use std::fs;
use std::path::{Path, PathBuf};

pub struct RefStore {
    repo: Repository,
}

impl RefStore {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Point `name` at `hash`, creating or overwriting the branch
    pub fn create_branch(&self, name: &str, hash: Blake3Hash) -> Result<()> {
        validate_branch_name(name)?;
        self.repo
            .write_meta(&self.branch_path(name), hash.to_hex().as_bytes())
            .with_context(|| format!("Failed to write branch {}", name))?;
        tracing::debug!("Branch {} -> {}", name, hash.short(12));
        Ok(())
    }

    /// Commit a branch points at; `None` for a missing or empty branch
    pub fn branch_commit(&self, name: &str) -> Result<Option<Blake3Hash>> {
        if validate_branch_name(name).is_err() {
            return Ok(None);
        }
        read_hash(&self.branch_path(name))
    }

    /// Remove a branch (idempotent)
    pub fn delete_branch(&self, name: &str) -> Result<()> {
        validate_branch_name(name)?;
        let path = self.branch_path(name);
        if path.exists() {
            fs::remove_file(&path).with_context(|| format!("Failed to delete branch {}", name))?;
        }
        Ok(())
    }

    pub fn rename_branch(&self, old: &str, new: &str) -> Result<()> {
        validate_branch_name(old)?;
        validate_branch_name(new)?;

        let from = self.branch_path(old);
        if !from.exists() {
            return Err(CoreError::not_found("branch", old).into());
        }
        fs::rename(&from, self.branch_path(new))
            .with_context(|| format!("Failed to rename branch {} to {}", old, new))?;

        if self.head_branch()?.as_deref() == Some(old) {
            self.save_head_branch(new)?;
        }
        Ok(())
    }

    /// All branches and their heads, sorted by name
    pub fn list_branches(&self) -> Result<Vec<(String, Option<Blake3Hash>)>> {
        let dir = self.repo.branches_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut branches = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() {
                let name = entry.file_name().to_string_lossy().to_string();
                branches.push((name, read_hash(&path)?));
            }
        }
        branches.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(branches)
    }

    /// Head commit of every branch that points somewhere (GC roots)
    pub fn all_branch_heads(&self) -> Result<Vec<Blake3Hash>> {
        Ok(self
            .list_branches()?
            .into_iter()
            .filter_map(|(_, hash)| hash)
            .collect())
    }

    pub fn head(&self) -> Result<Option<Blake3Hash>> {
        read_hash(&self.repo.head_path())
    }

    pub fn save_head(&self, hash: Blake3Hash) -> Result<()> {
        self.repo
            .write_meta(&self.repo.head_path(), hash.to_hex().as_bytes())
            .context("Failed to write HEAD")
    }

    pub fn head_branch(&self) -> Result<Option<String>> {
        let path = self.repo.head_branch_path();
        if !path.exists() {
            return Ok(None);
        }
        let name = fs::read_to_string(&path).context("Failed to read HEAD_BRANCH")?;
        let name = name.trim();
        Ok((!name.is_empty()).then(|| name.to_string()))
    }

    pub fn save_head_branch(&self, name: &str) -> Result<()> {
        validate_branch_name(name)?;
        self.repo
            .write_meta(&self.repo.head_branch_path(), name.as_bytes())
            .context("Failed to write HEAD_BRANCH")
    }

    /// Move the current branch to `hash`; no current branch is a no-op
    pub fn update_head_branch(&self, hash: Blake3Hash) -> Result<()> {
        match self.head_branch()? {
            Some(branch) => self.create_branch(&branch, hash),
            None => Ok(()),
        }
    }

    fn branch_path(&self, name: &str) -> PathBuf {
        self.repo.branches_dir().join(name)
    }
}

/// Alphanumerics plus `-`, `_` and `.`; no path separators, not `.`/`..`
fn validate_branch_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '.');

    if !valid {
        return Err(CoreError::InvalidArgument(format!(
            "invalid branch name {:?}: use letters, digits, '-', '_' or '.'",
            name
        ))
        .into());
    }
    Ok(())
}

/// Read a hash file; missing or empty means "no commit"
fn read_hash(path: &Path) -> Result<Option<Blake3Hash>> {
    if !path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let content = content.trim();
    if content.is_empty() {
        return Ok(None);
    }

    Blake3Hash::from_hex(content)
        .map(Some)
        .map_err(|_| {
            anyhow::Error::from(CoreError::Corrupt(format!(
                "{} holds {:?}",
                path.display(),
                content
            )))
        })
}

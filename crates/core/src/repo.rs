//! Repository handle and on-disk layout
//!
//! Every component takes a [`Repository`] rather than reaching for a
//! process-wide path. The handle owns nothing but paths, so it is cheap to
//! clone and pass around.

use crate::config::RepoConfig;
use crate::error::CoreError;
use crate::object::ObjectStore;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the metadata directory at the repository root
pub const META_DIR: &str = ".skein";

/// Handle to a Skein repository
///
/// Manages the `.skein/` directory structure:
/// ```text
/// .skein/
///   config.toml
///   index
///   HEAD
///   HEAD_BRANCH
///   objects/
///   commits/
///   branches/
///   tmp/
/// ```
#[derive(Debug, Clone)]
pub struct Repository {
    /// Working-tree root
    root: PathBuf,
    /// Path to `.skein`
    meta_dir: PathBuf,
}

impl Repository {
    /// Initialize a new repository at `root`
    pub fn init(root: &Path) -> Result<Self> {
        let meta_dir = root.join(META_DIR);

        if meta_dir.exists() {
            return Err(CoreError::AlreadyInitialized(root.display().to_string()).into());
        }

        fs::create_dir_all(&meta_dir)
            .with_context(|| format!("Failed to create {}", meta_dir.display()))?;
        for dir in ["objects", "commits", "branches", "tmp"] {
            fs::create_dir_all(meta_dir.join(dir))?;
        }

        fs::write(meta_dir.join("index"), "")?;
        fs::write(meta_dir.join("HEAD"), "")?;
        fs::write(meta_dir.join("HEAD_BRANCH"), "")?;

        let repo = Self {
            root: root.to_path_buf(),
            meta_dir,
        };
        RepoConfig::default().save(&repo.config_path(), &repo.tmp_dir())?;

        tracing::info!("Initialized repository at {}", root.display());
        Ok(repo)
    }

    /// Open an existing repository rooted exactly at `root`
    pub fn open(root: &Path) -> Result<Self> {
        let meta_dir = root.join(META_DIR);

        if !meta_dir.is_dir() {
            return Err(CoreError::NotInitialized(root.display().to_string()).into());
        }

        for dir in ["objects", "commits", "branches"] {
            if !meta_dir.join(dir).is_dir() {
                return Err(CoreError::Corrupt(format!("missing required directory: {}", dir)).into());
            }
        }

        Ok(Self {
            root: root.to_path_buf(),
            meta_dir,
        })
    }

    /// Walk up from `start` until a directory containing `.skein/` is found
    pub fn discover(start: &Path) -> Result<Self> {
        let mut current = start.to_path_buf();

        loop {
            if current.join(META_DIR).is_dir() {
                return Self::open(&current);
            }

            match current.parent() {
                Some(parent) => current = parent.to_path_buf(),
                None => return Err(CoreError::NotInitialized(start.display().to_string()).into()),
            }
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn meta_dir(&self) -> &Path {
        &self.meta_dir
    }

    pub fn objects(&self) -> ObjectStore {
        ObjectStore::new(self.meta_dir.join("objects"), self.tmp_dir())
    }

    pub fn commits_dir(&self) -> PathBuf {
        self.meta_dir.join("commits")
    }

    pub fn branches_dir(&self) -> PathBuf {
        self.meta_dir.join("branches")
    }

    /// Flat list of every known commit hash, one per line
    pub fn index_path(&self) -> PathBuf {
        self.meta_dir.join("index")
    }

    pub fn head_path(&self) -> PathBuf {
        self.meta_dir.join("HEAD")
    }

    pub fn head_branch_path(&self) -> PathBuf {
        self.meta_dir.join("HEAD_BRANCH")
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.meta_dir.join("tmp")
    }

    pub fn config_path(&self) -> PathBuf {
        self.meta_dir.join("config.toml")
    }

    /// Load `config.toml`, falling back to defaults when absent
    pub fn config(&self) -> Result<RepoConfig> {
        RepoConfig::load(&self.config_path())
    }

    /// Atomically replace a metadata file
    pub fn write_meta(&self, path: &Path, data: &[u8]) -> Result<()> {
        atomic_write(&self.tmp_dir(), path, data)
    }
}

/// Atomic write helper
///
/// Writes data to a temporary file, fsyncs it, then renames it over `target`.
pub fn atomic_write(tmp_dir: &Path, target: &Path, data: &[u8]) -> Result<()> {
    use std::io::Write;

    fs::create_dir_all(tmp_dir)?;
    let temp_path = tmp_dir.join(uuid::Uuid::new_v4().to_string());

    let mut temp_file = fs::File::create(&temp_path)?;
    temp_file.write_all(data)?;
    temp_file.sync_all()?;
    drop(temp_file);

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::rename(&temp_path, target)?;

    // Best effort, some filesystems refuse directory fsync
    if let Some(parent) = target.parent() {
        if let Ok(dir) = fs::File::open(parent) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}

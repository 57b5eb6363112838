//! Whole working-tree snapshots
//!
//! A snapshot is the full list of `(hash, path)` pairs for every regular
//! file under the repository root, never a delta. The walk is sorted by file
//! name so the same tree always yields the same object order.

use crate::error::CoreError;
use crate::hash::Blake3Hash;
use crate::repo::{Repository, META_DIR};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// One versioned file: its content hash and the path it occupied
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Object {
    pub hash: Blake3Hash,
    /// Path relative to the repository root, `/`-separated
    pub relative_path: String,
}

impl Object {
    pub fn new(hash: Blake3Hash, relative_path: impl Into<String>) -> Self {
        Self {
            hash,
            relative_path: relative_path.into(),
        }
    }

    /// Record form: `hash|relativePath`
    pub fn serialize(&self) -> String {
        format!("{}|{}", self.hash, self.relative_path)
    }

    /// Parse a `hash|relativePath` record
    ///
    /// Only the first `|` separates the fields, so paths may contain `|`.
    pub fn parse(record: &str) -> Result<Self> {
        let (hash, path) = record
            .split_once('|')
            .ok_or_else(|| CoreError::Corrupt(format!("malformed object record: {:?}", record)))?;

        let hash = Blake3Hash::from_hex(hash)
            .map_err(|_| CoreError::Corrupt(format!("bad object hash in record: {:?}", record)))?;
        if path.is_empty() {
            return Err(CoreError::Corrupt(format!("object record without path: {:?}", record)).into());
        }

        Ok(Self::new(hash, path))
    }
}

/// Full working-tree snapshot in walk order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub objects: Vec<Object>,
}

impl Snapshot {
    /// Store every regular file under the repository root and record it
    ///
    /// `.skein/` is never entered.
    pub fn capture(repo: &Repository) -> Result<Self> {
        let root = repo.root();
        let store = repo.objects();
        let mut objects = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !is_meta_dir(root, e.path()))
        {
            let entry = entry.context("Failed to walk working tree")?;
            if !entry.file_type().is_file() {
                continue;
            }

            let relative_path = relative_path(root, entry.path())?;
            let hash = store.put_file(entry.path())?;
            objects.push(Object::new(hash, relative_path));
        }

        tracing::debug!("Captured snapshot of {} files", objects.len());
        Ok(Self { objects })
    }

    /// path -> hash view of the snapshot
    pub fn path_map(objects: &[Object]) -> BTreeMap<&str, Blake3Hash> {
        objects
            .iter()
            .map(|o| (o.relative_path.as_str(), o.hash))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

/// Delete every file in the working tree outside `.skein/`, then prune the
/// directories left empty
pub fn clear_working_tree(repo: &Repository) -> Result<usize> {
    let root = repo.root();
    let mut removed = 0;

    for entry in WalkDir::new(root)
        .follow_links(false)
        .contents_first(true)
        .into_iter()
        .filter_entry(|e| !is_meta_dir(root, e.path()))
    {
        let entry = entry.context("Failed to walk working tree")?;
        let path = entry.path();

        if entry.file_type().is_dir() {
            if entry.depth() > 0 && fs::read_dir(path)?.next().is_none() {
                fs::remove_dir(path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
            }
        } else {
            fs::remove_file(path).with_context(|| format!("Failed to remove {}", path.display()))?;
            removed += 1;
        }
    }

    tracing::debug!("Cleared {} files from working tree", removed);
    Ok(removed)
}

/// Write each `(path, hash)` pair from the object store into the working tree
pub fn restore_objects<'a>(
    repo: &Repository,
    entries: impl IntoIterator<Item = (&'a str, Blake3Hash)>,
) -> Result<usize> {
    let store = repo.objects();
    let mut restored = 0;

    for (path, hash) in entries {
        store.restore(hash, &repo.root().join(path))?;
        restored += 1;
    }

    Ok(restored)
}

fn is_meta_dir(root: &Path, path: &Path) -> bool {
    path.starts_with(root.join(META_DIR))
}

fn relative_path(root: &Path, path: &Path) -> Result<String> {
    let rel = path
        .strip_prefix(root)
        .with_context(|| format!("{} is outside the repository", path.display()))?;

    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Ok(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash_bytes;

    fn repo_with_files(files: &[(&str, &str)]) -> (tempfile::TempDir, Repository) {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        for (path, content) in files {
            let full = dir.path().join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, content).unwrap();
        }
        (dir, repo)
    }

    #[test]
    fn test_object_record_roundtrip() -> Result<()> {
        let object = Object::new(hash_bytes(b"x"), "src/a|b.txt");
        let parsed = Object::parse(&object.serialize())?;
        assert_eq!(parsed, object);
        Ok(())
    }

    #[test]
    fn test_object_parse_rejects_garbage() {
        assert!(Object::parse("no-separator").is_err());
        assert!(Object::parse("nothex|file.txt").is_err());
        assert!(Object::parse(&format!("{}|", hash_bytes(b"x"))).is_err());
    }

    #[test]
    fn test_capture_is_sorted_and_skips_meta() -> Result<()> {
        let (_dir, repo) = repo_with_files(&[("b.txt", "b"), ("a/z.txt", "z"), ("a/c.txt", "c")]);

        let snapshot = Snapshot::capture(&repo)?;
        let paths: Vec<_> = snapshot.objects.iter().map(|o| o.relative_path.as_str()).collect();

        assert_eq!(paths, vec!["a/c.txt", "a/z.txt", "b.txt"]);
        assert!(snapshot.objects.iter().all(|o| !o.relative_path.starts_with(META_DIR)));
        Ok(())
    }

    #[test]
    fn test_capture_stores_objects() -> Result<()> {
        let (_dir, repo) = repo_with_files(&[("file.txt", "payload")]);

        let snapshot = Snapshot::capture(&repo)?;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(repo.objects().get(snapshot.objects[0].hash)?, b"payload");
        Ok(())
    }

    #[test]
    fn test_capture_empty_tree() -> Result<()> {
        let (_dir, repo) = repo_with_files(&[]);
        assert!(Snapshot::capture(&repo)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_clear_then_restore() -> Result<()> {
        let (dir, repo) = repo_with_files(&[("keep/x.txt", "x"), ("top.txt", "top")]);
        let snapshot = Snapshot::capture(&repo)?;

        assert_eq!(clear_working_tree(&repo)?, 2);
        assert!(!dir.path().join("keep").exists());
        assert!(!dir.path().join("top.txt").exists());
        assert!(repo.meta_dir().join("objects").is_dir());

        let entries = snapshot
            .objects
            .iter()
            .map(|o| (o.relative_path.as_str(), o.hash));
        assert_eq!(restore_objects(&repo, entries)?, 2);
        assert_eq!(fs::read_to_string(dir.path().join("keep/x.txt"))?, "x");
        assert_eq!(fs::read_to_string(dir.path().join("top.txt"))?, "top");
        Ok(())
    }

    #[test]
    fn test_path_map() -> Result<()> {
        let (_dir, repo) = repo_with_files(&[("one", "1"), ("two", "2")]);
        let snapshot = Snapshot::capture(&repo)?;
        let map = Snapshot::path_map(&snapshot.objects);

        assert_eq!(map.get("one"), Some(&hash_bytes(b"1")));
        assert_eq!(map.get("two"), Some(&hash_bytes(b"2")));
        Ok(())
    }
}

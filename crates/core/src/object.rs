//! Content-addressed object storage
//!
//! Objects are raw file bytes stored flat under `.skein/objects/<hex>`.
//! Identical bytes hash identically, so each distinct content is written
//! exactly once no matter how many commits reference it.

use crate::error::CoreError;
use crate::hash::{hash_bytes, hash_file, Blake3Hash};
use crate::repo::atomic_write;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Object store rooted at a repository's `objects/` directory
#[derive(Debug, Clone)]
pub struct ObjectStore {
    objects_dir: PathBuf,
    tmp_dir: PathBuf,
}

impl ObjectStore {
    pub fn new(objects_dir: PathBuf, tmp_dir: PathBuf) -> Self {
        Self {
            objects_dir,
            tmp_dir,
        }
    }

    /// Store `data`, returning its content hash
    ///
    /// Idempotent: if the object already exists nothing is written.
    pub fn put(&self, data: &[u8]) -> Result<Blake3Hash> {
        let hash = hash_bytes(data);
        let path = self.object_path(hash);

        if path.exists() {
            return Ok(hash);
        }

        atomic_write(&self.tmp_dir, &path, data)
            .with_context(|| format!("Failed to write object {}", hash))?;
        tracing::debug!("Stored object {} ({} bytes)", hash.short(12), data.len());

        Ok(hash)
    }

    /// Store a working-tree file
    ///
    /// The file is hashed by streaming first so unchanged content is never
    /// read into memory a second time.
    pub fn put_file(&self, file: &Path) -> Result<Blake3Hash> {
        let hash = hash_file(file)
            .with_context(|| format!("Failed to hash {}", file.display()))?;
        let path = self.object_path(hash);

        if path.exists() {
            return Ok(hash);
        }

        let data = fs::read(file).with_context(|| format!("Failed to read {}", file.display()))?;
        atomic_write(&self.tmp_dir, &path, &data)
            .with_context(|| format!("Failed to write object {}", hash))?;
        tracing::debug!("Stored object {} from {}", hash.short(12), file.display());

        Ok(hash)
    }

    /// Read an object's bytes
    pub fn get(&self, hash: Blake3Hash) -> Result<Vec<u8>> {
        let path = self.object_path(hash);
        if !path.exists() {
            return Err(CoreError::not_found("object", hash.to_hex()).into());
        }

        fs::read(&path).with_context(|| format!("Failed to read object {}", hash))
    }

    /// Read an object as UTF-8 text (lossy)
    pub fn get_text(&self, hash: Blake3Hash) -> Result<String> {
        let data = self.get(hash)?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    pub fn has(&self, hash: Blake3Hash) -> bool {
        self.object_path(hash).exists()
    }

    /// Copy an object into the working tree at `dest`, creating parent
    /// directories as needed
    pub fn restore(&self, hash: Blake3Hash, dest: &Path) -> Result<()> {
        let path = self.object_path(hash);
        if !path.exists() {
            return Err(CoreError::not_found("object", hash.to_hex()).into());
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::copy(&path, dest)
            .with_context(|| format!("Failed to restore {} to {}", hash, dest.display()))?;

        Ok(())
    }

    /// Every object hash currently on disk
    pub fn list(&self) -> Result<Vec<Blake3Hash>> {
        let mut hashes = Vec::new();
        if !self.objects_dir.exists() {
            return Ok(hashes);
        }

        for entry in fs::read_dir(&self.objects_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            if let Ok(hash) = Blake3Hash::from_hex(&name.to_string_lossy()) {
                hashes.push(hash);
            }
        }
        hashes.sort();

        Ok(hashes)
    }

    pub fn object_path(&self, hash: Blake3Hash) -> PathBuf {
        self.objects_dir.join(hash.to_hex())
    }
}

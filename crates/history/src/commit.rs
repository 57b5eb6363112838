//! Commit records and their on-disk format
//!
//! A commit file under `.skein/commits/<hash>` is newline separated:
//!
//! ```text
//! user
//! hash
//! object count
//! h1|path1,h2|path2,
//! parent1,parent2
//! unix timestamp
//! message
//! ```
//!
//! followed by a trailing newline. The message is the last field and cannot
//! contain a newline.

use anyhow::Result;
use skein_core::{Blake3Hash, CoreError, IncrementalHasher, Object};
use std::collections::BTreeMap;

/// Immutable full-tree snapshot plus metadata and parent links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub user: String,
    pub hash: Blake3Hash,
    /// Complete working-tree snapshot, in walk order
    pub objects: Vec<Object>,
    /// Parent hashes; merge commits list the two merge inputs in order
    pub parents: Vec<Blake3Hash>,
    /// Unix seconds
    pub timestamp: i64,
    pub message: String,
}

impl Commit {
    /// Commit identity: the object hashes in order, then the timestamp
    ///
    /// Re-committing an identical tree at a different time yields a
    /// different identity.
    pub fn compute_hash(objects: &[Object], timestamp: i64) -> Blake3Hash {
        let mut hasher = IncrementalHasher::new();
        for object in objects {
            hasher.update(object.hash.to_hex().as_bytes());
        }
        hasher.update(timestamp.to_string().as_bytes());
        hasher.finalize()
    }

    pub fn serialize(&self) -> String {
        let objects: String = self
            .objects
            .iter()
            .map(|o| format!("{},", o.serialize()))
            .collect();
        let parents: Vec<String> = self.parents.iter().map(|p| p.to_hex()).collect();

        format!(
            "{}\n{}\n{}\n{}\n{}\n{}\n{}\n",
            self.user,
            self.hash,
            self.objects.len(),
            objects,
            parents.join(","),
            self.timestamp,
            self.message
        )
    }

    /// Parse a serialized record, verifying the stored hash
    pub fn parse(text: &str) -> Result<Self> {
        let lines: Vec<&str> = text.split('\n').collect();
        if lines.len() < 7 {
            return Err(corrupt(format!(
                "commit record has {} lines, expected at least 7",
                lines.len()
            )));
        }

        let user = lines[0].to_string();
        let hash = Blake3Hash::from_hex(lines[1])
            .map_err(|_| corrupt(format!("bad commit hash {:?}", lines[1])))?;
        let count: usize = lines[2]
            .trim()
            .parse()
            .map_err(|_| corrupt(format!("bad object count {:?} in {}", lines[2], hash)))?;

        let objects = lines[3]
            .split(',')
            .filter(|record| !record.is_empty())
            .map(Object::parse)
            .collect::<Result<Vec<_>>>()?;
        if objects.len() != count {
            return Err(corrupt(format!(
                "commit {} declares {} objects but lists {}",
                hash,
                count,
                objects.len()
            )));
        }

        let parents = lines[4]
            .split(',')
            .filter(|p| !p.is_empty())
            .map(|p| Blake3Hash::from_hex(p).map_err(|_| corrupt(format!("bad parent hash {:?}", p))))
            .collect::<Result<Vec<_>>>()?;

        let timestamp: i64 = lines[5]
            .trim()
            .parse()
            .map_err(|_| corrupt(format!("bad timestamp {:?} in {}", lines[5], hash)))?;

        let computed = Self::compute_hash(&objects, timestamp);
        if computed != hash {
            return Err(corrupt(format!(
                "commit hash mismatch: recorded {}, computed {}",
                hash, computed
            )));
        }

        Ok(Self {
            user,
            hash,
            objects,
            parents,
            timestamp,
            message: lines[6].to_string(),
        })
    }

    /// path -> content hash
    pub fn object_map(&self) -> BTreeMap<String, Blake3Hash> {
        self.objects
            .iter()
            .map(|o| (o.relative_path.clone(), o.hash))
            .collect()
    }

    /// Content hash recorded for `path`, if the commit tracks it
    pub fn hash_for(&self, path: &str) -> Option<Blake3Hash> {
        self.objects
            .iter()
            .find(|o| o.relative_path == path)
            .map(|o| o.hash)
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

fn corrupt(msg: String) -> anyhow::Error {
    CoreError::Corrupt(msg).into()
}

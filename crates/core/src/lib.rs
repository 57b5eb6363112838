//! Skein Core - content-addressed storage primitives for the Skein version-control engine
//!
//! This crate provides the foundational storage layer:
//! - BLAKE3 content hashing
//! - Object store keyed by content hash
//! - Working-tree snapshots and restores
//! - The longest-common-subsequence diff primitive
//! - The repository handle, its on-disk layout and configuration

pub mod config;
pub mod error;
pub mod hash;
pub mod lcs;
pub mod object;
pub mod repo;
pub mod snapshot;

// Re-export main types for convenience
pub use config::RepoConfig;
pub use error::CoreError;
pub use hash::{hash_bytes, hash_file, Blake3Hash, IncrementalHasher};
pub use lcs::{lcs, lcs_len};
pub use object::ObjectStore;
pub use repo::{Repository, META_DIR};
pub use snapshot::{clear_working_tree, restore_objects, Object, Snapshot};

/// Common result type used throughout skein-core
pub type Result<T> = anyhow::Result<T>;

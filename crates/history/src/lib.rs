//! Skein History - the commit DAG and everything that walks it
//!
//! This crate builds on `skein-core` storage:
//! - Commit records and the commit graph (create, load, delete, apply)
//! - Common-ancestor search
//! - Three-way merge with forced line-level conflict resolution
//! - Reachability-based garbage collection
//! - Branch and HEAD pointers
//! - Log, file history and message search

pub mod commit;
pub mod error;
pub mod gc;
pub mod graph;
pub mod lca;
pub mod merge;
pub mod refs;
pub mod search;
pub mod walk;

pub use commit::Commit;
pub use error::HistoryError;
pub use gc::{mark_reachable, GarbageCollector, GcMetrics, GcOptions};
pub use graph::CommitGraph;
pub use lca::find_lca;
pub use merge::{apply_tree, merge, reconcile, resolve_conflict, MergeOutcome, Reconciliation};
pub use refs::RefStore;
pub use search::{search_commits, similarity, SimilarityMetric};
pub use walk::{file_history, find_child, first_parent, log};

/// Result type for history operations
pub type Result<T> = anyhow::Result<T>;

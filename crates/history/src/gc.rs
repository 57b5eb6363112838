//! Reachability-based garbage collection of commits
//!
//! Every commit reachable from a branch head survives; every other indexed
//! commit record is deleted and the index is rewritten with the survivors.
//! Objects are not reclaimed: a deleted commit's objects stay on disk even
//! when nothing else references them.

use crate::graph::CommitGraph;
use anyhow::Result;
use skein_core::Blake3Hash;
use std::collections::{HashSet, VecDeque};
use std::time::Instant;

#[derive(Debug, Clone, Default)]
pub struct GcOptions {
    /// Report what would be deleted without deleting it
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GcMetrics {
    pub commits_scanned: usize,
    pub commits_retained: usize,
    pub commits_deleted: usize,
    pub duration_ms: u64,
}

impl GcMetrics {
    pub fn log_summary(&self, dry_run: bool) {
        tracing::info!(
            "GC {}: {} commits scanned, {} retained, {} {} in {} ms",
            if dry_run { "dry run" } else { "completed" },
            self.commits_scanned,
            self.commits_retained,
            self.commits_deleted,
            if dry_run { "unreachable" } else { "deleted" },
            self.duration_ms
        );
    }
}

/// Commit garbage collector
pub struct GarbageCollector {
    options: GcOptions,
}

impl GarbageCollector {
    pub fn new(options: GcOptions) -> Self {
        Self { options }
    }

    /// Delete every indexed commit unreachable from `heads`
    pub fn collect(&self, graph: &CommitGraph, heads: &[Blake3Hash]) -> Result<GcMetrics> {
        let start = Instant::now();
        let mut metrics = GcMetrics::default();

        // Phase 1: mark
        let live = mark_reachable(graph, heads)?;

        // Phase 2: sweep
        let mut survivors = Vec::new();
        let mut dead = Vec::new();
        for hash in graph.index_hashes()? {
            metrics.commits_scanned += 1;
            if live.contains(&hash) {
                survivors.push(hash);
            } else {
                dead.push(hash);
            }
        }
        metrics.commits_retained = survivors.len();
        metrics.commits_deleted = dead.len();

        if self.options.dry_run {
            for hash in &dead {
                tracing::info!("Would delete commit {}", hash.short(12));
            }
        } else {
            // The index is rewritten first so it never lists a removed record
            graph.write_index(&survivors)?;
            for hash in &dead {
                if !graph.remove_record(*hash)? {
                    tracing::debug!("Commit {} was already gone", hash.short(12));
                }
            }
        }

        metrics.duration_ms = start.elapsed().as_millis() as u64;
        metrics.log_summary(self.options.dry_run);
        Ok(metrics)
    }
}

/// Multi-source breadth-first walk over parents from every head
pub fn mark_reachable(graph: &CommitGraph, heads: &[Blake3Hash]) -> Result<HashSet<Blake3Hash>> {
    let mut visited = HashSet::new();
    let mut queue: VecDeque<Blake3Hash> = heads.iter().copied().collect();

    while let Some(hash) = queue.pop_front() {
        if !visited.insert(hash) {
            continue;
        }
        let commit = graph.load(hash)?;
        queue.extend(commit.parents.iter().copied());
    }

    Ok(visited)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::Commit;
    use skein_core::Repository;
    use std::fs;

    fn commit(
        dir: &tempfile::TempDir,
        graph: &CommitGraph,
        content: &str,
        parents: &[&Commit],
        ts: i64,
    ) -> Commit {
        fs::write(dir.path().join("f.txt"), content).unwrap();
        let parents: Vec<Commit> = parents.iter().map(|c| (*c).clone()).collect();
        let c = graph.create_commit_at("gc", content, &parents, ts).unwrap().unwrap();
        graph.record(&c).unwrap();
        c
    }

    #[test]
    fn test_gc_deletes_unreachable() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let graph = CommitGraph::new(Repository::init(dir.path())?);

        let r = commit(&dir, &graph, "r", &[], 1);
        let a = commit(&dir, &graph, "a", &[&r], 2);
        let b = commit(&dir, &graph, "b", &[&r], 3);
        let m = commit(&dir, &graph, "m", &[&a, &b], 4);
        let z = commit(&dir, &graph, "z", &[], 5);

        let metrics = GarbageCollector::new(GcOptions::default()).collect(&graph, &[m.hash])?;

        assert_eq!(metrics.commits_scanned, 5);
        assert_eq!(metrics.commits_retained, 4);
        assert_eq!(metrics.commits_deleted, 1);
        assert_eq!(graph.index_hashes()?, vec![r.hash, a.hash, b.hash, m.hash]);
        assert!(!graph.contains(z.hash));
        // Objects are never reclaimed
        assert!(graph.repo().objects().has(z.objects[0].hash));
        Ok(())
    }

    #[test]
    fn test_gc_dry_run_deletes_nothing() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let graph = CommitGraph::new(Repository::init(dir.path())?);

        let r = commit(&dir, &graph, "r", &[], 1);
        let z = commit(&dir, &graph, "z", &[], 2);

        let gc = GarbageCollector::new(GcOptions { dry_run: true });
        let metrics = gc.collect(&graph, &[r.hash])?;

        assert_eq!(metrics.commits_deleted, 1);
        assert!(graph.contains(z.hash));
        assert_eq!(graph.index_hashes()?, vec![r.hash, z.hash]);
        Ok(())
    }

    #[test]
    fn test_gc_without_heads_deletes_everything() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let graph = CommitGraph::new(Repository::init(dir.path())?);
        let r = commit(&dir, &graph, "r", &[], 1);

        let metrics = GarbageCollector::new(GcOptions::default()).collect(&graph, &[])?;
        assert_eq!(metrics.commits_deleted, 1);
        assert!(!graph.contains(r.hash));
        assert!(graph.index_hashes()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_gc_tolerates_index_entry_without_record() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let graph = CommitGraph::new(Repository::init(dir.path())?);

        let r = commit(&dir, &graph, "r", &[], 1);
        let stale = commit(&dir, &graph, "stale", &[], 2);
        let z = commit(&dir, &graph, "z", &[], 3);
        fs::remove_file(dir.path().join(".skein/commits").join(stale.hash.to_hex()))?;

        let metrics = GarbageCollector::new(GcOptions::default()).collect(&graph, &[r.hash])?;

        assert_eq!(metrics.commits_deleted, 2);
        assert_eq!(graph.index_hashes()?, vec![r.hash]);
        assert!(!graph.contains(z.hash));
        assert_eq!(graph.all_commits()?, vec![r]);
        Ok(())
    }

    #[test]
    fn test_mark_reachable_from_several_heads() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let graph = CommitGraph::new(Repository::init(dir.path())?);

        let r = commit(&dir, &graph, "r", &[], 1);
        let a = commit(&dir, &graph, "a", &[&r], 2);
        let b = commit(&dir, &graph, "b", &[&r], 3);
        let lone = commit(&dir, &graph, "lone", &[], 4);

        let live = mark_reachable(&graph, &[a.hash, b.hash, a.hash])?;
        assert_eq!(live, HashSet::from([r.hash, a.hash, b.hash]));
        assert!(!live.contains(&lone.hash));
        Ok(())
    }
}

//! History traversal: log, per-file history and step-wise navigation

use crate::commit::Commit;
use crate::graph::CommitGraph;
use anyhow::Result;
use skein_core::Blake3Hash;
use std::collections::{HashSet, VecDeque};

/// Breadth-first walk from `head` over parents, each commit once
pub fn log(graph: &CommitGraph, head: &Commit) -> Result<Vec<Commit>> {
    let mut out = Vec::new();
    bfs(graph, head, |commit, _| {
        out.push(commit.clone());
        Ok(())
    })?;
    Ok(out)
}

/// Commits reachable from `head` that changed `path`
///
/// A commit changed the path when it tracks it and no parent tracks it with
/// the same content.
pub fn file_history(graph: &CommitGraph, head: &Commit, path: &str) -> Result<Vec<Commit>> {
    let mut out = Vec::new();
    bfs(graph, head, |commit, parents| {
        let Some(hash) = commit.hash_for(path) else {
            return Ok(());
        };
        let inherited = parents.iter().any(|p| p.hash_for(path) == Some(hash));
        if !inherited {
            out.push(commit.clone());
        }
        Ok(())
    })?;
    Ok(out)
}

/// First parent of `commit`, if any
pub fn first_parent(graph: &CommitGraph, commit: &Commit) -> Result<Option<Commit>> {
    commit.parents.first().map(|&p| graph.load(p)).transpose()
}

/// Last indexed commit that lists `commit` as a parent
pub fn find_child(graph: &CommitGraph, commit: &Commit) -> Result<Option<Commit>> {
    let mut child = None;
    for hash in graph.index_hashes()? {
        let candidate = graph.load(hash)?;
        if candidate.parents.contains(&commit.hash) {
            child = Some(candidate);
        }
    }
    Ok(child)
}

/// Visit each commit reachable from `start` once, handing the visitor the
/// commit and its resolved parents
fn bfs<F>(graph: &CommitGraph, start: &Commit, mut visit: F) -> Result<()>
where
    F: FnMut(&Commit, &[Commit]) -> Result<()>,
{
    let mut seen: HashSet<Blake3Hash> = HashSet::new();
    let mut queue = VecDeque::from([start.clone()]);

    while let Some(commit) = queue.pop_front() {
        if !seen.insert(commit.hash) {
            continue;
        }
        let parents = graph.parents(&commit)?;
        visit(&commit, &parents)?;
        queue.extend(parents);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use skein_core::Repository;
    use std::fs;

    struct Repo {
        dir: tempfile::TempDir,
        graph: CommitGraph,
        clock: i64,
    }

    impl Repo {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let graph = CommitGraph::new(Repository::init(dir.path()).unwrap());
            Self { dir, graph, clock: 0 }
        }

        fn commit(&mut self, files: &[(&str, &str)], parents: &[&Commit]) -> Commit {
            for (path, content) in files {
                fs::write(self.dir.path().join(path), content).unwrap();
            }
            self.clock += 1;
            let parents: Vec<Commit> = parents.iter().map(|c| (*c).clone()).collect();
            let commit = self
                .graph
                .create_commit_at("walker", "msg", &parents, self.clock)
                .unwrap()
                .unwrap();
            self.graph.record(&commit).unwrap();
            commit
        }
    }

    #[test]
    fn test_log_lists_each_commit_once() -> Result<()> {
        let mut repo = Repo::new();
        let root = repo.commit(&[("f", "0")], &[]);
        let a = repo.commit(&[("f", "a")], &[&root]);
        let b = repo.commit(&[("f", "b")], &[&root]);
        let m = repo.commit(&[("f", "m")], &[&a, &b]);

        let hashes: Vec<_> = log(&repo.graph, &m)?.into_iter().map(|c| c.hash).collect();
        assert_eq!(hashes, vec![m.hash, a.hash, b.hash, root.hash]);
        Ok(())
    }

    #[test]
    fn test_file_history_skips_untouched() -> Result<()> {
        let mut repo = Repo::new();
        let c1 = repo.commit(&[("a.txt", "1"), ("b.txt", "1")], &[]);
        let c2 = repo.commit(&[("b.txt", "2")], &[&c1]);
        let c3 = repo.commit(&[("a.txt", "3")], &[&c2]);

        let touched: Vec<_> = file_history(&repo.graph, &c3, "a.txt")?
            .into_iter()
            .map(|c| c.hash)
            .collect();
        assert_eq!(touched, vec![c3.hash, c1.hash]);

        let untracked = file_history(&repo.graph, &c3, "missing.txt")?;
        assert!(untracked.is_empty());
        Ok(())
    }

    #[test]
    fn test_navigation() -> Result<()> {
        let mut repo = Repo::new();
        let c1 = repo.commit(&[("f", "1")], &[]);
        let c2 = repo.commit(&[("f", "2")], &[&c1]);

        assert_eq!(first_parent(&repo.graph, &c2)?, Some(c1.clone()));
        assert_eq!(first_parent(&repo.graph, &c1)?, None);
        assert_eq!(find_child(&repo.graph, &c1)?, Some(c2.clone()));
        assert_eq!(find_child(&repo.graph, &c2)?, None);
        Ok(())
    }

    #[test]
    fn test_find_child_prefers_latest_recorded() -> Result<()> {
        let mut repo = Repo::new();
        let root = repo.commit(&[("f", "root")], &[]);
        let _older = repo.commit(&[("f", "a")], &[&root]);
        let newer = repo.commit(&[("f", "b")], &[&root]);

        assert_eq!(find_child(&repo.graph, &root)?, Some(newer));
        Ok(())
    }
}

//! Common-ancestor search
//!
//! Two breadth-first searches advance in lockstep, one step each per round.
//! The first commit popped by one side that the other side has already
//! visited is returned. In criss-cross histories that is not necessarily
//! the lowest common ancestor, only the first one the interleaving reaches.

use crate::commit::Commit;
use crate::graph::CommitGraph;
use anyhow::Result;
use skein_core::Blake3Hash;
use std::collections::{HashSet, VecDeque};

/// Find a common ancestor of `x` and `y` (each commit is its own ancestor)
///
/// Returns `None` when the frontiers drain without meeting.
pub fn find_lca(graph: &CommitGraph, x: &Commit, y: &Commit) -> Result<Option<Commit>> {
    let mut visited_x: HashSet<Blake3Hash> = HashSet::new();
    let mut visited_y: HashSet<Blake3Hash> = HashSet::new();

    let mut queue_x = VecDeque::from([x.clone()]);
    let mut queue_y = VecDeque::from([y.clone()]);

    while !queue_x.is_empty() || !queue_y.is_empty() {
        if let Some(found) = step(graph, &mut queue_x, &mut visited_x, &visited_y)? {
            return Ok(Some(found));
        }
        if let Some(found) = step(graph, &mut queue_y, &mut visited_y, &visited_x)? {
            return Ok(Some(found));
        }
    }

    tracing::debug!("No common ancestor for {} and {}", x.hash.short(12), y.hash.short(12));
    Ok(None)
}

/// Pop one commit from `queue`; return it if the other side has seen it,
/// otherwise mark it and enqueue its parents
///
/// A commit reached along several paths is expanded each time it is popped,
/// so diamonds leave duplicates in the queue that each take a round.
fn step(
    graph: &CommitGraph,
    queue: &mut VecDeque<Commit>,
    visited: &mut HashSet<Blake3Hash>,
    other: &HashSet<Blake3Hash>,
) -> Result<Option<Commit>> {
    let Some(current) = queue.pop_front() else {
        return Ok(None);
    };

    if other.contains(&current.hash) {
        return Ok(Some(current));
    }

    visited.insert(current.hash);
    queue.extend(graph.parents(&current)?);
    Ok(None)
}

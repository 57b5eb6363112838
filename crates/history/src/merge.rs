//! Three-way merge
//!
//! Paths are reconciled independently against the merge base. A path that
//! both sides changed to different content is a conflict; a forced merge
//! resolves it with a line-level interleave instead of aborting:
//!
//! 1. `lx = LCS(base, x)`, `ly = LCS(base, y)`
//! 2. the skeleton is `LCS(lx, ly)`, the base lines both sides kept
//! 3. lines of `x` missing from `lx` (and of `y` missing from `ly`) are
//!    insertions, anchored to the index in `lx` (or `ly`) of the common line
//!    they follow
//! 4. walk the skeleton, emitting X's then Y's insertions whose anchor is
//!    below the current skeleton index
//!
//! There are no conflict markers and no user choice. Anchors index `lx`/`ly`
//! but are compared against skeleton positions, so once one side kept a base
//! line the other dropped, its later insertions drift towards the end.

use crate::commit::Commit;
use crate::error::HistoryError;
use crate::graph::CommitGraph;
use crate::lca::find_lca;
use anyhow::{Context, Result};
use skein_core::snapshot::{clear_working_tree, restore_objects};
use skein_core::{lcs, Blake3Hash, Repository};
use std::collections::{BTreeMap, BTreeSet};

/// Result of a merge attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The merged tree was written to the working directory; `resolved`
    /// lists the conflicted paths that were interleaved
    Applied {
        base: Blake3Hash,
        resolved: Vec<String>,
    },
    /// Conflicts without `force`; the working tree is untouched
    Aborted {
        base: Blake3Hash,
        conflicts: Vec<String>,
    },
}

impl MergeOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, MergeOutcome::Applied { .. })
    }
}

/// Per-path reconciliation of two trees against their base
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Final content per path; `None` means the path ends up absent
    pub tree: BTreeMap<String, Option<Blake3Hash>>,
    /// Paths both sides changed to different content, sorted
    pub conflicts: Vec<String>,
}

/// Reconcile every path present in `x` or `y`
///
/// Paths only present in the base were deleted on both sides and do not
/// survive.
pub fn reconcile(
    base: &BTreeMap<String, Blake3Hash>,
    x: &BTreeMap<String, Blake3Hash>,
    y: &BTreeMap<String, Blake3Hash>,
) -> Reconciliation {
    let paths: BTreeSet<&String> = x.keys().chain(y.keys()).collect();
    let mut result = Reconciliation::default();

    for path in paths {
        let b = base.get(path).copied();
        let xv = x.get(path).copied();
        let yv = y.get(path).copied();

        let resolved = if xv == b {
            // Covers "unchanged on both sides" as well
            yv
        } else if yv == b || xv == yv {
            xv
        } else {
            result.conflicts.push(path.clone());
            continue;
        };
        result.tree.insert(path.clone(), resolved);
    }

    result
}

/// Merge `y` into `x` and write the result to the working tree
///
/// The caller records the merge commit from the post-merge snapshot.
pub fn merge(
    graph: &CommitGraph,
    user: &str,
    x: &Commit,
    y: &Commit,
    force: bool,
) -> Result<MergeOutcome> {
    let base = find_lca(graph, x, y)?.ok_or(HistoryError::NoCommonAncestor {
        x: x.hash,
        y: y.hash,
    })?;
    tracing::info!(
        "{} merging {} and {} (base {})",
        user,
        x.hash.short(12),
        y.hash.short(12),
        base.hash.short(12)
    );

    let base_objects = base.object_map();
    let x_objects = x.object_map();
    let y_objects = y.object_map();
    let Reconciliation { mut tree, conflicts } = reconcile(&base_objects, &x_objects, &y_objects);

    for path in &conflicts {
        tracing::warn!("Conflicts found in {}", path);
    }

    if !conflicts.is_empty() && !force {
        tracing::info!("Merge aborted with {} conflicting paths", conflicts.len());
        return Ok(MergeOutcome::Aborted {
            base: base.hash,
            conflicts,
        });
    }

    let store = graph.repo().objects();
    let read = |hash: Option<&Blake3Hash>| -> Result<String> {
        match hash {
            Some(&hash) => store.get_text(hash),
            None => Ok(String::new()),
        }
    };

    for path in &conflicts {
        tracing::info!("Resolving conflicts in {}", path);
        let merged = resolve_conflict(
            &read(base_objects.get(path))?,
            &read(x_objects.get(path))?,
            &read(y_objects.get(path))?,
        )
        .with_context(|| format!("Failed to resolve {}", path))?;

        let hash = store.put(merged.as_bytes())?;
        tree.insert(path.clone(), Some(hash));
    }

    apply_tree(graph.repo(), &tree)?;

    Ok(MergeOutcome::Applied {
        base: base.hash,
        resolved: conflicts,
    })
}

/// Replace the working tree with `tree`
///
/// All tracked files are deleted before anything is restored, so a path
/// that resolved to absent never survives as a stale copy.
pub fn apply_tree(repo: &Repository, tree: &BTreeMap<String, Option<Blake3Hash>>) -> Result<()> {
    clear_working_tree(repo)?;

    let entries = tree
        .iter()
        .filter_map(|(path, hash)| hash.map(|h| (path.as_str(), h)));
    let restored = restore_objects(repo, entries).context("Failed to write merged tree")?;

    tracing::debug!("Applied merged tree ({} files)", restored);
    Ok(())
}

/// An inserted line and the skeleton index it follows (-1: before all)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Insertion<'a> {
    line: &'a str,
    anchor: isize,
}

/// Line-level merge of `x` and `y` against `base`
///
/// Total: any three texts produce a result. Text is split on `\n`, so
/// empty content is a single empty line.
pub fn resolve_conflict(base: &str, x: &str, y: &str) -> Result<String> {
    let base_lines: Vec<&str> = base.split('\n').collect();
    let x_lines: Vec<&str> = x.split('\n').collect();
    let y_lines: Vec<&str> = y.split('\n').collect();

    let lx = lcs(&base_lines, &x_lines)?;
    let ly = lcs(&base_lines, &y_lines)?;
    let skeleton = if lx.is_empty() || ly.is_empty() {
        Vec::new()
    } else {
        lcs(&lx, &ly)?
    };

    let x_insertions = insertions(&x_lines, &lx);
    let y_insertions = insertions(&y_lines, &ly);

    let mut out: Vec<&str> = Vec::with_capacity(skeleton.len() + x_insertions.len() + y_insertions.len());
    let (mut xi, mut yi) = (0, 0);

    for (i, line) in skeleton.iter().enumerate() {
        let i = i as isize;
        while xi < x_insertions.len() && x_insertions[xi].anchor < i {
            out.push(x_insertions[xi].line);
            xi += 1;
        }
        while yi < y_insertions.len() && y_insertions[yi].anchor < i {
            out.push(y_insertions[yi].line);
            yi += 1;
        }
        out.push(*line);
    }
    out.extend(x_insertions[xi..].iter().map(|ins| ins.line));
    out.extend(y_insertions[yi..].iter().map(|ins| ins.line));

    Ok(out.join("\n"))
}

/// Lines of `full` that are not part of its common subsequence `common`,
/// each anchored to the index in `common` of the line before it (-1 when
/// none); trailing lines anchor to the last common line
fn insertions<'a>(full: &[&'a str], common: &[&str]) -> Vec<Insertion<'a>> {
    let mut out = Vec::new();
    let mut pos = 0;

    for (k, line) in common.iter().enumerate() {
        while pos < full.len() && full[pos] != *line {
            out.push(Insertion {
                line: full[pos],
                anchor: k as isize - 1,
            });
            pos += 1;
        }
        pos += 1;
    }

    let last = common.len() as isize - 1;
    while pos < full.len() {
        out.push(Insertion {
            line: full[pos],
            anchor: last,
        });
        pos += 1;
    }

    out
}

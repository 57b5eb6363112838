//! Longest common subsequence
//!
//! The diff primitive behind conflict resolution. Classic O(n·m) dynamic
//! programming table followed by an iterative backtrack.

use crate::error::CoreError;
use anyhow::Result;

/// Longest common subsequence of `a` and `b`
///
/// Both inputs must be non-empty. Identical inputs are returned unchanged
/// without building the table. When the backtrack has a choice it moves up
/// (consuming `a`) unless the cell to the left is strictly larger.
pub fn lcs<T: PartialEq + Clone>(a: &[T], b: &[T]) -> Result<Vec<T>> {
    if a.is_empty() || b.is_empty() {
        return Err(CoreError::InvalidArgument(
            "cannot compute the LCS of an empty sequence".to_string(),
        )
        .into());
    }

    if a == b {
        return Ok(a.to_vec());
    }

    let table = build_table(a, b);
    let mut out = Vec::with_capacity(table[a.len()][b.len()]);
    let (mut i, mut j) = (a.len(), b.len());

    while i > 0 && j > 0 {
        if a[i - 1] == b[j - 1] {
            out.push(a[i - 1].clone());
            i -= 1;
            j -= 1;
        } else if table[i][j - 1] > table[i - 1][j] {
            j -= 1;
        } else {
            i -= 1;
        }
    }

    out.reverse();
    Ok(out)
}

/// Length of the longest common subsequence; empty inputs give 0
pub fn lcs_len<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    build_table(a, b)[a.len()][b.len()]
}

/// `table[i][j]` is the LCS length of `a[..i]` and `b[..j]`
fn build_table<T: PartialEq>(a: &[T], b: &[T]) -> Vec<Vec<usize>> {
    let mut table = vec![vec![0usize; b.len() + 1]; a.len() + 1];

    for i in 1..=a.len() {
        for j in 1..=b.len() {
            table[i][j] = if a[i - 1] == b[j - 1] {
                table[i - 1][j - 1] + 1
            } else {
                table[i][j - 1].max(table[i - 1][j])
            };
        }
    }

    table
}

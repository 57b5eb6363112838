//! History-level failures

use skein_core::Blake3Hash;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HistoryError {
    /// The two commits share no ancestor, so there is no merge base
    #[error("cannot merge unrelated histories: {x} and {y} have no common ancestor")]
    NoCommonAncestor { x: Blake3Hash, y: Blake3Hash },

    /// A commit with the same snapshot and timestamp is already stored
    #[error("commit {0} already exists")]
    DuplicateCommit(Blake3Hash),
}

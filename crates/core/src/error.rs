//! Typed failures that callers may want to match on
//!
//! Everything is still propagated as `anyhow::Error`; use
//! `err.downcast_ref::<CoreError>()` at a boundary to tell the classes apart.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// A non-empty hash or name was expected to exist on disk but does not
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A stored record could not be parsed
    #[error("corrupt store: {0}")]
    Corrupt(String),

    #[error("not a skein repository (no .skein directory found at {0})")]
    NotInitialized(String),

    #[error("repository already initialized at {0}")]
    AlreadyInitialized(String),
}

impl CoreError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound { kind, id: id.into() }
    }

    /// True when `err` (or anything in its chain) is a `NotFound`
    pub fn is_not_found(err: &anyhow::Error) -> bool {
        err.chain().any(|cause| {
            matches!(
                cause.downcast_ref::<CoreError>(),
                Some(CoreError::NotFound { .. })
            )
        })
    }

    /// True when `err` (or anything in its chain) is an `InvalidArgument`
    pub fn is_invalid_argument(err: &anyhow::Error) -> bool {
        err.chain().any(|cause| {
            matches!(
                cause.downcast_ref::<CoreError>(),
                Some(CoreError::InvalidArgument(_))
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = CoreError::not_found("commit", "abc");
        assert_eq!(err.to_string(), "commit not found: abc");
    }

    #[test]
    fn test_classification_through_context() {
        let err = anyhow::Error::new(CoreError::not_found("object", "ff"))
            .context("Failed to restore working tree");
        assert!(CoreError::is_not_found(&err));
        assert!(!CoreError::is_invalid_argument(&err));

        let err = anyhow::Error::new(CoreError::InvalidArgument("empty".into()));
        assert!(CoreError::is_invalid_argument(&err));
    }
}

use thiserror::Error;

/// Errors reported by forest operations.
///
/// Every variant indicates a caller programming error, not a transient
/// condition. An operation that returns an error has not touched the forest.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ForestError {
    #[error("node handle is stale or does not belong to this forest")]
    InvalidHandle,

    #[error("additional capacity must be positive")]
    InvalidCapacity,
}

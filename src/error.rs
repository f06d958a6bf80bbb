//! Error types for radix tree operations.

use thiserror::Error;

use crate::Index;

/// Result type alias using [`TreeError`].
pub type Result<T> = std::result::Result<T, TreeError>;

/// Errors returned by tree and allocator operations.
///
/// Every error is returned to the immediate caller. The tree never retries
/// internally, and a failed mutation leaves the tree exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The index cannot be addressed even at the tree's maximum height.
    #[error("index {index} exceeds the largest addressable index {max}")]
    IndexOutOfRange {
        /// The rejected index.
        index: Index,
        /// Largest index the tree can ever address.
        max: Index,
    },

    /// `reserve`/`insert` hit a slot that is already populated or reserved.
    #[error("index {index} is already occupied")]
    AlreadyOccupied {
        /// The occupied index.
        index: Index,
    },

    /// No entry exists at the index.
    #[error("no entry at index {index}")]
    NotFound {
        /// The missing index.
        index: Index,
    },

    /// The node allocator could not supply a node.
    #[error("node allocation failed")]
    OutOfMemory,

    /// A structural invariant does not hold. Only produced by
    /// [`RadixTree::check_invariants`](crate::RadixTree::check_invariants).
    #[error("tree invariant violated: {0}")]
    Corrupted(String),
}

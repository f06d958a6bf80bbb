//! # `RadixTree`
//!
//! A height-balanced fixed-radix trie mapping sparse `u64` indices to items.
//!
//! Every node has `WIDTH` slots (a power of two). An index is consumed
//! `log2(WIDTH)` bits at a time from the most significant end, one level per
//! node, so every lookup costs exactly `height` node visits. The tree starts
//! at height 0 and grows one level at a time when a larger index is stored.
//!
//! ## Example
//!
//! ```rust
//! use radixtree::{RadixTree, TreeError};
//!
//! let mut tree: RadixTree<String> = RadixTree::new();
//! tree.insert(7, "seven".to_string()).unwrap();
//! tree.insert(1 << 20, "far".to_string()).unwrap();
//!
//! assert_eq!(tree.lookup(7).map(String::as_str), Some("seven"));
//! assert_eq!(
//!     tree.insert(7, "again".to_string()),
//!     Err(TreeError::AlreadyOccupied { index: 7 })
//! );
//!
//! // Ordered scan, resumable from `next_index`.
//! let gang = tree.gang_lookup(0, 16);
//! let found: Vec<u64> = gang.entries.iter().map(|&(index, _)| index).collect();
//! assert_eq!(found, vec![7, 1 << 20]);
//!
//! assert_eq!(tree.delete(7).unwrap().as_deref(), Some("seven"));
//! ```
//!
//! ## Memory
//!
//! Nodes come from a [`NodeAllocator`]. The default [`NodePool`] keeps a
//! reserve of empty nodes so that mutations under [`AllocPolicy::Atomic`]
//! never touch the heap; [`RadixTree::preload`] stocks enough for one insert
//! at any index. Every mutation draws all the nodes it needs before changing
//! anything, so a failed allocation leaves the tree exactly as it was.
//!
//! ## Two-phase insertion
//!
//! [`RadixTree::reserve`] claims a slot and returns a [`SlotHandle`]; storing
//! the item afterwards cannot fail. A reservation counts toward
//! [`len`](RadixTree::len) but reads as absent.
//!
//! ## Thread Safety
//!
//! None built in. Mutation takes `&mut self`; wrap the tree in a lock to
//! share it.

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Slot offset math is on every descent; benchmarks back the placement.
#![allow(clippy::inline_always)]

pub mod alloc;
pub mod capacity;
pub mod config;
pub mod error;
pub mod node;
pub mod tree;

mod tracing_helpers;

/// Key type of a [`RadixTree`].
pub type Index = u64;

// Re-export main types for convenience
pub use alloc::{HeapAllocator, NodeAllocator, NodePool};
pub use config::{AllocPolicy, PoolConfig, TreeConfig};
pub use error::{Result, TreeError};
pub use node::Node;
pub use tree::{GangLookup, Iter, RadixTree, SlotHandle, SlotState, TreeStats};

//! Filepath: src/tree.rs
//!
//! [`RadixTree`] - a height-balanced fixed-radix trie over sparse indices.
//!
//! This module holds the tree root and its lifecycle. The operations live in
//! submodules:
//!
//! - `insert`: height extension, `reserve`, `insert`, `populate`
//! - `lookup`: point reads
//! - `delete`: path-tracked removal with node collapse
//! - `gang`: ordered range scan and iteration
//! - `check`: debug traversal of the structural invariants

use std::fmt as StdFmt;

use crate::Index;
use crate::alloc::{NodeAllocator, NodePool};
use crate::capacity::{full_height, max_index};
use crate::config::{AllocPolicy, TreeConfig};
use crate::error::Result;
use crate::node::{Node, Slot};
use crate::tracing_helpers::debug_log;

mod check;
mod delete;
mod gang;
mod insert;
mod lookup;

pub use check::TreeStats;
pub use gang::{GangLookup, Iter};
pub use insert::SlotHandle;
pub use lookup::SlotState;

// ============================================================================
//  RadixTree
// ============================================================================

/// A sparse array mapping [`Index`] keys to items of type `T`.
///
/// The tree grows one level at a time as larger indices are stored and never
/// shrinks: deleting entries releases emptied nodes but keeps the height.
///
/// # Type Parameters
///
/// - `T` - The item type
/// - `WIDTH` - Slots per node; a power of two in `2..=256`
/// - `A` - Node allocator (must implement [`NodeAllocator`])
///
/// # Example
///
/// ```rust
/// use radixtree::RadixTree;
///
/// let mut tree: RadixTree<&str> = RadixTree::new();
/// tree.insert(4096, "page").unwrap();
///
/// assert_eq!(tree.lookup(4096), Some(&"page"));
/// assert_eq!(tree.lookup(4095), None);
/// assert!(tree.max_index() >= 4096);
/// ```
///
/// # Concurrency
///
/// There is no internal locking. Mutation takes `&mut self`; callers sharing
/// a tree wrap it in their own lock.
pub struct RadixTree<T, const WIDTH: usize = 64, A = NodePool<T, WIDTH>>
where
    A: NodeAllocator<T, WIDTH>,
{
    /// Top node, or the lone entry when `height == 0`.
    top: Slot<T, WIDTH>,

    /// Levels between the root and the leaf level.
    height: u32,

    /// Height the tree may grow to.
    max_height: u32,

    /// Occupied leaf slots, reservations included.
    len: usize,

    /// Forwarded to the allocator on every node allocation.
    policy: AllocPolicy,

    allocator: A,
}

impl<T, const WIDTH: usize, A> StdFmt::Debug for RadixTree<T, WIDTH, A>
where
    A: NodeAllocator<T, WIDTH>,
{
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        f.debug_struct("RadixTree")
            .field("width", &WIDTH)
            .field("height", &self.height)
            .field("max_height", &self.max_height)
            .field("len", &self.len)
            .field("policy", &self.policy)
            .field("nodes", &self.allocator.outstanding())
            .finish_non_exhaustive()
    }
}

// ============================================================================
//  Pool-backed constructors
// ============================================================================

impl<T, const WIDTH: usize> RadixTree<T, WIDTH, NodePool<T, WIDTH>> {
    /// Create an empty tree over an unbounded node pool.
    #[must_use]
    pub fn new() -> Self {
        Self::with_allocator(NodePool::default(), AllocPolicy::Blocking)
    }

    /// Create an empty tree from `config`, filling the pool reserve.
    ///
    /// # Errors
    ///
    /// [`TreeError::OutOfMemory`](crate::TreeError::OutOfMemory) if the pool's
    /// node limit cannot accommodate its reserve.
    pub fn with_config(config: &TreeConfig) -> Result<Self> {
        let pool: NodePool<T, WIDTH> = NodePool::new(&config.pool)?;
        let tree: Self = Self::with_allocator(pool, config.policy);

        Ok(match config.max_height {
            Some(max_height) => tree.with_max_height(max_height),
            None => tree,
        })
    }
}

impl<T, const WIDTH: usize> Default for RadixTree<T, WIDTH, NodePool<T, WIDTH>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const WIDTH: usize, B> RadixTree<T, WIDTH, NodePool<T, WIDTH, B>>
where
    B: NodeAllocator<T, WIDTH>,
{
    /// Stock the pool with enough nodes for one insertion at any index.
    ///
    /// The worst case adds every missing level and then a full path beside
    /// the old top: `2 * max_height - 1` nodes. After a successful preload the
    /// next `reserve`/`insert` cannot fail with `OutOfMemory`, even under
    /// [`AllocPolicy::Atomic`].
    ///
    /// # Errors
    ///
    /// [`TreeError::OutOfMemory`](crate::TreeError::OutOfMemory) if the backing
    /// allocator cannot supply the nodes.
    pub fn preload(&mut self) -> Result<()> {
        self.allocator
            .preload((2 * self.max_height as usize).saturating_sub(1))
    }
}

// ============================================================================
//  Accessors and lifecycle
// ============================================================================

impl<T, const WIDTH: usize, A> RadixTree<T, WIDTH, A>
where
    A: NodeAllocator<T, WIDTH>,
{
    /// Index bits consumed per level.
    pub(crate) const SHIFT: u32 = Node::<T, WIDTH>::SHIFT;

    /// Slot offset mask.
    pub(crate) const MASK: usize = Node::<T, WIDTH>::MASK;

    /// Create an empty tree drawing nodes from `allocator` under `policy`.
    #[must_use]
    pub fn with_allocator(allocator: A, policy: AllocPolicy) -> Self {
        Self {
            top: Slot::Empty,
            height: 0,
            max_height: full_height(Self::SHIFT),
            len: 0,
            policy,
            allocator,
        }
    }

    /// Cap the height this tree may grow to.
    ///
    /// The cap is clamped between the current height and the height that
    /// covers the whole index space.
    #[must_use]
    pub fn with_max_height(mut self, max_height: u32) -> Self {
        self.max_height = max_height.clamp(self.height, full_height(Self::SHIFT));
        debug_log!(max_height = self.max_height, "tree height capped");
        self
    }

    /// Current height.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Height the tree may grow to.
    #[inline]
    #[must_use]
    pub const fn max_height(&self) -> u32 {
        self.max_height
    }

    /// Largest index addressable at the current height.
    #[inline]
    #[must_use]
    pub const fn max_index(&self) -> Index {
        max_index(self.height, Self::SHIFT)
    }

    /// Largest index the tree can ever address.
    #[inline]
    #[must_use]
    pub const fn index_limit(&self) -> Index {
        max_index(self.max_height, Self::SHIFT)
    }

    /// Number of occupied indices, reservations included.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether no index is occupied.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Allocation policy in effect.
    #[inline]
    #[must_use]
    pub const fn policy(&self) -> AllocPolicy {
        self.policy
    }

    /// Change the allocation policy for subsequent mutations.
    pub fn set_policy(&mut self, policy: AllocPolicy) {
        self.policy = policy;
    }

    /// The node allocator.
    #[inline]
    #[must_use]
    pub const fn allocator(&self) -> &A {
        &self.allocator
    }

    /// The node allocator, mutably (e.g. to preload a custom pool).
    #[inline]
    pub fn allocator_mut(&mut self) -> &mut A {
        &mut self.allocator
    }

    /// Remove every entry and hand all nodes back to the allocator.
    ///
    /// The height is kept.
    pub fn clear(&mut self) {
        let mut stack: Vec<Box<Node<T, WIDTH>>> = Vec::new();
        if let Slot::Child(top) = self.top.take() {
            stack.push(top);
        }

        while let Some(mut node) = stack.pop() {
            for slot in &mut node.slots {
                if let Slot::Child(child) = slot.take() {
                    stack.push(child);
                }
            }
            node.count = 0;
            self.allocator.free_node(node);
        }

        self.len = 0;
    }
}

// ============================================================================
//  Tests
// ============================================================================

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Fail fast in tests")]
mod tests {
    use super::*;
    use crate::alloc::HeapAllocator;
    use crate::config::PoolConfig;
    use crate::error::TreeError;

    #[test]
    fn test_new_tree_is_empty() {
        let tree: RadixTree<u64> = RadixTree::new();

        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.max_index(), 0);
        assert_eq!(tree.max_height(), 11);
        assert_eq!(tree.index_limit(), Index::MAX);
        assert_eq!(tree.policy(), AllocPolicy::Blocking);
        assert_eq!(tree.allocator().outstanding(), 0);
    }

    #[test]
    fn test_default_matches_new() {
        let tree: RadixTree<u64, 16> = RadixTree::default();

        assert_eq!(tree.max_height(), 16);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_with_config() {
        let config = TreeConfig::default()
            .with_policy(AllocPolicy::Atomic)
            .with_max_height(2)
            .with_pool(PoolConfig::default().with_reserve_nodes(3));
        let tree: RadixTree<u64, 4> = RadixTree::with_config(&config).unwrap();

        assert_eq!(tree.policy(), AllocPolicy::Atomic);
        assert_eq!(tree.max_height(), 2);
        assert_eq!(tree.index_limit(), 15);
        assert_eq!(tree.allocator().reserved(), 3);
    }

    #[test]
    fn test_with_config_reports_pool_failure() {
        let config = TreeConfig::default()
            .with_pool(PoolConfig::default().with_reserve_nodes(8).with_node_limit(2));
        let result: Result<RadixTree<u64, 4>> = RadixTree::with_config(&config);

        assert_eq!(result.unwrap_err(), TreeError::OutOfMemory);
    }

    #[test]
    fn test_max_height_is_clamped() {
        let tree: RadixTree<u64, 64, HeapAllocator> =
            RadixTree::with_allocator(HeapAllocator::unbounded(), AllocPolicy::Blocking)
                .with_max_height(1000);

        assert_eq!(tree.max_height(), 11);
    }

    #[test]
    fn test_set_policy() {
        let mut tree: RadixTree<u64> = RadixTree::new();
        tree.set_policy(AllocPolicy::Atomic);

        assert_eq!(tree.policy(), AllocPolicy::Atomic);
    }

    #[test]
    fn test_clear_returns_nodes_and_keeps_height() {
        let mut tree: RadixTree<u64, 4> = RadixTree::new();
        for index in [0, 5, 17, 300] {
            tree.insert(index, index * 10).unwrap();
        }
        let height: u32 = tree.height();
        assert!(tree.allocator().outstanding() > 0);

        tree.clear();

        assert!(tree.is_empty());
        assert_eq!(tree.height(), height);
        assert_eq!(tree.allocator().outstanding(), 0);
        assert_eq!(tree.lookup(17), None);
        tree.check_invariants().unwrap();

        tree.insert(17, 1).unwrap();
        assert_eq!(tree.lookup(17), Some(&1));
    }

    #[test]
    fn test_preload_fills_for_one_insert() {
        let mut tree: RadixTree<u64, 4> = RadixTree::new();
        tree.set_policy(AllocPolicy::Atomic);

        assert_eq!(
            tree.insert(1000, 1).unwrap_err(),
            TreeError::OutOfMemory
        );

        tree.preload().unwrap();
        assert_eq!(tree.allocator().reserved(), 63);
        tree.insert(Index::MAX, 1).unwrap();
        assert_eq!(tree.lookup(Index::MAX), Some(&1));
    }

    #[test]
    fn test_debug_output() {
        let tree: RadixTree<u64, 8> = RadixTree::new();
        let text: String = format!("{tree:?}");

        assert!(text.contains("RadixTree"));
        assert!(text.contains("width: 8"));
    }
}

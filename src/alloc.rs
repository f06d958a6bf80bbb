//! Node allocation abstraction for [`RadixTree`](crate::RadixTree).
//!
//! This module provides the [`NodeAllocator`] trait that abstracts how nodes
//! are obtained and released, with two implementations:
//!
//! - [`HeapAllocator`]: plain heap allocation that may fail once an optional
//!   node limit is reached.
//! - [`NodePool`]: a bounded reserve of pre-allocated empty nodes in front of
//!   a backing allocator. A filled reserve lets a mutation obtain nodes even
//!   while the backing allocator is failing.

use std::fmt as StdFmt;

use crate::config::{AllocPolicy, DEFAULT_RESERVE_NODES, PoolConfig};
use crate::error::{Result, TreeError};
use crate::node::Node;
use crate::tracing_helpers::{trace_log, warn_log};

// ============================================================================
//  NodeAllocator
// ============================================================================

/// Trait for allocating and releasing tree nodes.
///
/// Implementations must guarantee:
///
/// 1. **Empty nodes**: every node returned by [`alloc_node`](Self::alloc_node)
///    has `count == 0` and all slots empty.
///
/// 2. **Explicit failure**: exhaustion is reported as
///    [`TreeError::OutOfMemory`], never by blocking or panicking.
///
/// The tree only ever hands back nodes that are empty again.
///
/// # Type Parameters
///
/// * `T` - The item type stored in leaf slots
/// * `WIDTH` - The node width (number of slots)
pub trait NodeAllocator<T, const WIDTH: usize> {
    /// Obtain an empty node.
    ///
    /// # Errors
    ///
    /// [`TreeError::OutOfMemory`] if no node can be supplied under `policy`.
    fn alloc_node(&mut self, policy: AllocPolicy) -> Result<Box<Node<T, WIDTH>>>;

    /// Release an empty node.
    fn free_node(&mut self, node: Box<Node<T, WIDTH>>);

    /// Nodes handed out by this allocator and not yet released.
    fn outstanding(&self) -> usize;
}

// ============================================================================
//  HeapAllocator
// ============================================================================

/// Plain heap allocator with an optional cap on outstanding nodes.
///
/// The cap models memory pressure: once `limit` nodes are outstanding,
/// allocation fails until some are released. The policy is ignored.
#[derive(Debug, Clone, Default)]
pub struct HeapAllocator {
    outstanding: usize,

    limit: Option<usize>,
}

impl HeapAllocator {
    /// Allocator that never fails.
    #[must_use]
    pub const fn unbounded() -> Self {
        Self {
            outstanding: 0,
            limit: None,
        }
    }

    /// Allocator that fails once `limit` nodes are outstanding.
    #[must_use]
    pub const fn with_limit(limit: usize) -> Self {
        Self {
            outstanding: 0,
            limit: Some(limit),
        }
    }

    /// The configured cap, if any.
    #[inline]
    #[must_use]
    pub const fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Nodes allocated and not yet freed.
    #[inline]
    #[must_use]
    pub const fn outstanding(&self) -> usize {
        self.outstanding
    }
}

impl<T, const WIDTH: usize> NodeAllocator<T, WIDTH> for HeapAllocator {
    fn alloc_node(&mut self, _policy: AllocPolicy) -> Result<Box<Node<T, WIDTH>>> {
        if self.limit.is_some_and(|limit| self.outstanding >= limit) {
            return Err(TreeError::OutOfMemory);
        }

        self.outstanding += 1;
        Ok(Node::new_boxed())
    }

    fn free_node(&mut self, node: Box<Node<T, WIDTH>>) {
        debug_assert!(node.is_empty(), "freed node still holds entries");
        self.outstanding = self.outstanding.saturating_sub(1);
        drop(node);
    }

    fn outstanding(&self) -> usize {
        Self::outstanding(self)
    }
}

// ============================================================================
//  NodePool
// ============================================================================

/// Reserve of empty nodes backed by another allocator.
///
/// Allocation under [`AllocPolicy::Blocking`] tries the backing allocator
/// first and falls back to the reserve. Under [`AllocPolicy::Atomic`] only the
/// reserve is used, so callers that must not block [`preload`](Self::preload)
/// before mutating. Released nodes refill the reserve up to its target size;
/// the rest go back to the backing allocator.
///
/// # Type Parameters
///
/// * `T` - The item type stored in leaf slots
/// * `WIDTH` - The node width (number of slots)
/// * `B` - The backing allocator
pub struct NodePool<T, const WIDTH: usize, B = HeapAllocator> {
    /// Empty nodes ready to hand out.
    reserve: Vec<Box<Node<T, WIDTH>>>,

    /// Reserve size maintained by `free_node` and `fill`.
    target: usize,

    backing: B,

    /// Nodes handed to callers, from either source.
    outstanding: usize,
}

impl<T, const WIDTH: usize, B> StdFmt::Debug for NodePool<T, WIDTH, B>
where
    B: StdFmt::Debug,
{
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        f.debug_struct("NodePool")
            .field("reserved", &self.reserve.len())
            .field("target", &self.target)
            .field("outstanding", &self.outstanding)
            .field("backing", &self.backing)
            .finish()
    }
}

impl<T, const WIDTH: usize> NodePool<T, WIDTH, HeapAllocator> {
    /// Create a pool from `config` and fill its reserve.
    ///
    /// # Errors
    ///
    /// [`TreeError::OutOfMemory`] if `node_limit` is smaller than the reserve.
    pub fn new(config: &PoolConfig) -> Result<Self> {
        let backing: HeapAllocator = match config.node_limit {
            Some(limit) => HeapAllocator::with_limit(limit),
            None => HeapAllocator::unbounded(),
        };

        let mut pool: Self = Self::with_backing(backing, config.reserve_nodes);
        pool.fill()?;
        Ok(pool)
    }
}

impl<T, const WIDTH: usize> Default for NodePool<T, WIDTH, HeapAllocator> {
    /// Unbounded pool with the default reserve target, filled lazily.
    fn default() -> Self {
        Self::with_backing(HeapAllocator::unbounded(), DEFAULT_RESERVE_NODES)
    }
}

impl<T, const WIDTH: usize, B: NodeAllocator<T, WIDTH>> NodePool<T, WIDTH, B> {
    /// Create a pool over `backing` with an empty reserve of target size
    /// `reserve_nodes`. Call [`fill`](Self::fill) to pre-allocate it.
    #[must_use]
    pub const fn with_backing(backing: B, reserve_nodes: usize) -> Self {
        Self {
            reserve: Vec::new(),
            target: reserve_nodes,
            backing,
            outstanding: 0,
        }
    }

    /// Top the reserve up to its target size.
    ///
    /// # Errors
    ///
    /// [`TreeError::OutOfMemory`] if the backing allocator fails. Nodes
    /// obtained before the failure stay in the reserve.
    pub fn fill(&mut self) -> Result<()> {
        self.preload(self.target)
    }

    /// Ensure at least `nodes` empty nodes are held in reserve.
    ///
    /// # Errors
    ///
    /// [`TreeError::OutOfMemory`] if the backing allocator fails.
    pub fn preload(&mut self, nodes: usize) -> Result<()> {
        while self.reserve.len() < nodes {
            let node: Box<Node<T, WIDTH>> = self.backing.alloc_node(AllocPolicy::Blocking)?;
            self.reserve.push(node);
        }
        Ok(())
    }

    /// Nodes currently held in reserve.
    #[inline]
    #[must_use]
    pub fn reserved(&self) -> usize {
        self.reserve.len()
    }

    /// Reserve size maintained by the pool.
    #[inline]
    #[must_use]
    pub const fn reserve_target(&self) -> usize {
        self.target
    }

    /// The backing allocator.
    #[inline]
    #[must_use]
    pub const fn backing(&self) -> &B {
        &self.backing
    }
}

impl<T, const WIDTH: usize, B: NodeAllocator<T, WIDTH>> NodeAllocator<T, WIDTH>
    for NodePool<T, WIDTH, B>
{
    fn alloc_node(&mut self, policy: AllocPolicy) -> Result<Box<Node<T, WIDTH>>> {
        let node: Option<Box<Node<T, WIDTH>>> = match policy {
            AllocPolicy::Blocking => self
                .backing
                .alloc_node(policy)
                .ok()
                .or_else(|| self.reserve.pop()),

            AllocPolicy::Atomic => self.reserve.pop(),
        };

        let Some(node) = node else {
            warn_log!(?policy, outstanding = self.outstanding, "node pool exhausted");
            return Err(TreeError::OutOfMemory);
        };

        self.outstanding += 1;
        trace_log!(reserved = self.reserve.len(), "node allocated");
        Ok(node)
    }

    fn free_node(&mut self, node: Box<Node<T, WIDTH>>) {
        debug_assert!(node.is_empty(), "freed node still holds entries");
        self.outstanding = self.outstanding.saturating_sub(1);

        if self.reserve.len() < self.target {
            self.reserve.push(node);
        } else {
            self.backing.free_node(node);
        }
        trace_log!(reserved = self.reserve.len(), "node released");
    }

    fn outstanding(&self) -> usize {
        self.outstanding
    }
}

// ============================================================================
//  Tests
// ============================================================================

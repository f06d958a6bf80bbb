//! Configuration for trees and their node pools.
//!
//! With the `serde` feature enabled every type here can be loaded from a
//! host's configuration file; missing fields take their defaults.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default number of nodes a [`NodePool`](crate::NodePool) keeps in reserve.
///
/// One worst-case insertion into a full-height `WIDTH = 64` tree (`2 * 11 - 1`).
pub const DEFAULT_RESERVE_NODES: usize = 21;

/// How a tree may obtain new nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AllocPolicy {
    /// The caller may block: use the backing allocator, then the reserve.
    #[default]
    Blocking,

    /// The caller must not block: only the pre-filled reserve is used.
    Atomic,
}

/// Sizing of a [`NodePool`](crate::NodePool).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PoolConfig {
    /// Nodes kept pre-allocated for allocations that must not fail.
    pub reserve_nodes: usize,

    /// Cap on nodes outstanding from the backing allocator (`None` = unbounded).
    pub node_limit: Option<usize>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            reserve_nodes: DEFAULT_RESERVE_NODES,
            node_limit: None,
        }
    }
}

impl PoolConfig {
    /// Set the reserve size.
    #[must_use]
    pub const fn with_reserve_nodes(mut self, reserve_nodes: usize) -> Self {
        self.reserve_nodes = reserve_nodes;
        self
    }

    /// Cap the backing allocator.
    #[must_use]
    pub const fn with_node_limit(mut self, node_limit: usize) -> Self {
        self.node_limit = Some(node_limit);
        self
    }
}

/// Configuration for a [`RadixTree`](crate::RadixTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TreeConfig {
    /// Policy forwarded to the allocator on every node allocation.
    pub policy: AllocPolicy,

    /// Height cap (`None` = enough levels for the whole index space).
    pub max_height: Option<u32>,

    /// Node pool sizing.
    pub pool: PoolConfig,
}

impl TreeConfig {
    /// Set the allocation policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: AllocPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Cap the tree height.
    #[must_use]
    pub const fn with_max_height(mut self, max_height: u32) -> Self {
        self.max_height = Some(max_height);
        self
    }

    /// Set the pool sizing.
    #[must_use]
    pub const fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }
}

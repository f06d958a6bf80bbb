//! Filepath: src/node.rs
//!
//! Fixed-width trie node.
//!
//! A node is an array of `WIDTH` slots plus a count of the occupied ones.
//! Whether a node is interior or leaf follows from its level in the tree:
//! interior slots only ever hold [`Slot::Child`], leaf slots only
//! [`Slot::Item`] or [`Slot::Reserved`].
//!
//! ```text
//!   height 2, WIDTH 4 (shift 2), index 9 = 0b10_01
//!
//!   top  [ .  .  C  . ]      offset (9 >> 2) & 3 = 2
//!               |
//!   leaf       [ .  I  .  . ]  offset 9 & 3 = 1
//! ```

use std::fmt as StdFmt;

// ============================================================================
//  Slot
// ============================================================================

/// One entry of a [`Node`].
pub(crate) enum Slot<T, const WIDTH: usize> {
    /// Nothing stored.
    Empty,

    /// Claimed by `reserve`, not yet populated.
    Reserved,

    /// Interior level: owned child node.
    Child(Box<Node<T, WIDTH>>),

    /// Leaf level: caller item.
    Item(T),
}

impl<T, const WIDTH: usize> Slot<T, WIDTH> {
    #[inline]
    pub(crate) const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    #[inline]
    pub(crate) fn take(&mut self) -> Self {
        std::mem::replace(self, Self::Empty)
    }

    #[inline]
    pub(crate) fn child(&self) -> Option<&Node<T, WIDTH>> {
        match self {
            Self::Child(node) => Some(node),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn child_mut(&mut self) -> Option<&mut Node<T, WIDTH>> {
        match self {
            Self::Child(node) => Some(node),
            _ => None,
        }
    }

    /// Kind name for diagnostics.
    pub(crate) const fn kind(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Reserved => "reserved",
            Self::Child(_) => "child",
            Self::Item(_) => "item",
        }
    }
}

impl<T, const WIDTH: usize> StdFmt::Debug for Slot<T, WIDTH> {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        f.write_str(self.kind())
    }
}

// ============================================================================
//  Node
// ============================================================================

/// A trie node with `WIDTH` slots.
///
/// Nodes are created empty by a [`NodeAllocator`](crate::NodeAllocator) and
/// must be handed back empty. Callers never see node contents; the type is
/// public only so allocators can be written outside this crate.
///
/// # Invariants
/// - `count` equals the number of non-empty slots.
/// - A node reachable from a tree never has `count == 0`.
pub struct Node<T, const WIDTH: usize = 64> {
    /// Number of non-empty slots.
    pub(crate) count: usize,

    pub(crate) slots: [Slot<T, WIDTH>; WIDTH],
}

impl<T, const WIDTH: usize> StdFmt::Debug for Node<T, WIDTH> {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        f.debug_struct("Node")
            .field("width", &WIDTH)
            .field("count", &self.count)
            .finish_non_exhaustive()
    }
}

impl<T, const WIDTH: usize> Node<T, WIDTH> {
    /// `log2(WIDTH)`. Evaluating it rejects illegal widths at compile time.
    pub const SHIFT: u32 = {
        assert!(WIDTH >= 2, "WIDTH must be at least 2");
        assert!(WIDTH <= 256, "WIDTH must be at most 256");
        assert!(WIDTH.is_power_of_two(), "WIDTH must be a power of two");
        WIDTH.trailing_zeros()
    };

    /// Mask selecting a slot offset.
    pub const MASK: usize = WIDTH - 1;

    /// Allocate an empty node on the heap.
    #[must_use]
    pub fn new_boxed() -> Box<Self> {
        let _: u32 = Self::SHIFT;
        Box::new(Self {
            count: 0,
            slots: std::array::from_fn(|_| Slot::Empty),
        })
    }

    /// Number of occupied slots.
    #[inline]
    #[must_use]
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Whether every slot is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of slots actually occupied, counted slot by slot.
    pub(crate) fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| !slot.is_empty()).count()
    }

    /// First non-empty slot at or after `from`.
    #[inline]
    pub(crate) fn next_occupied(&self, from: usize) -> Option<usize> {
        (from..WIDTH).find(|&i| !self.slots[i].is_empty())
    }
}

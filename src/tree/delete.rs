//! Deletion with path tracking and node collapse.
//!
//! The descent records each node and the slot taken out of it in a fixed-size
//! [`Path`]. After the leaf slot is cleared the path is unwound bottom-up:
//! every node whose count drops to zero is unlinked from its parent and handed
//! back to the allocator. The height never changes.

use std::ptr as StdPtr;

use crate::Index;
use crate::alloc::NodeAllocator;
use crate::capacity::{MAX_PATH, slot_offset};
use crate::error::{Result, TreeError};
use crate::node::{Node, Slot};
use crate::tracing_helpers::trace_log;

use super::RadixTree;

// ============================================================================
//  Path
// ============================================================================

/// Root-to-leaf record of (node, slot offset) pairs. Never allocates.
struct Path<T, const WIDTH: usize> {
    entries: [(*mut Node<T, WIDTH>, usize); MAX_PATH],

    len: usize,
}

impl<T, const WIDTH: usize> Path<T, WIDTH> {
    const fn new() -> Self {
        Self {
            entries: [(StdPtr::null_mut(), 0); MAX_PATH],
            len: 0,
        }
    }

    #[inline]
    fn push(&mut self, node: *mut Node<T, WIDTH>, offset: usize) {
        debug_assert!(self.len < MAX_PATH, "path deeper than any legal height");
        self.entries[self.len] = (node, offset);
        self.len += 1;
    }

    #[inline]
    const fn get(&self, depth: usize) -> (*mut Node<T, WIDTH>, usize) {
        self.entries[depth]
    }
}

// ============================================================================
//  Delete
// ============================================================================

impl<T, const WIDTH: usize, A> RadixTree<T, WIDTH, A>
where
    A: NodeAllocator<T, WIDTH>,
{
    /// Remove the entry at `index`.
    ///
    /// Returns the removed item, or `None` when the slot only held a
    /// reservation (which is cancelled). Nodes left empty are released; the
    /// height is kept.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotFound`] if nothing is stored at `index`.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(self)))]
    pub fn delete(&mut self, index: Index) -> Result<Option<T>> {
        if index > self.max_index() {
            return Err(TreeError::NotFound { index });
        }

        if self.height == 0 {
            let removed: Option<T> = match self.top.take() {
                Slot::Item(item) => Some(item),
                Slot::Reserved => None,
                other => {
                    self.top = other;
                    return Err(TreeError::NotFound { index });
                }
            };
            self.len -= 1;
            return Ok(removed);
        }

        let mut path: Path<T, WIDTH> = Path::new();
        let Some(top) = self.top.child_mut() else {
            return Err(TreeError::NotFound { index });
        };

        let mut node: *mut Node<T, WIDTH> = StdPtr::from_mut(top);
        let mut shift: u32 = (self.height - 1) * Self::SHIFT;
        loop {
            let offset: usize = slot_offset(index, shift, Self::MASK);
            path.push(node, offset);
            if shift == 0 {
                break;
            }

            // SAFETY: `node` points into the tree owned by `self`, which is
            // borrowed mutably for this whole call. Nothing else aliases it.
            let child: Option<&mut Node<T, WIDTH>> = unsafe { (*node).slots[offset].child_mut() };
            let Some(child) = child else {
                return Err(TreeError::NotFound { index });
            };
            node = StdPtr::from_mut(child);
            shift -= Self::SHIFT;
        }

        let (leaf, offset) = path.get(path.len - 1);
        // SAFETY: `leaf` is the last node recorded above and is still linked.
        let leaf_slot: &mut Slot<T, WIDTH> = unsafe { &mut (*leaf).slots[offset] };
        let removed: Option<T> = match leaf_slot.take() {
            Slot::Item(item) => Some(item),
            Slot::Reserved => None,
            other => {
                *leaf_slot = other;
                return Err(TreeError::NotFound { index });
            }
        };

        self.len -= 1;
        Self::collapse(&mut self.top, &mut self.allocator, &path);
        Ok(removed)
    }

    /// Unwind `path` after its leaf slot was cleared, releasing every node
    /// whose count reaches zero.
    fn collapse(top: &mut Slot<T, WIDTH>, allocator: &mut A, path: &Path<T, WIDTH>) {
        let mut depth: usize = path.len - 1;
        loop {
            let (node, _) = path.get(depth);

            // SAFETY: nodes at `depth` and above are still linked; only deeper
            // nodes have been released so far.
            let remaining: usize = unsafe {
                (*node).count -= 1;
                (*node).count
            };
            if remaining > 0 {
                return;
            }

            let detached: Slot<T, WIDTH> = if depth == 0 {
                top.take()
            } else {
                let (parent, offset) = path.get(depth - 1);
                // SAFETY: the parent sits above `node` on the path and is linked.
                unsafe { (*parent).slots[offset].take() }
            };
            if let Slot::Child(empty) = detached {
                trace_log!(depth, "releasing empty node");
                allocator.free_node(empty);
            }

            if depth == 0 {
                return;
            }
            depth -= 1;
        }
    }
}

// ============================================================================
//  Tests
// ============================================================================

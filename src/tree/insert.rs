//! Height extension and two-phase insertion.
//!
//! Every mutation here first works out how many nodes it needs, draws all of
//! them from the allocator into a [`NodeBatch`], and only then touches the
//! tree. A failed draw hands the batch back and leaves the tree unchanged.

use smallvec::SmallVec;

use crate::Index;
use crate::alloc::NodeAllocator;
use crate::capacity::{max_index, required_height, slot_offset};
use crate::error::{Result, TreeError};
use crate::node::{Node, Slot};
use crate::tracing_helpers::{debug_log, trace_log};

use super::RadixTree;

/// Nodes drawn ahead of a mutation. Inline capacity covers a full-height
/// `WIDTH = 64` path.
type NodeBatch<T, const WIDTH: usize> = SmallVec<[Box<Node<T, WIDTH>>; 12]>;

#[expect(clippy::expect_used, reason = "batch is sized by nodes_needed")]
fn take_node<T, const WIDTH: usize>(batch: &mut NodeBatch<T, WIDTH>) -> Box<Node<T, WIDTH>> {
    batch.pop().expect("node batch exhausted")
}

// ============================================================================
//  SlotHandle
// ============================================================================

/// A reserved slot returned by [`RadixTree::reserve`].
///
/// The slot holds the reservation until [`fill`](Self::fill) stores the item.
/// Dropping the handle keeps the reservation; complete it later with
/// [`RadixTree::populate`] or cancel it with [`RadixTree::delete`].
#[derive(Debug)]
pub struct SlotHandle<'a, T, const WIDTH: usize> {
    slot: &'a mut Slot<T, WIDTH>,

    index: Index,
}

impl<'a, T, const WIDTH: usize> SlotHandle<'a, T, WIDTH> {
    /// Index of the reserved slot.
    #[inline]
    #[must_use]
    pub const fn index(&self) -> Index {
        self.index
    }

    /// Store `item` in the reserved slot.
    pub fn fill(self, item: T) -> &'a mut T {
        *self.slot = Slot::Item(item);

        let Slot::Item(stored) = self.slot else {
            unreachable!("slot was just filled");
        };
        stored
    }
}

// ============================================================================
//  Extension and insertion
// ============================================================================

impl<T, const WIDTH: usize, A> RadixTree<T, WIDTH, A>
where
    A: NodeAllocator<T, WIDTH>,
{
    /// Grow the tree until `index` is addressable.
    ///
    /// An empty tree only records the new height; a populated one gains one
    /// node per added level, each holding the previous top in slot 0.
    ///
    /// # Errors
    ///
    /// - [`TreeError::IndexOutOfRange`] if `index` is beyond the height cap.
    /// - [`TreeError::OutOfMemory`] if the nodes cannot be drawn. The height
    ///   is unchanged.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(self)))]
    pub fn extend(&mut self, index: Index) -> Result<()> {
        let target: u32 = self.target_height(index)?;
        if target == self.height {
            return Ok(());
        }

        let growth: usize = if self.top.is_empty() {
            0
        } else {
            (target - self.height) as usize
        };
        let mut batch: NodeBatch<T, WIDTH> = self.draw_nodes(growth)?;
        self.grow(target, &mut batch);
        debug_assert!(batch.is_empty());
        Ok(())
    }

    /// Claim the slot at `index` with a reservation.
    ///
    /// The first phase of a two-phase insert: the slot and every node above it
    /// exist once this returns, so storing the item cannot fail.
    ///
    /// # Errors
    ///
    /// - [`TreeError::AlreadyOccupied`] if the slot holds an item or reservation.
    /// - [`TreeError::IndexOutOfRange`] if `index` is beyond the height cap.
    /// - [`TreeError::OutOfMemory`] if the nodes cannot be drawn. The tree is
    ///   unchanged.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(self)))]
    pub fn reserve(&mut self, index: Index) -> Result<SlotHandle<'_, T, WIDTH>> {
        let target: u32 = self.target_height(index)?;
        let needed: usize = self.nodes_needed(index, target);

        // With no nodes to add the leaf slot already exists and may be taken.
        if needed == 0 && !self.leaf_slot(index).is_none_or(Slot::is_empty) {
            return Err(TreeError::AlreadyOccupied { index });
        }

        let mut batch: NodeBatch<T, WIDTH> = self.draw_nodes(needed)?;
        self.grow(target, &mut batch);
        self.len += 1;

        let slot: &mut Slot<T, WIDTH> =
            Self::claim_slot(&mut self.top, self.height, index, &mut batch);
        debug_assert!(batch.is_empty());

        Ok(SlotHandle { slot, index })
    }

    /// Store `item` at `index`.
    ///
    /// # Errors
    ///
    /// Same as [`reserve`](Self::reserve). `item` is dropped on failure.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(self, item)))]
    pub fn insert(&mut self, index: Index, item: T) -> Result<()> {
        self.reserve(index)?.fill(item);
        Ok(())
    }

    /// Store `item` in a slot previously claimed with [`reserve`](Self::reserve).
    ///
    /// # Errors
    ///
    /// - [`TreeError::NotFound`] if `index` is not reserved.
    /// - [`TreeError::AlreadyOccupied`] if `index` already holds an item.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "trace", skip(self, item)))]
    pub fn populate(&mut self, index: Index, item: T) -> Result<()> {
        let Some(slot) = self.leaf_slot_mut(index) else {
            return Err(TreeError::NotFound { index });
        };

        match *slot {
            Slot::Reserved => {
                *slot = Slot::Item(item);
                Ok(())
            }

            Slot::Item(_) => Err(TreeError::AlreadyOccupied { index }),

            Slot::Empty | Slot::Child(_) => Err(TreeError::NotFound { index }),
        }
    }

    // ========================================================================
    //  Planning
    // ========================================================================

    /// Height the tree must have to address `index`.
    fn target_height(&self, index: Index) -> Result<u32> {
        let required: u32 = required_height(index, Self::SHIFT);
        if required > self.max_height {
            return Err(TreeError::IndexOutOfRange {
                index,
                max: max_index(self.max_height, Self::SHIFT),
            });
        }

        Ok(required.max(self.height))
    }

    /// Nodes that must be created to reach the leaf slot of `index` once the
    /// tree has grown to `target`.
    fn nodes_needed(&self, index: Index, target: u32) -> usize {
        if target == 0 {
            return 0;
        }
        if self.top.is_empty() {
            return target as usize;
        }

        // Levels added above the current top. The old tree hangs off slot 0
        // of each; any other offset leaves the path into empty space.
        let needed: usize = (target - self.height) as usize;
        let mut level: u32 = target;
        while level > self.height {
            if slot_offset(index, (level - 1) * Self::SHIFT, Self::MASK) != 0 {
                return needed + (level - 1) as usize;
            }
            level -= 1;
        }

        // Walk the existing nodes until the path runs out.
        let Some(mut node) = self.top.child() else {
            return needed;
        };
        while level > 1 {
            let offset: usize = slot_offset(index, (level - 1) * Self::SHIFT, Self::MASK);
            match node.slots[offset].child() {
                Some(child) => node = child,
                None => return needed + (level - 1) as usize,
            }
            level -= 1;
        }

        needed
    }

    /// Draw `count` nodes, or none at all.
    fn draw_nodes(&mut self, count: usize) -> Result<NodeBatch<T, WIDTH>> {
        let mut batch: NodeBatch<T, WIDTH> = SmallVec::with_capacity(count);

        for _ in 0..count {
            match self.allocator.alloc_node(self.policy) {
                Ok(node) => batch.push(node),

                Err(err) => {
                    trace_log!(drawn = batch.len(), count, "rolling back node draw");
                    for node in batch.drain(..) {
                        self.allocator.free_node(node);
                    }
                    return Err(err);
                }
            }
        }

        Ok(batch)
    }

    // ========================================================================
    //  Commit (infallible)
    // ========================================================================

    /// Raise the height to `target`, linking one batch node per level when the
    /// tree holds anything.
    fn grow(&mut self, target: u32, batch: &mut NodeBatch<T, WIDTH>) {
        if target <= self.height {
            return;
        }

        if self.top.is_empty() {
            self.height = target;
        } else {
            while self.height < target {
                let mut node: Box<Node<T, WIDTH>> = take_node(batch);
                node.slots[0] = self.top.take();
                node.count = 1;
                self.top = Slot::Child(node);
                self.height += 1;
            }
        }

        debug_log!(height = self.height, max_index = self.max_index(), "tree height extended");
    }

    /// Descend to the leaf slot of `index`, creating missing nodes from
    /// `batch`, and mark the slot reserved.
    fn claim_slot<'a>(
        top: &'a mut Slot<T, WIDTH>,
        height: u32,
        index: Index,
        batch: &mut NodeBatch<T, WIDTH>,
    ) -> &'a mut Slot<T, WIDTH> {
        if height == 0 {
            *top = Slot::Reserved;
            return top;
        }

        if top.is_empty() {
            *top = Slot::Child(take_node(batch));
        }
        let Slot::Child(top_node) = top else {
            unreachable!("interior slot holds a leaf entry");
        };

        let mut node: &'a mut Node<T, WIDTH> = top_node;
        let mut shift: u32 = (height - 1) * Self::SHIFT;
        while shift > 0 {
            let offset: usize = slot_offset(index, shift, Self::MASK);
            if node.slots[offset].is_empty() {
                node.slots[offset] = Slot::Child(take_node(batch));
                node.count += 1;
            }

            node = match &mut node.slots[offset] {
                Slot::Child(child) => &mut **child,
                _ => unreachable!("interior slot holds a leaf entry"),
            };
            shift -= Self::SHIFT;
        }

        let offset: usize = slot_offset(index, 0, Self::MASK);
        debug_assert!(node.slots[offset].is_empty());
        node.count += 1;

        let slot: &'a mut Slot<T, WIDTH> = &mut node.slots[offset];
        *slot = Slot::Reserved;
        slot
    }
}

// ============================================================================
//  Tests
// ============================================================================

//! Point reads.
//!
//! Lookups never allocate. A reserved slot reads as absent through
//! [`RadixTree::lookup`]; [`RadixTree::lookup_slot`] tells the two apart.

use crate::Index;
use crate::alloc::NodeAllocator;
use crate::capacity::slot_offset;
use crate::node::{Node, Slot};

use super::RadixTree;

/// State of one index, as seen by [`RadixTree::lookup_slot`].
#[derive(Debug, PartialEq, Eq)]
pub enum SlotState<'a, T> {
    /// Nothing stored.
    Vacant,

    /// Claimed by `reserve`, not yet populated.
    Reserved,

    /// Holds an item.
    Occupied(&'a T),
}

impl<T, const WIDTH: usize, A> RadixTree<T, WIDTH, A>
where
    A: NodeAllocator<T, WIDTH>,
{
    /// Item stored at `index`. Reserved slots read as `None`.
    #[inline]
    #[must_use]
    pub fn lookup(&self, index: Index) -> Option<&T> {
        match self.leaf_slot(index)? {
            Slot::Item(item) => Some(item),
            _ => None,
        }
    }

    /// Mutable access to the item stored at `index`.
    #[inline]
    pub fn lookup_mut(&mut self, index: Index) -> Option<&mut T> {
        match self.leaf_slot_mut(index)? {
            Slot::Item(item) => Some(item),
            _ => None,
        }
    }

    /// Whether `index` holds an item or a reservation.
    #[inline]
    #[must_use]
    pub fn contains(&self, index: Index) -> bool {
        self.leaf_slot(index).is_some_and(|slot| !slot.is_empty())
    }

    /// Full state of `index`, distinguishing reservations from vacancies.
    #[must_use]
    pub fn lookup_slot(&self, index: Index) -> SlotState<'_, T> {
        match self.leaf_slot(index) {
            Some(Slot::Item(item)) => SlotState::Occupied(item),
            Some(Slot::Reserved) => SlotState::Reserved,
            _ => SlotState::Vacant,
        }
    }

    /// Leaf slot addressing `index`, if the path to it exists.
    pub(super) fn leaf_slot(&self, index: Index) -> Option<&Slot<T, WIDTH>> {
        if index > self.max_index() {
            return None;
        }
        if self.height == 0 {
            return Some(&self.top);
        }

        let mut node: &Node<T, WIDTH> = self.top.child()?;
        let mut shift: u32 = (self.height - 1) * Self::SHIFT;
        while shift > 0 {
            node = node.slots[slot_offset(index, shift, Self::MASK)].child()?;
            shift -= Self::SHIFT;
        }

        Some(&node.slots[slot_offset(index, 0, Self::MASK)])
    }

    /// Mutable twin of [`leaf_slot`](Self::leaf_slot).
    pub(super) fn leaf_slot_mut(&mut self, index: Index) -> Option<&mut Slot<T, WIDTH>> {
        if index > self.max_index() {
            return None;
        }
        if self.height == 0 {
            return Some(&mut self.top);
        }

        let mut node: &mut Node<T, WIDTH> = self.top.child_mut()?;
        let mut shift: u32 = (self.height - 1) * Self::SHIFT;
        while shift > 0 {
            node = node.slots[slot_offset(index, shift, Self::MASK)].child_mut()?;
            shift -= Self::SHIFT;
        }

        Some(&mut node.slots[slot_offset(index, 0, Self::MASK)])
    }
}

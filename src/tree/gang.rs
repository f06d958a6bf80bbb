//! Ordered range scan ("gang lookup") and iteration.
//!
//! A scan pass descends from the top, skipping empty sibling subtrees by
//! stepping the cursor a whole subtree span at a time, and collects items from
//! the first leaf it reaches. [`RadixTree::gang_lookup`] repeats passes until
//! it has enough items or the cursor leaves the addressable range.

use std::vec::IntoIter as VecIntoIter;

use crate::Index;
use crate::alloc::NodeAllocator;
use crate::capacity::slot_offset;
use crate::node::{Node, Slot};

use super::RadixTree;

// ============================================================================
//  GangLookup
// ============================================================================

/// Result of [`RadixTree::gang_lookup`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GangLookup<'a, T> {
    /// Items found, in strictly ascending index order.
    pub entries: Vec<(Index, &'a T)>,

    /// Index one past the last slot scanned, to resume from.
    /// `None` when the scan ran off the end of the index space.
    pub next_index: Option<Index>,
}

impl<'a, T> GangLookup<'a, T> {
    /// The items alone, in index order.
    pub fn items(&self) -> impl Iterator<Item = &'a T> {
        self.entries.iter().map(|&(_, item)| item)
    }

    /// Number of items found.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing was found.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
//  Scan
// ============================================================================

impl<T, const WIDTH: usize, A> RadixTree<T, WIDTH, A>
where
    A: NodeAllocator<T, WIDTH>,
{
    /// Up to `max_items` items at indices `>= first_index`, in ascending order.
    ///
    /// Reserved slots are skipped. Resume with
    /// [`next_index`](GangLookup::next_index) to continue where this call
    /// stopped.
    #[must_use]
    pub fn gang_lookup(&self, first_index: Index, max_items: usize) -> GangLookup<'_, T> {
        let max_index: Index = self.max_index();
        let mut entries: Vec<(Index, &T)> = Vec::with_capacity(max_items.min(WIDTH));
        let mut next_index: Option<Index> = Some(first_index);

        while entries.len() < max_items {
            let Some(cursor) = next_index else {
                break;
            };
            if cursor > max_index {
                break;
            }

            next_index = self.scan_pass(cursor, max_items, &mut entries);
        }

        GangLookup {
            entries,
            next_index,
        }
    }

    /// Iterate over `(index, item)` pairs in ascending index order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T, WIDTH, A> {
        Iter {
            tree: self,
            buffer: Vec::new().into_iter(),
            cursor: Some(0),
        }
    }

    /// One descent from the top starting at `index`. Returns the cursor after
    /// the last slot examined, or `None` if it wrapped past `Index::MAX`.
    fn scan_pass<'a>(
        &'a self,
        mut index: Index,
        max_items: usize,
        entries: &mut Vec<(Index, &'a T)>,
    ) -> Option<Index> {
        if self.height == 0 {
            if let Slot::Item(item) = &self.top {
                entries.push((0, item));
            }
            return index.checked_add(1);
        }

        let Some(mut node) = self.top.child() else {
            return self.max_index().checked_add(1);
        };
        let mut shift: u32 = (self.height - 1) * Self::SHIFT;

        loop {
            let start: usize = slot_offset(index, shift, Self::MASK);
            let Some(found) = node.next_occupied(start) else {
                // Nothing left under this node: move past its span.
                return Self::skip_subtrees(index, shift, WIDTH - start);
            };
            index = Self::skip_subtrees(index, shift, found - start)?;

            if shift == 0 {
                return Self::collect_leaf(node, found, index, max_items, entries);
            }

            node = match &node.slots[found] {
                Slot::Child(child) => &**child,
                _ => return index.checked_add(1),
            };
            shift -= Self::SHIFT;
        }
    }

    /// Advance `index` past `count` sibling subtrees of span `1 << shift`,
    /// aligning down to a span boundary first.
    #[inline]
    fn skip_subtrees(index: Index, shift: u32, count: usize) -> Option<Index> {
        if count == 0 {
            return Some(index);
        }

        let span: Index = 1 << shift;
        let aligned: Index = index & !(span - 1);
        (count as Index)
            .checked_mul(span)
            .and_then(|step| aligned.checked_add(step))
    }

    /// Collect items of `leaf` from slot `from` on, starting at `index`.
    fn collect_leaf<'a>(
        leaf: &'a Node<T, WIDTH>,
        from: usize,
        mut index: Index,
        max_items: usize,
        entries: &mut Vec<(Index, &'a T)>,
    ) -> Option<Index> {
        for slot in &leaf.slots[from..] {
            if let Slot::Item(item) = slot {
                entries.push((index, item));
            }
            index = index.checked_add(1)?;

            if entries.len() == max_items {
                break;
            }
        }

        Some(index)
    }
}

// ============================================================================
//  Iter
// ============================================================================

/// Ascending iterator over a tree, fetching one gang lookup at a time.
#[derive(Debug)]
pub struct Iter<'a, T, const WIDTH: usize, A>
where
    A: NodeAllocator<T, WIDTH>,
{
    tree: &'a RadixTree<T, WIDTH, A>,

    buffer: VecIntoIter<(Index, &'a T)>,

    /// Where the next batch starts; `None` once exhausted.
    cursor: Option<Index>,
}

impl<'a, T, const WIDTH: usize, A> Iterator for Iter<'a, T, WIDTH, A>
where
    A: NodeAllocator<T, WIDTH>,
{
    type Item = (Index, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(entry) = self.buffer.next() {
                return Some(entry);
            }

            let cursor: Index = self.cursor?;
            let batch: GangLookup<'a, T> = self.tree.gang_lookup(cursor, WIDTH);
            if batch.is_empty() {
                self.cursor = None;
                return None;
            }

            self.cursor = batch.next_index;
            self.buffer = batch.entries.into_iter();
        }
    }
}

impl<'a, T, const WIDTH: usize, A> IntoIterator for &'a RadixTree<T, WIDTH, A>
where
    A: NodeAllocator<T, WIDTH>,
{
    type Item = (Index, &'a T);
    type IntoIter = Iter<'a, T, WIDTH, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
//  Tests
// ============================================================================

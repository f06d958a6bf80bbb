//! Debug traversal of the structural invariants.

use crate::alloc::NodeAllocator;
use crate::error::{Result, TreeError};
use crate::node::{Node, Slot};

use super::RadixTree;

/// Shape of a tree, as measured by [`RadixTree::check_invariants`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    /// Reachable nodes, interior and leaf.
    pub nodes: usize,

    /// Reachable leaf nodes.
    pub leaves: usize,

    /// Populated slots.
    pub items: usize,

    /// Reserved, unpopulated slots.
    pub reserved: usize,
}

impl<T, const WIDTH: usize, A> RadixTree<T, WIDTH, A>
where
    A: NodeAllocator<T, WIDTH>,
{
    /// Walk every reachable node and verify:
    ///
    /// - each node's count equals its non-empty slots, and is never zero;
    /// - interior slots hold only children, leaf slots only items or
    ///   reservations;
    /// - the entries found add up to [`len`](Self::len).
    ///
    /// # Errors
    ///
    /// [`TreeError::Corrupted`] describing the first violation found.
    pub fn check_invariants(&self) -> Result<TreeStats> {
        let mut stats: TreeStats = TreeStats::default();

        if self.height > self.max_height {
            return Err(TreeError::Corrupted(format!(
                "height {} exceeds cap {}",
                self.height, self.max_height
            )));
        }

        let mut stack: Vec<(&Node<T, WIDTH>, u32)> = Vec::new();
        match (&self.top, self.height) {
            (Slot::Empty, _) => {}
            (Slot::Item(_), 0) => stats.items += 1,
            (Slot::Reserved, 0) => stats.reserved += 1,
            (Slot::Child(top), height) if height > 0 => stack.push((&**top, height)),
            (slot, height) => {
                return Err(TreeError::Corrupted(format!(
                    "top of a height {height} tree holds a {} slot",
                    slot.kind()
                )));
            }
        }

        while let Some((node, level)) = stack.pop() {
            stats.nodes += 1;
            if level == 1 {
                stats.leaves += 1;
            }

            let occupied: usize = node.occupied();
            if node.count != occupied {
                return Err(TreeError::Corrupted(format!(
                    "level {level} node counts {} entries but holds {occupied}",
                    node.count
                )));
            }
            if occupied == 0 {
                return Err(TreeError::Corrupted(format!(
                    "empty node still linked at level {level}"
                )));
            }

            for slot in &node.slots {
                match (slot, level) {
                    (Slot::Empty, _) => {}
                    (Slot::Item(_), 1) => stats.items += 1,
                    (Slot::Reserved, 1) => stats.reserved += 1,
                    (Slot::Child(child), level) if level > 1 => {
                        stack.push((&**child, level - 1));
                    }
                    (slot, level) => {
                        return Err(TreeError::Corrupted(format!(
                            "level {level} node holds a {} slot",
                            slot.kind()
                        )));
                    }
                }
            }
        }

        if stats.items + stats.reserved != self.len {
            return Err(TreeError::Corrupted(format!(
                "found {} entries, tree records {}",
                stats.items + stats.reserved,
                self.len
            )));
        }

        Ok(stats)
    }
}

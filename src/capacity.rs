//! Capacity math: how many indices a tree of a given height can address.
//!
//! A tree of height `h` over nodes of `2^shift` slots consumes `h * shift`
//! index bits. Height 0 is the degenerate tree whose root slot holds the single
//! item at index 0.

use crate::Index;

/// Bits in an [`Index`].
pub const WORD_BITS: u32 = Index::BITS;

/// Upper bound on tree height for any legal node width (`shift >= 1`).
///
/// Sizes the fixed delete path.
pub const MAX_PATH: usize = WORD_BITS as usize;

/// Largest index addressable by a tree of `height` levels.
///
/// Saturates to [`Index::MAX`] once `height * shift` covers the whole word,
/// which also keeps the shift below the word width.
#[inline]
#[must_use]
pub const fn max_index(height: u32, shift: u32) -> Index {
    let bits: u32 = height.saturating_mul(shift);
    if bits >= WORD_BITS {
        return Index::MAX;
    }

    (!0 >> (WORD_BITS - bits - 1)) >> 1
}

/// Smallest height whose [`max_index`] covers `index`.
#[inline]
#[must_use]
pub const fn required_height(index: Index, shift: u32) -> u32 {
    let mut height: u32 = 0;
    while index > max_index(height, shift) {
        height += 1;
    }
    height
}

/// Height at which the whole index space is addressable.
#[inline]
#[must_use]
pub const fn full_height(shift: u32) -> u32 {
    assert!(shift > 0, "shift must be at least 1");
    WORD_BITS.div_ceil(shift)
}

/// Slot offset of `index` within a node whose children span `1 << shift` indices.
#[inline(always)]
#[must_use]
pub(crate) const fn slot_offset(index: Index, shift: u32, mask: usize) -> usize {
    #[expect(clippy::cast_possible_truncation, reason = "masked to the node width")]
    let offset: usize = (index >> shift) as usize & mask;
    offset
}

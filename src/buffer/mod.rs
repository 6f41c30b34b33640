//! Slot storage for the sequence buffer
//!
//! This module holds the pieces the ring store is built from:
//!
//! - The validity marker encoding, where a slot records the full sequence
//!   number currently resident in it or the [`EMPTY`] sentinel
//! - A process-wide template of empty markers used for bulk invalidation
//! - Slot indexing that maps a 16-bit sequence number onto a power-of-two ring
//!
//! Markers are 32 bits wide so that the sentinel can never collide with a real
//! 16-bit sequence number. Clearing a run of markers is a single slice copy from
//! the prefix of the template, which is how both reset and range removal
//! invalidate slots without a per-slot branch.

pub mod ack;
pub mod sequence_buffer;

use once_cell::sync::Lazy;

/// Marker value of a slot that holds no sequence number.
pub const EMPTY: u32 = u32::MAX;

/// Largest supported capacity.
///
/// A quarter of the sequence space, so the retained window plus a forward jump
/// of one full capacity stays inside the half-cycle the wraparound comparison
/// can order.
pub const MAX_CAPACITY: usize = 1 << 14;

/// Number of markers in the empty template, one per distinct sequence number.
pub const TEMPLATE_LEN: usize = 1 << 16;

/// Template of `TEMPLATE_LEN` empty markers, filled once on first use.
static EMPTY_TEMPLATE: Lazy<Box<[u32]>> = Lazy::new(|| {
    let mut template = vec![0u32; TEMPLATE_LEN].into_boxed_slice();
    template[0] = EMPTY;

    // Double the filled prefix until the whole template is covered
    let mut filled = 1;
    while filled < TEMPLATE_LEN {
        let (head, tail) = template.split_at_mut(filled);
        let count = filled.min(tail.len());
        tail[..count].copy_from_slice(&head[..count]);
        filled += count;
    }

    template
});

/// Overwrite every marker in `markers` with [`EMPTY`].
///
/// # Panics
///
/// Panics if `markers` is longer than [`TEMPLATE_LEN`].
#[inline]
pub(crate) fn clear_markers(markers: &mut [u32]) {
    markers.copy_from_slice(&EMPTY_TEMPLATE[..markers.len()]);
}

/// Maps sequence numbers onto slots of a power-of-two ring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SlotIndex {
    /// Number of slots
    capacity: usize,
    /// Mask for quickly wrapping sequence numbers to capacity
    mask: usize,
}

impl SlotIndex {
    /// Create an index over `capacity` slots
    ///
    /// The caller validates `capacity` beforehand.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity.is_power_of_two() && capacity <= MAX_CAPACITY);
        Self {
            capacity,
            mask: capacity - 1,
        }
    }

    /// Number of slots in the ring
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Physical slot for `seq`
    #[inline]
    pub fn slot(&self, seq: u16) -> usize {
        seq as usize & self.mask
    }

    /// Capacity as a sequence distance
    #[inline]
    pub fn window(&self) -> u16 {
        self.capacity as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_template_is_fully_empty() {
        assert_eq!(EMPTY_TEMPLATE.len(), TEMPLATE_LEN);
        assert!(EMPTY_TEMPLATE.iter().all(|marker| *marker == EMPTY));
    }

    #[test]
    fn test_clear_whole_ring() {
        let mut markers: Vec<u32> = (0..TEMPLATE_LEN as u32).collect();
        clear_markers(&mut markers);
        assert!(markers.iter().all(|marker| *marker == EMPTY));
    }

    #[test]
    fn test_slot_index_wraps() {
        let index = SlotIndex::new(16);
        assert_eq!(index.slot(0), 0);
        assert_eq!(index.slot(17), 1);
        assert_eq!(index.slot(u16::MAX), 15);
        assert_eq!(index.window(), 16);

        let full = SlotIndex::new(MAX_CAPACITY);
        assert_eq!(full.slot(u16::MAX), MAX_CAPACITY - 1);
        assert_eq!(full.window(), 16384);
    }

    proptest! {
        #[test]
        fn clear_only_touches_the_given_prefix(
            markers in proptest::collection::vec(0u32..u16::MAX as u32, 1..2048),
            split in any::<prop::sample::Index>(),
        ) {
            let mut markers = markers;
            let count = split.index(markers.len() + 1);
            let untouched = markers[count..].to_vec();

            clear_markers(&mut markers[..count]);

            prop_assert!(markers[..count].iter().all(|marker| *marker == EMPTY));
            prop_assert_eq!(&markers[count..], &untouched[..]);
        }
    }
}

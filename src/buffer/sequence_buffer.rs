//! Fixed-capacity ring store keyed by 16-bit sequence numbers
//!
//! The store keeps two parallel arrays: validity markers and payloads. A
//! sequence number `seq` always lives in slot `seq mod capacity`, and the
//! slot's marker records which sequence number currently owns it. Lookups
//! therefore never scan; they index and compare.
//!
//! Three cursors describe the live window:
//!
//! - `next`: one past the highest sequence number ever accepted
//! - `latest`: `next - 1`
//! - `oldest`: the end of the unbroken run of present sequence numbers,
//!   scanned forward from its previous position
//!
//! Inserts are rejected when they are *outdated* (behind `next - capacity`, so
//! their slot has been recycled) or *invalid* (further than one capacity ahead
//! of `oldest`, so accepting them would erase the evidence of an
//! unfilled gap). The forward bound holds from the first accepted insert
//! until the next reset, even when `oldest` itself has since been removed.
//! Jumping ahead invalidates every slot between the old `next`
//! and the new sequence number so stale occupants are never mistaken for
//! fresh ones.
//!
//! The store is not synchronized. Callers sharing a buffer across threads
//! wrap it in their own lock.

use crate::buffer::{clear_markers, SlotIndex, EMPTY};
use crate::config::{self, BufferConfig};
use crate::sequence;
use std::fmt;
use tracing::{debug, trace};

/// Hook receiving the sequence number and payload of each evicted slot
pub type EvictHook<T> = Box<dyn FnMut(u16, T) + Send>;

/// Ring buffer of payloads indexed by wrapping 16-bit sequence numbers
pub struct SequenceBuffer<T> {
    /// Maps sequence numbers to slots
    index: SlotIndex,
    /// Sequence number resident in each slot, or `EMPTY`
    markers: Box<[u32]>,
    /// Payloads; `Some` exactly where the marker is not `EMPTY`
    entries: Box<[Option<T>]>,
    /// One past the highest accepted sequence number
    next: u16,
    /// End of the consecutive run of present sequence numbers
    oldest: u16,
    /// Value `next` starts at and returns to on reset
    initial: u16,
    /// Whether anything was accepted since construction or reset
    anchored: bool,
    /// Optional eviction notification
    on_evict: Option<EvictHook<T>>,
}

impl<T> SequenceBuffer<T> {
    /// Create a buffer with `capacity` slots, expecting sequence number 0 first
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not a power of two in `1..=16384`.
    ///
    /// Larger powers of two also divide 65536 but are refused: `outdated`
    /// compares against `next - capacity`, and with 32768 slots that distance
    /// is exactly half the sequence space, where wraparound ordering is
    /// undefined. Capping at a quarter of the space keeps both `outdated` and
    /// the `invalid` bound one capacity ahead of `oldest` unambiguous.
    pub fn new(capacity: usize) -> Self {
        Self::with_config(BufferConfig::with_capacity(capacity))
    }

    /// Create a buffer from a config
    ///
    /// # Panics
    ///
    /// Panics if the config fails [`BufferConfig::validate`].
    pub fn with_config(config: BufferConfig) -> Self {
        match Self::try_with_config(config) {
            Ok(buffer) => buffer,
            Err(e) => panic!("invalid sequence buffer config: {e}"),
        }
    }

    /// Create a buffer from a config, returning an error for an invalid capacity
    pub fn try_with_config(config: BufferConfig) -> config::Result<Self> {
        Self::from_parts(config, None)
    }

    pub(crate) fn from_parts(
        config: BufferConfig,
        on_evict: Option<EvictHook<T>>,
    ) -> config::Result<Self> {
        config.validate()?;

        let index = SlotIndex::new(config.capacity);
        let mut markers = vec![0u32; config.capacity].into_boxed_slice();
        clear_markers(&mut markers);

        let mut entries = Vec::with_capacity(config.capacity);
        entries.resize_with(config.capacity, || None);

        debug!(
            capacity = config.capacity,
            initial_sequence = config.initial_sequence,
            evict_hook = on_evict.is_some(),
            "sequence buffer created"
        );

        Ok(Self {
            index,
            markers,
            entries: entries.into_boxed_slice(),
            next: config.initial_sequence,
            oldest: sequence::prev(config.initial_sequence),
            initial: config.initial_sequence,
            anchored: false,
            on_evict,
        })
    }

    /// Number of slots
    #[inline]
    pub fn capacity(&self) -> usize {
        self.index.capacity()
    }

    /// One past the highest sequence number accepted so far
    #[inline]
    pub fn next(&self) -> u16 {
        self.next
    }

    /// Highest sequence number accepted so far
    #[inline]
    pub fn latest(&self) -> u16 {
        sequence::prev(self.next)
    }

    /// End of the unbroken run of present sequence numbers
    #[inline]
    pub fn oldest(&self) -> u16 {
        self.oldest
    }

    /// Payload physically stored in `seq`'s slot, whoever owns it
    ///
    /// This does not check that the slot belongs to `seq`; the payload may be
    /// that of another sequence number mapping to the same slot. Use
    /// [`find`](Self::find) or [`exists`](Self::exists) to verify ownership.
    #[inline]
    pub fn at(&self, seq: u16) -> Option<&T> {
        self.entries[self.index.slot(seq)].as_ref()
    }

    /// Payload stored for exactly `seq`
    #[inline]
    pub fn find(&self, seq: u16) -> Option<&T> {
        let slot = self.index.slot(seq);
        if self.markers[slot] == seq as u32 {
            self.entries[slot].as_ref()
        } else {
            None
        }
    }

    /// Mutable payload stored for exactly `seq`
    #[inline]
    pub fn find_mut(&mut self, seq: u16) -> Option<&mut T> {
        let slot = self.index.slot(seq);
        if self.markers[slot] == seq as u32 {
            self.entries[slot].as_mut()
        } else {
            None
        }
    }

    /// Whether `seq` is stored in the buffer
    #[inline]
    pub fn exists(&self, seq: u16) -> bool {
        self.markers[self.index.slot(seq)] == seq as u32
    }

    /// Whether `seq` is behind `next - capacity`, so its slot has been recycled
    #[inline]
    pub fn outdated(&self, seq: u16) -> bool {
        sequence::lt(seq, self.next.wrapping_sub(self.index.window()))
    }

    /// Whether `seq` is too far ahead of the unbroken run to be accepted
    ///
    /// A buffer that has accepted nothing since construction or reset accepts
    /// any sequence number that is not outdated. After that the bound is
    /// `oldest + capacity`, whether or not `oldest` is still present.
    #[inline]
    pub fn invalid(&self, seq: u16) -> bool {
        self.anchored
            && sequence::gt(seq, self.oldest.wrapping_add(self.index.window()))
    }

    /// Store `item` under `seq`
    ///
    /// Returns `false` without touching the buffer if `seq` is
    /// [outdated](Self::outdated) or [invalid](Self::invalid). Moving past
    /// `next` first invalidates every slot from the old `next` up to `seq`.
    /// Any payload previously held in `seq`'s slot is replaced.
    pub fn insert(&mut self, seq: u16, item: T) -> bool {
        if self.outdated(seq) {
            trace!(seq, next = self.next, "rejecting outdated sequence");
            return false;
        }

        if self.invalid(seq) {
            trace!(seq, oldest = self.oldest, "rejecting sequence too far ahead of oldest");
            return false;
        }

        let following = sequence::next(seq);
        if sequence::gt(following, self.next) {
            if following != sequence::next(self.next) {
                trace!(from = self.next, to = seq, "invalidating skipped sequences");
            }
            self.clear_range(self.next, seq);
            self.next = following;
        }

        let slot = self.index.slot(seq);
        self.evict_slot(slot);
        self.markers[slot] = seq as u32;
        self.entries[slot] = Some(item);
        self.anchored = true;

        self.update_oldest();
        true
    }

    /// Clear the slot `seq` maps to, whichever sequence number occupies it
    pub fn remove(&mut self, seq: u16) {
        let slot = self.index.slot(seq);
        self.evict_slot(slot);
        self.update_oldest();
    }

    /// Clear every slot for sequence numbers in `[start, end]`
    ///
    /// A range at least as long as the buffer clears the whole buffer.
    pub fn remove_range(&mut self, start: u16, end: u16) {
        self.clear_range(start, end);
        self.update_oldest();
    }

    /// Return the buffer to its freshly constructed state
    ///
    /// Payloads are dropped without calling the eviction hook.
    pub fn reset(&mut self) {
        clear_markers(&mut self.markers);
        self.entries.iter_mut().for_each(|entry| *entry = None);
        self.next = self.initial;
        self.oldest = sequence::prev(self.initial);
        self.anchored = false;

        debug!(capacity = self.capacity(), next = self.next, "sequence buffer reset");
    }

    /// Invalidate slots for `[start, end]` without touching the cursors
    fn clear_range(&mut self, start: u16, end: u16) {
        // Span is 1..=65536; a u16 count would wrap for the full cycle
        let count = sequence::distance(start, end) as usize + 1;
        let capacity = self.capacity();

        if count >= capacity {
            trace!(start, end, "clearing entire sequence buffer");
            self.clear_slots(0, capacity);
            return;
        }

        let first = self.index.slot(start);
        let first_len = capacity - first;

        if count <= first_len {
            self.clear_slots(first, first + count);
        } else {
            // Range wraps past the end of the ring
            self.clear_slots(first, capacity);
            self.clear_slots(0, count - first_len);
        }
    }

    /// Empty the physical slots `[from, to)`
    fn clear_slots(&mut self, from: usize, to: usize) {
        match self.on_evict.as_mut() {
            Some(hook) => {
                // Marker goes EMPTY before the payload reaches the hook
                for (marker, entry) in self.markers[from..to]
                    .iter_mut()
                    .zip(self.entries[from..to].iter_mut())
                {
                    let owner = std::mem::replace(marker, EMPTY);
                    if let Some(item) = entry.take() {
                        if owner != EMPTY {
                            hook(owner as u16, item);
                        }
                    }
                }
            }
            None => {
                self.entries[from..to].iter_mut().for_each(|entry| *entry = None);
                clear_markers(&mut self.markers[from..to]);
            }
        }
    }

    /// Empty a single slot, handing a live payload to the hook
    fn evict_slot(&mut self, slot: usize) {
        let marker = std::mem::replace(&mut self.markers[slot], EMPTY);
        let entry = self.entries[slot].take();

        if let (Some(hook), Some(item)) = (self.on_evict.as_mut(), entry) {
            if marker != EMPTY {
                hook(marker as u16, item);
            }
        }
    }

    /// Advance `oldest` along the consecutive run, snapping to `latest` when
    /// `oldest` itself is no longer present
    fn update_oldest(&mut self) {
        let latest = self.latest();

        // The run can never be longer than the ring
        for _ in 0..self.capacity() {
            if self.oldest == latest || !self.exists(sequence::next(self.oldest)) {
                break;
            }
            self.oldest = sequence::next(self.oldest);
        }

        if !self.exists(self.oldest) {
            self.oldest = latest;
        }
    }
}

impl<T> fmt::Debug for SequenceBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceBuffer")
            .field("capacity", &self.capacity())
            .field("next", &self.next)
            .field("oldest", &self.oldest)
            .field("live", &self.markers.iter().filter(|m| **m != EMPTY).count())
            .field("evict_hook", &self.on_evict.is_some())
            .finish()
    }
}

//! Selective acknowledgment bitsets
//!
//! A receiver piggybacks an [`Ack`] on outgoing packets: the newest sequence
//! number it is acknowledging plus a 32-bit mask where bit `i` reports whether
//! `ack - i` has been received. Six bytes cover the 32 sequence numbers up to
//! and including `ack`.
//!
//! Encoding only reads the buffer's presence markers; it never mutates.

use crate::buffer::sequence_buffer::SequenceBuffer;
use crate::sequence;

/// Number of sequence numbers an [`Ack`] covers
pub const ACK_BITS: u16 = u32::BITS as u16;

/// Acknowledgment header: a reference sequence number and a presence mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ack {
    /// Reference sequence number, bit 0 of `bits`
    pub ack: u16,
    /// Bit `i` is set iff `ack - i` is acknowledged
    pub bits: u32,
}

impl Ack {
    /// Create an ack from its parts
    pub fn new(ack: u16, bits: u32) -> Self {
        Self { ack, bits }
    }

    /// Whether `seq` is acknowledged by this header
    ///
    /// Sequence numbers more than 31 behind `ack`, or ahead of it, are never
    /// acknowledged.
    pub fn contains(&self, seq: u16) -> bool {
        let offset = sequence::distance(seq, self.ack);
        offset < ACK_BITS && self.bits & (1u32 << offset) != 0
    }

    /// Acknowledged sequence numbers, newest first
    pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
        (0..ACK_BITS)
            .filter(move |offset| self.bits & (1u32 << offset) != 0)
            .map(move |offset| self.ack.wrapping_sub(offset))
    }

    /// Number of acknowledged sequence numbers
    pub fn count(&self) -> u32 {
        self.bits.count_ones()
    }
}

impl<T> SequenceBuffer<T> {
    /// Presence mask of the 32 sequence numbers ending at `ack`
    pub fn generate_bitset32(&self, ack: u16) -> Ack {
        let mut bits = 0u32;

        for offset in 0..ACK_BITS {
            if self.exists(ack.wrapping_sub(offset)) {
                bits |= 1u32 << offset;
            }
        }

        Ack { ack, bits }
    }

    /// Presence mask ending at [`latest`](Self::latest)
    pub fn latest_bitset32(&self) -> Ack {
        self.generate_bitset32(self.latest())
    }

    /// Presence mask ending at [`oldest`](Self::oldest)
    pub fn oldest_bitset32(&self) -> Ack {
        self.generate_bitset32(self.oldest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alternating_bitset() {
        let mut buffer = SequenceBuffer::new(32);

        for seq in (0..32u16).step_by(2) {
            buffer.insert(seq, true);
        }

        let header = buffer.latest_bitset32();
        assert_eq!(header.ack, 30);

        // Bit i tracks 30 - i: set for even offsets only
        let mut bits = header.bits;
        for offset in 0..32 {
            assert_eq!(bits & 1 != 0, offset % 2 == 0, "offset {offset}");
            bits >>= 1;
        }

        let next = buffer.next();
        buffer.insert(next, true);
        assert_eq!(buffer.latest_bitset32().ack, 31);
    }

    #[test]
    fn test_oldest_bitset_uses_oldest() {
        let mut buffer = SequenceBuffer::new(64);

        for seq in [10u16, 11, 12, 20] {
            buffer.insert(seq, ());
        }

        let header = buffer.oldest_bitset32();
        assert_eq!(header.ack, 12);
        assert_eq!(header.bits, 0b111);
    }

    #[test]
    fn test_bitset_across_wraparound() {
        let mut buffer = SequenceBuffer::with_config(crate::BufferConfig {
            capacity: 32,
            initial_sequence: 65534,
        });

        for seq in [65534u16, 65535, 0, 1] {
            buffer.insert(seq, ());
        }

        let header = buffer.latest_bitset32();
        assert_eq!(header.ack, 1);
        assert_eq!(header.bits, 0b1111);
        assert!(header.contains(65534));
        assert!(!header.contains(2));
    }

    #[test]
    fn test_empty_buffer_bitset() {
        let buffer = SequenceBuffer::<u8>::new(16);
        let header = buffer.latest_bitset32();

        assert_eq!(header.ack, u16::MAX);
        assert_eq!(header.bits, 0);
        assert_eq!(header.count(), 0);
    }

    #[test]
    fn test_ack_contains_and_iter() {
        let header = Ack::new(5, 0b1000_0000_0000_0000_0000_0000_0000_0101);

        assert!(header.contains(5));
        assert!(!header.contains(4));
        assert!(header.contains(3));
        assert!(header.contains(5u16.wrapping_sub(31)));
        assert!(!header.contains(5u16.wrapping_sub(32)));
        assert!(!header.contains(6));

        let acked: Vec<u16> = header.iter().collect();
        assert_eq!(acked, vec![5, 3, 65510]);
        assert_eq!(header.count(), 3);
    }
}

//! Tests for acknowledgment bitset generation and decoding

use seq_ring_buffer::{Ack, BufferConfig, SequenceBuffer, ACK_BITS};

/// Every second sequence number present produces an alternating mask
#[test]
fn test_even_sequences_bitset() {
    let mut buffer = SequenceBuffer::new(32);

    for seq in (0..32u16).step_by(2) {
        assert!(buffer.insert(seq, true));
    }

    let header = buffer.latest_bitset32();
    assert_eq!(header.ack, 30);
    assert_eq!(header.bits & 0xFFFF, 0x5555);
    assert_eq!(header.count(), 16);

    // The acknowledged set is exactly the evens, newest first
    let acked: Vec<u16> = header.iter().collect();
    let expected: Vec<u16> = (0..=30u16).rev().step_by(2).collect();
    assert_eq!(acked, expected);
}

/// A header generated by the receiver tells the sender what arrived
#[test]
fn test_sender_receiver_exchange() {
    let start = 65520u16;
    let config = BufferConfig {
        capacity: 64,
        initial_sequence: start,
    };

    let mut sent = SequenceBuffer::with_config(config);
    let mut received = SequenceBuffer::with_config(config);

    // Sender transmits 41 packets, the link drops every fifth one but the last
    for i in 0..41u16 {
        let seq = start.wrapping_add(i);
        assert!(sent.insert(seq, i));
        if i % 5 != 4 {
            assert!(received.insert(seq, i));
        }
    }

    let header = received.latest_bitset32();
    assert_eq!(header.ack, start.wrapping_add(40));
    assert!(!header.contains(start.wrapping_add(39)));

    // Sender checks its last 32 packets against the header
    for offset in 0..ACK_BITS {
        let seq = header.ack.wrapping_sub(offset);
        let i = seq.wrapping_sub(start);
        assert!(sent.exists(seq));
        assert_eq!(header.contains(seq), i % 5 != 4, "packet {i}");
    }
}

/// The oldest-based header acknowledges the in-order run
#[test]
fn test_oldest_bitset_covers_run() {
    let mut buffer = SequenceBuffer::new(64);

    for seq in 0..20u16 {
        buffer.insert(seq, ());
    }
    // Gap at 20, later arrivals beyond it
    buffer.insert(22, ());
    buffer.insert(23, ());

    let oldest = buffer.oldest_bitset32();
    assert_eq!(oldest.ack, 19);
    assert_eq!(oldest.bits, (1 << 20) - 1);

    let latest = buffer.latest_bitset32();
    assert_eq!(latest.ack, 23);
    assert!(!latest.contains(20));
    assert!(!latest.contains(21));
    assert!(latest.contains(22));
}

/// Generating a bitset never changes the buffer
#[test]
fn test_bitset_is_read_only() {
    let mut buffer = SequenceBuffer::new(16);
    for seq in [3u16, 4, 7] {
        buffer.insert(seq, seq);
    }

    let before = (buffer.next(), buffer.oldest());
    let first = buffer.generate_bitset32(7);
    let second = buffer.generate_bitset32(7);

    assert_eq!(first, second);
    assert_eq!(first, Ack::new(7, 0b1_1001));
    assert_eq!((buffer.next(), buffer.oldest()), before);
}

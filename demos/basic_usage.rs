//! Basic usage example for the sequence ring buffer
//!
//! This example demonstrates:
//! 1. Building a sender-side buffer with an eviction hook
//! 2. Receiving over a lossy link into a receiver-side buffer
//! 3. Piggybacking the receiver's ack bitset back to the sender
//! 4. Marking acknowledged packets on the sender and counting losses as
//!    unacknowledged packets are recycled out of the window
//!
//! The link is simulated in-process and drops every seventh packet. Run with
//! `RUST_LOG=trace` to see the buffer's own logging.

use seq_ring_buffer::{sequence, Ack, BufferBuilder, BufferConfig, SequenceBuffer, ACK_BITS};

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// Packets the simulated link loses
const DROP_EVERY: u16 = 7;
const PACKETS: u16 = 200;

/// What the sender remembers about each packet in flight
struct SentPacket {
    /// Tick at which the packet went out
    sent_at: u64,
    /// Application payload
    payload: Vec<u8>,
    /// Whether the receiver has acknowledged it
    acked: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Packets recycled out of the sender window before being acked are lost
    let lost = Arc::new(AtomicUsize::new(0));
    let lost_counter = lost.clone();

    // Start near the rollover to exercise wraparound
    let start = 65500u16;

    let mut sent: SequenceBuffer<SentPacket> = BufferBuilder::new()
        .capacity(64)
        .initial_sequence(start)
        .on_evict(move |seq, packet: SentPacket| {
            if !packet.acked {
                warn!(seq, sent_at = packet.sent_at, "packet never acknowledged");
                lost_counter.fetch_add(1, Ordering::Relaxed);
            }
        })
        .build();

    let mut received: SequenceBuffer<Vec<u8>> = SequenceBuffer::with_config(BufferConfig {
        capacity: 64,
        initial_sequence: start,
    });

    let mut acked = 0usize;

    for tick in 0..PACKETS {
        let seq = start.wrapping_add(tick);
        let payload = format!("message {tick}").into_bytes();

        // Remember the packet until it is acknowledged
        sent.insert(
            seq,
            SentPacket {
                sent_at: tick as u64,
                payload: payload.clone(),
                acked: false,
            },
        );

        // Deliver it unless the link drops it
        if tick % DROP_EVERY != 0 {
            received.insert(seq, payload);
        }

        // The receiver answers with its latest ack header
        let header = received.latest_bitset32();
        acked += mark_acked(&mut sent, header);

        // Give up on a gap once it can no longer be acknowledged; removing
        // oldest moves it up to latest so new packets stay acceptable
        if sequence::distance(received.oldest(), received.latest()) >= ACK_BITS {
            received.remove(received.oldest());
        }
    }

    info!(
        acked,
        lost = lost.load(Ordering::Relaxed),
        unacked = count_unacked(&sent),
        "transfer finished"
    );

    println!("Sent {PACKETS} packets starting at sequence {start}");
    println!("  - Acknowledged: {acked}");
    println!("  - Lost: {}", lost.load(Ordering::Relaxed));
    println!("  - Awaiting ack: {}", count_unacked(&sent));

    let header = received.latest_bitset32();
    println!("Final ack header: ack={} bits={:032b}", header.ack, header.bits);
}

/// Mark every packet the ack header covers, returning how many were newly acked
fn mark_acked(sent: &mut SequenceBuffer<SentPacket>, header: Ack) -> usize {
    let mut newly_acked = 0;

    for seq in header.iter() {
        if let Some(packet) = sent.find_mut(seq) {
            if !packet.acked {
                packet.acked = true;
                packet.payload.clear();
                newly_acked += 1;
            }
        }
    }

    newly_acked
}

fn count_unacked(sent: &SequenceBuffer<SentPacket>) -> usize {
    let latest = sent.latest();
    (0..sent.capacity() as u16)
        .filter_map(|offset| sent.find(latest.wrapping_sub(offset)))
        .filter(|packet| !packet.acked)
        .count()
}

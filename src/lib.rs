//! Sequence Ring Buffer - a fixed-capacity buffer keyed by wrapping 16-bit
//! sequence numbers, for reliable transports built on unreliable datagrams.
//!
//! # Overview
//!
//! A transport numbers each packet with a 16-bit counter that rolls over every
//! 65536 packets. Both ends need to remember what they recently sent or
//! received, notice gaps, and tell each other compactly what arrived. This
//! crate provides the pieces for that:
//!
//! 1. Wraparound-aware comparison of sequence numbers ([`sequence`])
//! 2. A ring store that keeps one slot per `seq mod capacity`, recycles slots
//!    as the window moves, and tracks the unbroken run of received sequence
//!    numbers ([`SequenceBuffer`])
//! 3. A 32-bit selective acknowledgment bitset derived from the store ([`Ack`])
//!
//! # Key Features
//!
//! - Correct ordering across the 65535 to 0 rollover
//! - O(1) insert, lookup and remove; bulk invalidation through a shared
//!   template of empty markers
//! - Rejection of outdated sequence numbers and of ones too far ahead of an
//!   unfilled gap
//! - Optional eviction hook receiving payloads as they leave the buffer
//!
//! # Usage
//!
//! ```
//! use seq_ring_buffer::SequenceBuffer;
//!
//! let mut received = SequenceBuffer::new(64);
//!
//! for seq in [0u16, 1, 2, 4] {
//!     received.insert(seq, ());
//! }
//!
//! let header = received.latest_bitset32();
//! assert_eq!(header.ack, 4);
//! assert!(!header.contains(3));
//! assert_eq!(received.oldest(), 2);
//! ```
//!
//! The buffer does no locking of its own. Share it between threads behind a
//! mutex, or keep one buffer per connection on a single task.
//!
//! See `demos/basic_usage.rs` for a sender/receiver walkthrough.

#![deny(missing_docs)]

mod buffer;
mod config;
pub mod sequence;

pub use buffer::ack::{Ack, ACK_BITS};
pub use buffer::sequence_buffer::{EvictHook, SequenceBuffer};
pub use config::{BufferBuilder, BufferConfig, ConfigError};

/// Re-exported constants describing slot storage
pub mod types {
    pub use crate::buffer::{EMPTY, MAX_CAPACITY, TEMPLATE_LEN};
}

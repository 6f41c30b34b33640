//! Construction-time configuration for sequence buffers
//!
//! A buffer's capacity is fixed when it is built. It must evenly divide the
//! 16-bit sequence space, i.e. be a power of two, so every sequence number maps
//! onto the same slot no matter how many times the counter has wrapped. It is
//! also capped at a quarter of the sequence space so that the window and a
//! full-capacity jump ahead of it can always be ordered by the wraparound
//! comparison.

use crate::buffer::sequence_buffer::{EvictHook, SequenceBuffer};
use crate::buffer::MAX_CAPACITY;
use thiserror::Error;

/// Reasons a buffer configuration is rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Capacity of zero slots
    #[error("sequence buffer capacity must be non-zero")]
    ZeroCapacity,
    /// Capacity that does not divide the sequence space
    #[error("sequence buffer capacity {0} must be a power of two")]
    NotPowerOfTwo(usize),
    /// Capacity wider than a quarter of the sequence space
    #[error("sequence buffer capacity {0} exceeds the maximum of 16384")]
    TooLarge(usize),
}

/// Result type for configuration checks
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration of a sequence buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BufferConfig {
    /// Number of slots, a power of two in `1..=16384`
    ///
    /// 32768 would divide the sequence space too, but sits exactly at the
    /// half-cycle where wraparound ordering is undefined.
    pub capacity: usize,
    /// Sequence number the buffer expects first; `next` starts here and
    /// returns here on reset
    pub initial_sequence: u16,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            capacity: 256,
            initial_sequence: 0,
        }
    }
}

impl BufferConfig {
    /// Config with the given capacity and an initial sequence of 0
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Check that the capacity is a power of two no wider than a quarter of
    /// the sequence space
    pub fn validate(&self) -> Result<()> {
        match self.capacity {
            0 => Err(ConfigError::ZeroCapacity),
            c if c > MAX_CAPACITY => Err(ConfigError::TooLarge(c)),
            c if !c.is_power_of_two() => Err(ConfigError::NotPowerOfTwo(c)),
            _ => Ok(()),
        }
    }
}

/// Builder for a [`SequenceBuffer`] with an optional eviction hook
///
/// ```
/// use seq_ring_buffer::BufferBuilder;
///
/// let mut evicted = Vec::new();
/// let mut buffer = BufferBuilder::new()
///     .capacity(32)
///     .initial_sequence(1000)
///     .on_evict(move |seq, _payload: &'static str| evicted.push(seq))
///     .build();
///
/// assert!(buffer.insert(1000, "hello"));
/// assert_eq!(buffer.find(1000), Some(&"hello"));
/// ```
pub struct BufferBuilder<T> {
    config: BufferConfig,
    on_evict: Option<EvictHook<T>>,
}

impl<T> Default for BufferBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> BufferBuilder<T> {
    /// Start from [`BufferConfig::default`]
    pub fn new() -> Self {
        Self::from_config(BufferConfig::default())
    }

    /// Start from an existing config
    pub fn from_config(config: BufferConfig) -> Self {
        Self {
            config,
            on_evict: None,
        }
    }

    /// Set the number of slots
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// Set the first expected sequence number
    pub fn initial_sequence(mut self, seq: u16) -> Self {
        self.config.initial_sequence = seq;
        self
    }

    /// Install a hook called with each payload that leaves the buffer
    ///
    /// The hook runs synchronously inside `insert`, `remove` and
    /// `remove_range` whenever a live slot is overwritten or cleared, and
    /// receives the occupant's sequence number together with the owned
    /// payload. `reset` and dropping the buffer discard payloads without
    /// calling it.
    pub fn on_evict<F>(mut self, hook: F) -> Self
    where
        F: FnMut(u16, T) + Send + 'static,
    {
        self.on_evict = Some(Box::new(hook));
        self
    }

    /// Build the buffer, returning the config error if the capacity is invalid
    pub fn try_build(self) -> Result<SequenceBuffer<T>> {
        SequenceBuffer::from_parts(self.config, self.on_evict)
    }

    /// Build the buffer
    ///
    /// # Panics
    ///
    /// Panics if the capacity is invalid; see [`BufferConfig::validate`].
    pub fn build(self) -> SequenceBuffer<T> {
        match self.try_build() {
            Ok(buffer) => buffer,
            Err(e) => panic!("invalid sequence buffer config: {e}"),
        }
    }
}

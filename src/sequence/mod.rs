//! Wraparound-aware comparison over 16-bit sequence numbers
//!
//! Sequence numbers live on a cycle of 65536 values, so plain integer ordering
//! breaks down the moment a counter rolls over from 65535 to 0. This module
//! defines ordering by distance instead: `a` is greater than `b` when walking
//! forward from `b` reaches `a` in at most half the cycle.
//!
//! The ordering is only meaningful while the true distance between the two
//! values stays within half the cycle. Comparisons outside that window still
//! return a boolean, but its meaning is unspecified.
//!
//! All arithmetic on sequence numbers wraps; nothing here can overflow.

/// Half the number of distinct 16-bit sequence numbers (32768).
pub const HALF_RANGE: u16 = (u16::MAX / 2) + 1;

/// Returns whether `a` is greater than `b` on the sequence cycle.
///
/// True iff `a > b` with `a - b <= 32768`, or `a < b` with `b - a > 32768`.
#[inline]
pub const fn gt(a: u16, b: u16) -> bool {
    (a > b && a - b <= HALF_RANGE) || (a < b && b - a > HALF_RANGE)
}

/// Returns whether `a` is less than `b` on the sequence cycle. See [`gt`].
#[inline]
pub const fn lt(a: u16, b: u16) -> bool {
    gt(b, a)
}

/// Returns whether `a` is greater than or equal to `b`. See [`gt`].
#[inline]
pub const fn gte(a: u16, b: u16) -> bool {
    a == b || gt(a, b)
}

/// Returns whether `a` is less than or equal to `b`. See [`gt`].
#[inline]
pub const fn lte(a: u16, b: u16) -> bool {
    a == b || lt(a, b)
}

/// The sequence number following `seq`, wrapping 65535 to 0.
#[inline]
pub const fn next(seq: u16) -> u16 {
    seq.wrapping_add(1)
}

/// The sequence number preceding `seq`, wrapping 0 to 65535.
#[inline]
pub const fn prev(seq: u16) -> u16 {
    seq.wrapping_sub(1)
}

/// Number of forward steps needed to go from `from` to `to`.
///
/// Always in `0..=65535`; `distance(a, a) == 0` and
/// `distance(65535, 0) == 1`.
#[inline]
pub const fn distance(from: u16, to: u16) -> u16 {
    to.wrapping_sub(from)
}

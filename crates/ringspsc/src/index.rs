//! Cursor integer widths.
//!
//! `head` and `tail` are unbounded logical indices: they only ever grow and are
//! allowed to wrap around the integer's native width. Occupancy is always
//! computed as `head.wrapping_sub(tail)`, which stays unambiguous as long as the
//! capacity fits in half the index range (see [`Index::MAX`]).
//!
//! Narrow indices (`u8`, `u16`) are useful on small targets where the cursor
//! has to be updated with a single native store.

use std::fmt;
use std::sync::atomic::Ordering;

mod sealed {
    pub trait Sealed {}
}

/// An unsigned integer usable as a ring cursor.
///
/// Implemented for `u8`, `u16`, `u32`, `usize`, and `u64` on 64-bit targets.
/// The trait is sealed: the wraparound arithmetic is only sound for unsigned
/// types no wider than `usize` that have a native atomic counterpart.
pub trait Index: sealed::Sealed + Copy + Eq + fmt::Debug + fmt::Display + Send + Sync + 'static {
    /// The atomic type holding a cursor of this width.
    type Atomic: Send + Sync;

    /// Largest representable value.
    const MAX: u128;

    /// A fresh zeroed atomic. Each use of the constant yields a new value.
    #[allow(clippy::declare_interior_mutable_const)]
    const ATOMIC_ZERO: Self::Atomic;

    /// Atomic load of a cursor with the given ordering.
    fn load(atomic: &Self::Atomic, order: Ordering) -> Self;

    /// Atomic store of a cursor with the given ordering.
    fn store(atomic: &Self::Atomic, value: Self, order: Ordering);

    /// Advance by `n` elements, wrapping at the native width.
    ///
    /// `n` never exceeds the capacity, which always fits in `Self`.
    fn advance(self, n: usize) -> Self;

    /// `self - older` with wraparound, widened to `usize`.
    fn distance(self, older: Self) -> usize;

    /// Physical slot for this logical index.
    fn slot(self, mask: usize) -> usize;
}

macro_rules! impl_index {
    ($($int:ty => $atomic:ty),* $(,)?) => {
        $(
            impl sealed::Sealed for $int {}

            impl Index for $int {
                type Atomic = $atomic;

                const MAX: u128 = <$int>::MAX as u128;
                #[allow(clippy::declare_interior_mutable_const)]
                const ATOMIC_ZERO: Self::Atomic = <$atomic>::new(0);

                #[inline]
                fn load(atomic: &Self::Atomic, order: Ordering) -> Self {
                    atomic.load(order)
                }

                #[inline]
                fn store(atomic: &Self::Atomic, value: Self, order: Ordering) {
                    atomic.store(value, order);
                }

                #[inline]
                fn advance(self, n: usize) -> Self {
                    self.wrapping_add(n as $int)
                }

                #[inline]
                fn distance(self, older: Self) -> usize {
                    self.wrapping_sub(older) as usize
                }

                #[inline]
                fn slot(self, mask: usize) -> usize {
                    (self as usize) & mask
                }
            }
        )*
    };
}

impl_index! {
    u8 => std::sync::atomic::AtomicU8,
    u16 => std::sync::atomic::AtomicU16,
    u32 => std::sync::atomic::AtomicU32,
    usize => std::sync::atomic::AtomicUsize,
}

// Cursors wider than `usize` would not be lock-free on the target.
#[cfg(target_pointer_width = "64")]
impl_index! {
    u64 => std::sync::atomic::AtomicU64,
}

/// Whether a ring of `capacity` slots can be addressed by cursors of type `I`.
///
/// The largest capacity for an n-bit index is `2^(n-1)`: beyond that,
/// `head - tail` can no longer tell a full ring from an empty one after the
/// cursors wrap.
pub(crate) const fn fits<I: Index>(capacity: usize) -> bool {
    capacity != 0 && (capacity as u128 - 1) <= (I::MAX >> 1)
}

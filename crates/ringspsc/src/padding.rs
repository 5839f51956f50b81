//! Cache-line padding for the cursors.
//!
//! The producer stores to `head` on every publish and the consumer stores to
//! `tail`. If both cursors share a cache line, every publish invalidates the
//! other core's copy of the line it is polling. Wrapping each cursor in
//! [`Padded`] rounds its size and alignment up to the chosen line size so the
//! two never share one, and the storage array starts on a fresh line as well.
//!
//! Padding is chosen at compile time through a [`CacheLine`] marker:
//!
//! | Marker       | Alignment |
//! |--------------|-----------|
//! | [`NoPadding`]| none (single-core targets, no false sharing possible) |
//! | [`Line32`]   | 32 bytes |
//! | [`Line64`]   | 64 bytes |
//! | [`Line128`]  | 128 bytes (adjacent-line prefetch on Intel/AMD, Apple M-series) |
//! | [`Line256`]  | 256 bytes (s390x) |
//! | [`NativeLine`] | the target's line size, never less than `crossbeam_utils::CachePadded` |

use std::ops::Deref;

mod sealed {
    pub trait Sealed {}
}

/// Marker type whose alignment is the padding applied around each cursor.
pub trait CacheLine: sealed::Sealed + Send + Sync + 'static {
    /// Padding in bytes; `0` disables padding.
    const SIZE: usize;
}

macro_rules! cache_line {
    ($(#[$doc:meta] $name:ident => $align:literal),* $(,)?) => {
        $(
            #[$doc]
            #[derive(Debug, Clone, Copy)]
            #[repr(align($align))]
            pub struct $name;

            impl sealed::Sealed for $name {}

            impl CacheLine for $name {
                const SIZE: usize = $align;
            }
        )*
    };
}

cache_line! {
    /// 32-byte cache lines (ARM, MIPS, SPARC).
    Line32 => 32,
    /// 64-byte cache lines (most targets).
    Line64 => 64,
    /// 128-byte padding, covering the adjacent-line prefetcher on x86-64.
    Line128 => 128,
    /// 256-byte cache lines (s390x).
    Line256 => 256,
}

/// No padding: cursors are packed next to each other.
#[derive(Debug, Clone, Copy)]
pub struct NoPadding;

impl sealed::Sealed for NoPadding {}

impl CacheLine for NoPadding {
    const SIZE: usize = 0;
}

/// The cache-line size of the compilation target.
#[cfg(any(
    target_arch = "x86_64",
    target_arch = "aarch64",
    target_arch = "arm64ec",
    target_arch = "powerpc64",
))]
pub type NativeLine = Line128;

/// The cache-line size of the compilation target.
#[cfg(any(
    target_arch = "arm",
    target_arch = "mips",
    target_arch = "mips32r6",
    target_arch = "mips64",
    target_arch = "mips64r6",
    target_arch = "sparc",
    target_arch = "hexagon",
    target_arch = "m68k",
))]
pub type NativeLine = Line32;

/// The cache-line size of the compilation target.
#[cfg(target_arch = "s390x")]
pub type NativeLine = Line256;

/// The cache-line size of the compilation target.
#[cfg(not(any(
    target_arch = "x86_64",
    target_arch = "aarch64",
    target_arch = "arm64ec",
    target_arch = "powerpc64",
    target_arch = "arm",
    target_arch = "mips",
    target_arch = "mips32r6",
    target_arch = "mips64",
    target_arch = "mips64r6",
    target_arch = "sparc",
    target_arch = "hexagon",
    target_arch = "m68k",
    target_arch = "s390x",
)))]
pub type NativeLine = Line64;

/// A value aligned (and therefore sized) to a multiple of `L`'s alignment.
///
/// The zero-length array contributes `L`'s alignment and no bytes, so
/// `Padded<A, NoPadding>` has exactly the layout of `A`.
#[repr(C)]
pub(crate) struct Padded<A, L> {
    _align: [L; 0],
    value: A,
}

impl<A, L> Padded<A, L> {
    pub(crate) const fn new(value: A) -> Self {
        Self { _align: [], value }
    }
}

impl<A, L> Deref for Padded<A, L> {
    type Target = A;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

//! Compile-time configuration for [`RingBuffer`](crate::RingBuffer).
//!
//! Everything besides the capacity is chosen through a type implementing
//! [`Config`]: the cursor width, the padding between the cursors, and whether
//! the acquire/release barriers are emitted at all.

use crate::index::Index;
use crate::padding::{CacheLine, NativeLine, NoPadding};
use std::fmt;
use std::marker::PhantomData;

/// Layout and memory-model parameters of a ring buffer.
///
/// # Safety
///
/// Implementing this trait is only `unsafe` because of [`Config::FAKE_TSO`].
/// An implementation that sets it to `true` promises that the producer and
/// the consumer of every ring using this configuration run on the same
/// hardware thread: typically a thread and an interrupt handler that preempts
/// it on a single-core microcontroller. Under that condition a compiler fence
/// is all the ordering needed and the hardware barriers can be dropped.
/// Setting it on a multi-core system, even one with a total-store-order
/// memory model, is undefined behavior.
///
/// Implementations that leave `FAKE_TSO` at `false` have no obligations.
///
/// # Example
///
/// ```
/// use ringspsc_rs::{Config, NoPadding, RingBuffer};
///
/// /// Cortex-M0: one core, ISR producer, main-loop consumer.
/// struct UartRx;
///
/// // SAFETY: producer (USART ISR) and consumer (main loop) share a single core.
/// unsafe impl Config for UartRx {
///     type Index = u8;
///     type Line = NoPadding;
///     const FAKE_TSO: bool = true;
/// }
///
/// static RX: RingBuffer<u8, 64, UartRx> = RingBuffer::new();
/// assert!(RX.is_empty());
/// ```
pub unsafe trait Config: 'static {
    /// Integer type of the `head`/`tail` cursors.
    type Index: Index;

    /// Padding applied around each cursor.
    type Line: CacheLine;

    /// Replace acquire/release atomics with relaxed ones plus compiler fences.
    const FAKE_TSO: bool = false;
}

/// `usize` cursors padded to the target's cache line, full barriers.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultConfig;

// SAFETY: FAKE_TSO is false.
unsafe impl Config for DefaultConfig {
    type Index = usize;
    type Line = NativeLine;
}

/// `usize` cursors with no padding, full barriers.
///
/// For single-core targets where false sharing cannot happen and the struct
/// should stay as small as possible.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unpadded;

// SAFETY: FAKE_TSO is false.
unsafe impl Config for Unpadded {
    type Index = usize;
    type Line = NoPadding;
}

/// Any cursor width and padding, full barriers.
///
/// ```
/// use ringspsc_rs::{Custom, Line64, RingBuffer};
///
/// let ring: RingBuffer<u32, 128, Custom<u8, Line64>> = RingBuffer::new();
/// assert_eq!(ring.capacity(), 128);
/// ```
pub struct Custom<I, L>(PhantomData<fn() -> (I, L)>);

// Manual impls: derives would require `I` and `L` to implement the traits too.
impl<I, L> fmt::Debug for Custom<I, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Custom")
            .field("index", &std::any::type_name::<I>())
            .field("line", &std::any::type_name::<L>())
            .finish()
    }
}

impl<I, L> Clone for Custom<I, L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<I, L> Copy for Custom<I, L> {}

impl<I, L> Default for Custom<I, L> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

// SAFETY: FAKE_TSO is false.
unsafe impl<I: Index, L: CacheLine> Config for Custom<I, L> {
    type Index = I;
    type Line = L;
}

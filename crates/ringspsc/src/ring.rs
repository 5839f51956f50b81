use crate::config::{Config, DefaultConfig};
use crate::consumer::Consumer;
use crate::index::{self, Index};
use crate::invariants::{debug_assert_bounded_count, debug_assert_monotonic};
use crate::padding::{CacheLine, Padded};
use crate::producer::Producer;
use std::cell::UnsafeCell;
use std::fmt;
use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::ptr;
use std::sync::atomic::{compiler_fence, Ordering};

// =============================================================================
// MEMORY ORDERING & SYNCHRONIZATION STRATEGY
// =============================================================================
//
// ## Unbounded Cursors (no wasted slot)
//
// `head` counts every element ever inserted, `tail` every element ever
// removed. Neither is reduced modulo the capacity; they wrap at the native
// width of the index type. Occupancy is `head.wrapping_sub(tail)`, which is
// exact as long as `capacity <= 2^(bits-1)` (checked at compile time). This
// lets all `N` slots be used without a separate full/empty flag.
// The slot for a cursor is computed as `cursor & mask` only when accessing
// storage; the mask never takes part in comparisons.
//
// ## Memory Ordering Protocol
//
// **Producer (write path):**
// 1. Load `head` with Relaxed (only the producer writes head)
// 2. Load `tail` with Acquire (synchronizes with the consumer's release:
//    the consumer is done reading the slots it freed)
// 3. Copy data into slots `[head, head + n)`
// 4. Compiler fence, then store `head + n` with Release (publishes the data)
//
// **Consumer (read path):**
// 1. Load `tail` with Relaxed (only the consumer writes tail)
// 2. Load `head` with Acquire (synchronizes with the producer's release:
//    the data in `[tail, head)` is visible)
// 3. Copy data out of slots `[tail, tail + n)`
// 4. Compiler fence, then store `tail + n` with Release (returns the slots)
//
// Discarding operations (`remove`, `remove_n`) never read slot contents and
// load `head` Relaxed; they still release `tail`.
//
// ## Fake TSO
//
// With `Config::FAKE_TSO`, the Acquire/Release atomics above become Relaxed
// and only the compiler fences remain. That is exactly the synchronization
// needed between a thread and an interrupt handler on the same core.
//
// ## Slot Ownership
//
// Slots in `[tail, head)` belong to the consumer, all others to the
// producer. A slot changes owner only through a cursor publish observed with
// Acquire, so no slot is ever accessed by both sides without a
// happens-before edge in between.
//
// =============================================================================

/// A fixed-capacity, lock-free single-producer single-consumer ring buffer.
///
/// All `N` slots are usable. The buffer is embedded in the struct, so a ring
/// can live in a `static`, on the stack, or in a `Box`, and never allocates.
///
/// Access goes through a [`Producer`] and a [`Consumer`] handle obtained with
/// [`split`](Self::split) (or the `unsafe` [`producer`](Self::producer) /
/// [`consumer`](Self::consumer) for statics shared with an interrupt handler).
///
/// # Type Parameters
///
/// - `T`: element type. Must be `Copy`: elements are moved across the
///   producer/consumer boundary by plain memory copies and never dropped.
/// - `N`: capacity, a power of two that fits the cursor type.
/// - `C`: [`Config`] selecting the cursor width, the cache-line padding and
///   the barrier mode.
///
/// # Memory Layout
///
/// ```text
/// ┌───────────────────────────────────────────────┐
/// │ head: Atomic   ← producer writes, consumer reads (own line)
/// ├───────────────────────────────────────────────┤
/// │ tail: Atomic   ← consumer writes, producer reads (own line)
/// ├───────────────────────────────────────────────┤
/// │ storage: [T; N] (starts on a fresh line)       │
/// └───────────────────────────────────────────────┘
/// ```
///
/// # Invalid capacities
///
/// A capacity that is zero, not a power of two, or too large for the cursor
/// type is rejected when the constructor is instantiated:
///
/// ```compile_fail
/// use ringspsc_rs::RingBuffer;
///
/// let ring: RingBuffer<u8, 6> = RingBuffer::new();
/// ```
///
/// ```compile_fail
/// use ringspsc_rs::{Custom, NoPadding, RingBuffer};
///
/// // 256 slots need at least a 9-bit cursor.
/// let ring: RingBuffer<u8, 256, Custom<u8, NoPadding>> = RingBuffer::new();
/// ```
///
/// Non-`Copy` element types are rejected as well:
///
/// ```compile_fail
/// use ringspsc_rs::RingBuffer;
///
/// let ring: RingBuffer<String, 8> = RingBuffer::new();
/// ```
#[repr(C)]
pub struct RingBuffer<T: Copy, const N: usize, C: Config = DefaultConfig> {
    /// Count of elements ever inserted (written by the producer only)
    head: Padded<<C::Index as Index>::Atomic, C::Line>,
    /// Count of elements ever removed (written by the consumer only)
    tail: Padded<<C::Index as Index>::Atomic, C::Line>,
    /// Slot storage, owned per-slot by whichever side the cursors assign it to
    storage: Padded<UnsafeCell<[MaybeUninit<T>; N]>, C::Line>,
    _config: PhantomData<fn() -> C>,
}

// Safety: the producer and consumer only ever touch disjoint slots, and slot
// ownership is handed over through the acquire/release pairs on the cursors.
// Elements cross threads by copy, so `T: Send` is required.
unsafe impl<T: Copy + Send, const N: usize, C: Config> Sync for RingBuffer<T, N, C> {}

impl<T: Copy, const N: usize, C: Config> RingBuffer<T, N, C> {
    /// `N - 1`; only used to map logical indices onto slots.
    pub(crate) const MASK: usize = N.wrapping_sub(1);

    const ACQUIRE: Ordering = if C::FAKE_TSO {
        Ordering::Relaxed
    } else {
        Ordering::Acquire
    };

    const RELEASE: Ordering = if C::FAKE_TSO {
        Ordering::Relaxed
    } else {
        Ordering::Release
    };

    const VALID_CAPACITY: () = {
        assert!(N > 0, "RingBuffer capacity must be > 0");
        assert!(N.is_power_of_two(), "RingBuffer capacity must be a power of 2");
        assert!(
            index::fits::<C::Index>(N),
            "RingBuffer capacity is too large for the cursor index type (maximum for n bits is 2^(n-1))"
        );
    };

    /// Creates an empty ring buffer.
    ///
    /// This is a `const fn`, so rings can be declared as `static` items and
    /// shared with interrupt handlers.
    ///
    /// # Example
    ///
    /// ```
    /// use ringspsc_rs::RingBuffer;
    ///
    /// static SAMPLES: RingBuffer<u16, 256> = RingBuffer::new();
    ///
    /// assert_eq!(SAMPLES.capacity(), 256);
    /// assert!(SAMPLES.is_empty());
    /// ```
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::VALID_CAPACITY;

        Self {
            head: Padded::new(<C::Index as Index>::ATOMIC_ZERO),
            tail: Padded::new(<C::Index as Index>::ATOMIC_ZERO),
            storage: Padded::new(UnsafeCell::new([MaybeUninit::uninit(); N])),
            _config: PhantomData,
        }
    }

    /// Splits the ring into its producer and consumer handles.
    ///
    /// The exclusive borrow guarantees there is exactly one of each for as
    /// long as the handles live. Data left in the ring stays there when the
    /// handles are dropped, and the ring can be split again later.
    ///
    /// # Example
    ///
    /// ```
    /// use ringspsc_rs::RingBuffer;
    ///
    /// let mut ring: RingBuffer<u32, 8> = RingBuffer::new();
    /// let (mut producer, mut consumer) = ring.split();
    ///
    /// std::thread::scope(|s| {
    ///     s.spawn(move || {
    ///         for i in 0..100 {
    ///             while !producer.insert(i) {
    ///                 std::hint::spin_loop();
    ///             }
    ///         }
    ///     });
    ///
    ///     let mut expected = 0;
    ///     while expected < 100 {
    ///         if let Some(v) = consumer.pop() {
    ///             assert_eq!(v, expected);
    ///             expected += 1;
    ///         }
    ///     }
    /// });
    /// ```
    pub fn split(&mut self) -> (Producer<'_, T, N, C>, Consumer<'_, T, N, C>) {
        log::debug!(
            "splitting ring: capacity={}, index={}, padding={}, fake_tso={}",
            N,
            std::any::type_name::<C::Index>(),
            <C::Line as CacheLine>::SIZE,
            C::FAKE_TSO
        );
        let ring: &Self = self;
        (Producer::new(ring), Consumer::new(ring))
    }

    /// Creates a producer handle from a shared reference.
    ///
    /// Meant for rings in a `static` that are filled from an interrupt
    /// handler or a second thread, where [`split`](Self::split) cannot be
    /// used.
    ///
    /// # Safety
    ///
    /// At most one producer handle for this ring may exist at any time,
    /// including the one returned by `split`. Two live producers race on the
    /// same slots.
    #[inline]
    pub unsafe fn producer(&self) -> Producer<'_, T, N, C> {
        Producer::new(self)
    }

    /// Creates a consumer handle from a shared reference.
    ///
    /// # Safety
    ///
    /// At most one consumer handle for this ring may exist at any time,
    /// including the one returned by `split`.
    #[inline]
    pub unsafe fn consumer(&self) -> Consumer<'_, T, N, C> {
        Consumer::new(self)
    }

    // =========================================================================
    // STATUS
    // =========================================================================

    /// Returns the capacity `N`.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of elements the consumer can read.
    ///
    /// `head` is loaded with Acquire so that the data behind it is visible to
    /// the caller. From the consumer's side the value is a lower bound: the
    /// producer can only make it grow.
    #[inline]
    pub fn read_available(&self) -> usize {
        let head = self.head_acquire();
        let tail = self.tail_relaxed();
        head.distance(tail)
    }

    /// Number of free slots the producer can fill.
    ///
    /// `tail` is loaded with Acquire so that the consumer's reads of the freed
    /// slots are complete before they are overwritten. From the producer's
    /// side the value is a lower bound: the consumer can only make it grow.
    #[inline]
    pub fn write_available(&self) -> usize {
        let head = self.head_relaxed();
        let tail = self.tail_acquire();
        N - head.distance(tail)
    }

    /// Returns `true` if there is nothing to read.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.read_available() == 0
    }

    /// Returns `true` if there is no free slot.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.write_available() == 0
    }

    /// Relaxed snapshot of the occupancy, for monitoring from a third context.
    ///
    /// Gives no synchronization guarantee; use [`read_available`](Self::read_available)
    /// or [`write_available`](Self::write_available) before touching data.
    ///
    /// A racing snapshot errs towards empty: `tail` is loaded before `head`,
    /// and a pair that still looks inconsistent (tail past head) reads as `0`.
    #[inline]
    pub fn len(&self) -> usize {
        let tail = self.tail_relaxed();
        let head = self.head_relaxed();
        Self::snapshot_len(head, tail)
    }

    /// Occupancy for a pair of cursors loaded without ordering.
    #[inline]
    fn snapshot_len(head: C::Index, tail: C::Index) -> usize {
        let count = head.distance(tail);
        if count > N {
            0
        } else {
            count
        }
    }

    // =========================================================================
    // CURSORS (crate-internal)
    // =========================================================================

    #[inline]
    pub(crate) fn head_relaxed(&self) -> C::Index {
        <C::Index as Index>::load(&*self.head, Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn head_acquire(&self) -> C::Index {
        let head = <C::Index as Index>::load(&*self.head, Self::ACQUIRE);
        if C::FAKE_TSO {
            compiler_fence(Ordering::Acquire);
        }
        head
    }

    #[inline]
    pub(crate) fn tail_relaxed(&self) -> C::Index {
        <C::Index as Index>::load(&*self.tail, Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn tail_acquire(&self) -> C::Index {
        let tail = <C::Index as Index>::load(&*self.tail, Self::ACQUIRE);
        if C::FAKE_TSO {
            compiler_fence(Ordering::Acquire);
        }
        tail
    }

    /// Publishes `new` as the producer cursor. Producer side only.
    #[inline]
    pub(crate) fn publish_head(&self, old: C::Index, new: C::Index) {
        debug_assert_monotonic!("head", old, new, N);
        debug_assert_bounded_count!(new, self.tail_relaxed(), N);

        // Slot writes must not sink below the cursor store.
        compiler_fence(Ordering::Release);
        <C::Index as Index>::store(&*self.head, new, Self::RELEASE);
    }

    /// Publishes `new` as the consumer cursor. Consumer side only.
    #[inline]
    pub(crate) fn publish_tail(&self, old: C::Index, new: C::Index) {
        debug_assert_monotonic!("tail", old, new, N);
        debug_assert_bounded_count!(self.head_relaxed(), new, N);

        compiler_fence(Ordering::Release);
        <C::Index as Index>::store(&*self.tail, new, Self::RELEASE);
    }

    // =========================================================================
    // STORAGE (crate-internal)
    // =========================================================================

    /// Pointer to the first slot. Valid for the whole array.
    #[inline]
    fn base(&self) -> *mut T {
        self.storage.get().cast::<T>()
    }

    /// Pointer to the slot holding logical index `pos`.
    #[inline]
    pub(crate) fn slot(&self, pos: C::Index) -> *mut T {
        // SAFETY: `slot(MASK)` is always < N.
        unsafe { self.base().add(pos.slot(Self::MASK)) }
    }

    /// Copies `src` into the slots starting at logical index `at`, wrapping
    /// around the end of the storage.
    ///
    /// # Safety
    ///
    /// The caller must be the producer and `[at, at + src.len())` must lie
    /// in the free region (`src.len() <= write_available()`).
    #[inline]
    pub(crate) unsafe fn copy_in(&self, at: C::Index, src: &[T]) {
        debug_assert!(src.len() <= N);
        let idx = at.slot(Self::MASK);
        let first = src.len().min(N - idx);
        let base = self.base();

        ptr::copy_nonoverlapping(src.as_ptr(), base.add(idx), first);
        ptr::copy_nonoverlapping(src.as_ptr().add(first), base, src.len() - first);
    }

    /// Copies the slots starting at logical index `at` into `dst`, wrapping
    /// around the end of the storage.
    ///
    /// # Safety
    ///
    /// The caller must be the consumer and `[at, at + dst.len())` must lie in
    /// the readable region (`dst.len() <= read_available()`).
    #[inline]
    pub(crate) unsafe fn copy_out(&self, at: C::Index, dst: &mut [T]) {
        debug_assert!(dst.len() <= N);
        let idx = at.slot(Self::MASK);
        let first = dst.len().min(N - idx);
        let base = self.base();

        ptr::copy_nonoverlapping(base.add(idx), dst.as_mut_ptr(), first);
        ptr::copy_nonoverlapping(base, dst.as_mut_ptr().add(first), dst.len() - first);
    }
}

impl<T: Copy, const N: usize, C: Config> Default for RingBuffer<T, N, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Copy, const N: usize, C: Config> fmt::Debug for RingBuffer<T, N, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &N)
            .field("head", &self.head_relaxed())
            .field("tail", &self.tail_relaxed())
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Custom, Unpadded};
    use crate::padding::{Line128, Line64, NativeLine, NoPadding};
    use std::mem::{align_of, offset_of, size_of};

    #[test]
    fn test_new_ring_is_empty() {
        let ring: RingBuffer<u64, 16> = RingBuffer::new();

        assert_eq!(ring.capacity(), 16);
        assert_eq!(ring.read_available(), 0);
        assert_eq!(ring.write_available(), 16);
        assert!(ring.is_empty());
        assert!(!ring.is_full());
        assert_eq!(ring.len(), 0);
    }

    #[test]
    fn test_static_ring() {
        static RING: RingBuffer<u32, 4, Unpadded> = RingBuffer::new();

        // SAFETY: this test is the only user of RING.
        let (mut producer, mut consumer) = unsafe { (RING.producer(), RING.consumer()) };
        assert!(producer.insert(5));
        assert_eq!(RING.len(), 1);
        assert_eq!(consumer.pop(), Some(5));
        assert!(RING.is_empty());
    }

    #[test]
    fn test_cursors_on_separate_lines() {
        type Ring = RingBuffer<u8, 8, Custom<usize, Line64>>;

        let head = offset_of!(Ring, head);
        let tail = offset_of!(Ring, tail);
        let storage = offset_of!(Ring, storage);

        assert_eq!(head, 0);
        assert!(tail - head >= 64, "head/tail share a cache line");
        assert!(storage - tail >= 64, "tail/storage share a cache line");
        assert_eq!(align_of::<Ring>(), 64);
    }

    #[test]
    fn test_default_layout_uses_native_line() {
        type Ring = RingBuffer<u32, 8>;

        let line = <NativeLine as CacheLine>::SIZE;
        assert!(offset_of!(Ring, tail) - offset_of!(Ring, head) >= line);
        assert_eq!(align_of::<Ring>(), line);

        type Wide = RingBuffer<u32, 8, Custom<usize, Line128>>;
        assert_eq!(offset_of!(Wide, tail), 128);
        assert_eq!(offset_of!(Wide, storage), 256);
    }

    #[test]
    fn test_unpadded_layout_is_packed() {
        type Ring = RingBuffer<u8, 4, Custom<u8, NoPadding>>;

        assert_eq!(offset_of!(Ring, tail), 1);
        assert_eq!(offset_of!(Ring, storage), 2);
        assert_eq!(size_of::<Ring>(), 6);
    }

    #[test]
    fn test_copy_wraps_around_storage() {
        let mut ring: RingBuffer<u32, 8> = RingBuffer::new();
        let (mut producer, mut consumer) = ring.split();

        // Move both cursors to 6 so the next write straddles the end.
        assert_eq!(producer.write_bulk(&[0; 6]), 6);
        assert_eq!(consumer.remove_n(6), 6);

        assert_eq!(producer.write_bulk(&[1, 2, 3, 4]), 4);
        let mut out = [0; 4];
        assert_eq!(consumer.read_bulk(&mut out), 4);
        assert_eq!(out, [1, 2, 3, 4]);
    }

    #[test]
    fn test_debug_output() {
        let mut ring: RingBuffer<u8, 4> = RingBuffer::new();
        let (mut producer, _) = ring.split();
        producer.insert(1);

        let text = format!("{ring:?}");
        assert!(text.contains("capacity: 4"));
        assert!(text.contains("head: 1"));
        assert!(text.contains("len: 1"));
    }

    #[test]
    fn test_len_snapshot_with_stale_head_reads_empty() {
        type Ring = RingBuffer<u8, 8, Custom<u8, NoPadding>>;

        assert_eq!(Ring::snapshot_len(5, 5), 0);
        assert_eq!(Ring::snapshot_len(13, 5), 8);
        assert_eq!(Ring::snapshot_len(2, 250), 8);
        // Tail already moved past the head that was read.
        assert_eq!(Ring::snapshot_len(3, 5), 0);
        assert_eq!(Ring::snapshot_len(250, 2), 0);
    }

    /// Single core, producer in an interrupt handler: barriers reduced to
    /// compiler fences.
    struct IsrConfig;

    // SAFETY: only used from a single thread.
    unsafe impl Config for IsrConfig {
        type Index = u8;
        type Line = NoPadding;
        const FAKE_TSO: bool = true;
    }

    #[test]
    fn test_fake_tso_ring_over_many_wraps() {
        let mut ring: RingBuffer<u16, 8, IsrConfig> = RingBuffer::new();
        let (mut producer, mut consumer) = ring.split();

        let mut next = 0u16;
        let mut expected = 0u16;
        // 120 laps of 4 elements: the u8 cursors wrap almost twice.
        for lap in 0..120u16 {
            assert!(producer.insert(next));
            assert_eq!(producer.write_bulk(&[next + 1, next + 2, next + 3]), 3);
            next += 4;

            assert_eq!(consumer.pop(), Some(expected));
            let mut out = [0u16; 2];
            assert_eq!(consumer.read_bulk(&mut out), 2);
            assert_eq!(out, [expected + 1, expected + 2]);
            expected += 3;

            if lap % 10 == 9 {
                // Drop the straggler with a clear instead of reading it.
                assert_eq!(consumer.clear(), 1);
                expected += 1;
            } else {
                assert_eq!(consumer.pop(), Some(expected));
                expected += 1;
            }
            assert!(consumer.is_empty());
            assert_eq!(producer.write_available(), 8);
        }

        assert_eq!(producer.write_bulk(&[1; 10]), 8);
        assert!(producer.is_full());
        assert_eq!(ring.len(), 8);
    }
}

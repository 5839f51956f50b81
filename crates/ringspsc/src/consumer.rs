//! Consumer side of the ring.

use crate::config::{Config, DefaultConfig};
use crate::error::Empty;
use crate::index::Index;
use crate::invariants::debug_assert_initialized_read;
use crate::ring::RingBuffer;
use std::fmt;

/// The reading half of a [`RingBuffer`].
///
/// There is at most one consumer per ring. Slots holding unconsumed data
/// belong to the consumer alone, which is why it can hand out references
/// into the ring ([`peek`](Self::peek), [`at`](Self::at)) and even mutable
/// ones ([`peek_mut`](Self::peek_mut)). Every removing method takes
/// `&mut self`, so no such reference can outlive the element it points to.
pub struct Consumer<'a, T: Copy, const N: usize, C: Config = DefaultConfig> {
    ring: &'a RingBuffer<T, N, C>,
}

impl<'a, T: Copy, const N: usize, C: Config> Consumer<'a, T, N, C> {
    pub(crate) fn new(ring: &'a RingBuffer<T, N, C>) -> Self {
        Self { ring }
    }

    /// Returns the capacity of the underlying ring.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of readable elements. A lower bound: the producer can only add to it.
    #[inline]
    pub fn read_available(&self) -> usize {
        self.ring.read_available()
    }

    /// Returns `true` if there is nothing to read.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Discards the oldest element without reading it.
    ///
    /// Returns `false` if the ring is empty.
    #[inline]
    pub fn remove(&mut self) -> bool {
        self.remove_n(1) == 1
    }

    /// Discards up to `count` of the oldest elements with a single `tail` publish.
    ///
    /// Returns the number discarded, `min(count, read_available())`.
    pub fn remove_n(&mut self, count: usize) -> usize {
        let tail = self.ring.tail_relaxed();
        // Slot contents are not read, so head needs no Acquire.
        let available = self.ring.head_relaxed().distance(tail);
        let count = count.min(available);
        if count > 0 {
            self.ring.publish_tail(tail, tail.advance(count));
        }
        count
    }

    /// Moves the oldest element into `out`.
    ///
    /// Returns `false` and leaves `out` untouched if the ring is empty.
    #[inline]
    pub fn remove_into(&mut self, out: &mut T) -> bool {
        match self.pop() {
            Some(value) => {
                *out = value;
                true
            }
            None => false,
        }
    }

    /// Removes and returns the oldest element.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        let tail = self.ring.tail_relaxed();
        if self.ring.head_acquire() == tail {
            return None;
        }

        // SAFETY: `tail < head`, so the slot holds a published element
        // owned by the consumer.
        let value = unsafe { self.ring.slot(tail).read() };
        self.ring.publish_tail(tail, tail.advance(1));
        Some(value)
    }

    /// Removes and returns the oldest element, or [`Empty`].
    ///
    /// ```
    /// use ringspsc_rs::{Empty, RingBuffer};
    ///
    /// let mut ring: RingBuffer<u8, 4> = RingBuffer::new();
    /// let (mut producer, mut consumer) = ring.split();
    ///
    /// producer.insert(7);
    /// assert_eq!(consumer.try_pop(), Ok(7));
    /// assert_eq!(consumer.try_pop(), Err(Empty));
    /// ```
    #[inline]
    pub fn try_pop(&mut self) -> Result<T, Empty> {
        self.pop().ok_or(Empty)
    }

    /// Returns the oldest element without removing it.
    #[inline]
    pub fn peek(&self) -> Option<&T> {
        self.at(0)
    }

    /// Returns the oldest element mutably, for in-place updates before it is
    /// consumed.
    #[inline]
    pub fn peek_mut(&mut self) -> Option<&mut T> {
        self.at_mut(0)
    }

    /// Returns the element `offset` positions after the oldest one, or
    /// `None` if `offset >= read_available()`.
    #[inline]
    pub fn at(&self, offset: usize) -> Option<&T> {
        if offset >= self.read_available() {
            return None;
        }
        // SAFETY: bounds checked above, and the Acquire in `read_available`
        // makes the element visible.
        Some(unsafe { self.get_unchecked(offset) })
    }

    /// Mutable variant of [`at`](Self::at).
    #[inline]
    pub fn at_mut(&mut self, offset: usize) -> Option<&mut T> {
        if offset >= self.read_available() {
            return None;
        }
        let pos = self.ring.tail_relaxed().advance(offset);
        // SAFETY: the slot is in `[tail, head)`, owned exclusively by the
        // consumer, and `&mut self` prevents any other access through it.
        Some(unsafe { &mut *self.ring.slot(pos) })
    }

    /// Returns the element `offset` positions after the oldest one without
    /// bounds checking.
    ///
    /// # Safety
    ///
    /// `offset` must be below a value returned by
    /// [`read_available`](Self::read_available) (or `0` after
    /// [`is_empty`](Self::is_empty) returned `false`) on this handle, with no
    /// removing call in between. That earlier call is also what provides the
    /// Acquire barrier making the element visible.
    ///
    /// # Example
    ///
    /// ```
    /// use ringspsc_rs::RingBuffer;
    ///
    /// let mut ring: RingBuffer<u32, 8> = RingBuffer::new();
    /// let (mut producer, consumer) = ring.split();
    /// producer.write_bulk(&[10, 20, 30]);
    ///
    /// let mut sum = 0;
    /// for i in 0..consumer.read_available() {
    ///     // SAFETY: `i` is below the available count just observed.
    ///     sum += unsafe { *consumer.get_unchecked(i) };
    /// }
    /// assert_eq!(sum, 60);
    /// ```
    #[inline]
    pub unsafe fn get_unchecked(&self, offset: usize) -> &T {
        debug_assert_initialized_read!(offset, self.ring.read_available());
        let pos = self.ring.tail_relaxed().advance(offset);
        &*self.ring.slot(pos)
    }

    /// Copies up to `dst.len()` of the oldest elements into `dst` and
    /// releases them with a single `tail` publish.
    ///
    /// Returns the number copied, `min(dst.len(), read_available())`.
    pub fn read_bulk(&mut self, dst: &mut [T]) -> usize {
        let tail = self.ring.tail_relaxed();
        let available = self.ring.head_acquire().distance(tail);
        let count = dst.len().min(available);
        if count == 0 {
            return 0;
        }

        // SAFETY: `count` slots starting at `tail` hold published elements.
        unsafe { self.ring.copy_out(tail, &mut dst[..count]) };
        self.ring.publish_tail(tail, tail.advance(count));
        count
    }

    /// Reads into `dst` in chunks, calling `on_progress` after every publish.
    ///
    /// The read-side mirror of
    /// [`Producer::write_bulk_chunked`](crate::Producer::write_bulk_chunked):
    /// the first chunk holds at most `chunk_size` elements (`0` means no
    /// limit), each chunk is followed by a `tail` publish and a call to
    /// `on_progress` (typically letting the producer refill), and the loop
    /// ends when `dst` is full or no new element has arrived.
    ///
    /// Returns the total number of elements read.
    ///
    /// # Execution time
    ///
    /// **This method is not bounded in time.** As long as the producer keeps
    /// publishing, it keeps reading.
    pub fn read_bulk_chunked<F>(&mut self, dst: &mut [T], chunk_size: usize, mut on_progress: F) -> usize
    where
        F: FnMut(),
    {
        let mut tail = self.ring.tail_relaxed();
        let mut read = 0;
        let mut limit = if chunk_size == 0 { usize::MAX } else { chunk_size };

        while read < dst.len() {
            let available = self.ring.head_acquire().distance(tail);
            if available == 0 {
                break;
            }

            let count = (dst.len() - read).min(available).min(limit);
            // SAFETY: `count` slots starting at `tail` hold published elements.
            unsafe { self.ring.copy_out(tail, &mut dst[read..read + count]) };
            let new_tail = tail.advance(count);
            self.ring.publish_tail(tail, new_tail);
            tail = new_tail;
            read += count;

            on_progress();
            limit = usize::MAX;
        }

        if read < dst.len() {
            log::trace!("read_bulk_chunked stopped at {} of {} elements: ring empty", read, dst.len());
        }
        read
    }

    /// Discards everything currently in the ring.
    ///
    /// Sets `tail` to the current `head`. Always safe from the consumer's
    /// side; elements published concurrently may or may not be discarded.
    /// Returns the number of elements discarded.
    pub fn clear(&mut self) -> usize {
        let tail = self.ring.tail_relaxed();
        let head = self.ring.head_relaxed();
        let discarded = head.distance(tail);
        if discarded > 0 {
            self.ring.publish_tail(tail, head);
            log::debug!("consumer cleared ring: {} elements discarded", discarded);
        }
        discarded
    }
}

impl<T: Copy, const N: usize, C: Config> Iterator for Consumer<'_, T, N, C> {
    type Item = T;

    /// Pops the oldest element. Returns `None` whenever the ring is empty,
    /// even if the producer publishes more later.
    #[inline]
    fn next(&mut self) -> Option<T> {
        self.pop()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.read_available(), None)
    }
}

impl<T: Copy, const N: usize, C: Config> fmt::Debug for Consumer<'_, T, N, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Consumer")
            .field("capacity", &N)
            .field("read_available", &self.read_available())
            .finish()
    }
}

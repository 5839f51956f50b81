//! Producer side of the ring.

use crate::config::{Config, DefaultConfig};
use crate::error::Full;
use crate::index::Index;
use crate::ring::RingBuffer;
use std::fmt;

/// The writing half of a [`RingBuffer`].
///
/// There is at most one producer per ring, so every method that moves `head`
/// takes `&mut self`. The handle is `Send` and can be moved to the producing
/// thread.
///
/// None of the methods block: when the ring is full they return `false` or a
/// short count, and retrying is up to the caller.
pub struct Producer<'a, T: Copy, const N: usize, C: Config = DefaultConfig> {
    ring: &'a RingBuffer<T, N, C>,
}

impl<'a, T: Copy, const N: usize, C: Config> Producer<'a, T, N, C> {
    pub(crate) fn new(ring: &'a RingBuffer<T, N, C>) -> Self {
        Self { ring }
    }

    /// Returns the capacity of the underlying ring.
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Number of free slots. A lower bound: the consumer can only add to it.
    #[inline]
    pub fn write_available(&self) -> usize {
        self.ring.write_available()
    }

    /// Returns `true` if no slot is free.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    /// Inserts one element.
    ///
    /// Returns `false` without touching the ring if it is full.
    #[inline]
    pub fn insert(&mut self, value: T) -> bool {
        self.insert_with(|| value)
    }

    /// Inserts the value returned by `f`, calling `f` only if there is room.
    ///
    /// For sources where producing the value has a side effect that must not
    /// happen if the value would be dropped, such as reading a peripheral
    /// data register that clears its status flag.
    ///
    /// # Example
    ///
    /// ```
    /// use ringspsc_rs::RingBuffer;
    ///
    /// let mut ring: RingBuffer<u8, 2> = RingBuffer::new();
    /// let (mut producer, _consumer) = ring.split();
    ///
    /// let mut reads = 0;
    /// for _ in 0..3 {
    ///     producer.insert_with(|| {
    ///         reads += 1;
    ///         0x55
    ///     });
    /// }
    /// assert_eq!(reads, 2);
    /// ```
    #[inline]
    pub fn insert_with<F>(&mut self, f: F) -> bool
    where
        F: FnOnce() -> T,
    {
        let head = self.ring.head_relaxed();
        if head.distance(self.ring.tail_acquire()) == N {
            return false;
        }

        // SAFETY: the ring is not full, so slot `head` is owned by the producer.
        unsafe { self.ring.slot(head).write(f()) };
        self.ring.publish_head(head, head.advance(1));
        true
    }

    /// Inserts one element, handing it back inside the error if the ring is full.
    ///
    /// ```
    /// use ringspsc_rs::{Full, RingBuffer};
    ///
    /// let mut ring: RingBuffer<u32, 1> = RingBuffer::new();
    /// let (mut producer, _consumer) = ring.split();
    ///
    /// assert_eq!(producer.try_insert(1), Ok(()));
    /// assert_eq!(producer.try_insert(2), Err(Full(2)));
    /// ```
    #[inline]
    pub fn try_insert(&mut self, value: T) -> Result<(), Full<T>> {
        if self.insert(value) {
            Ok(())
        } else {
            Err(Full(value))
        }
    }

    /// Copies as much of `src` as fits and publishes it with a single store.
    ///
    /// Returns the number of elements written, `min(src.len(), write_available())`.
    /// A short write is not an error.
    pub fn write_bulk(&mut self, src: &[T]) -> usize {
        let head = self.ring.head_relaxed();
        let available = N - head.distance(self.ring.tail_acquire());
        let count = src.len().min(available);
        if count == 0 {
            return 0;
        }

        // SAFETY: `count` slots starting at `head` are free.
        unsafe { self.ring.copy_in(head, &src[..count]) };
        self.ring.publish_head(head, head.advance(count));
        count
    }

    /// Writes `src` in chunks, calling `on_progress` after every publish.
    ///
    /// The first chunk holds at most `chunk_size` elements (`0` means no
    /// limit). Every later chunk is as large as the free space allows. After
    /// each chunk `head` is published and `on_progress` runs, typically to
    /// start or notify the consumer; then availability is checked again. The
    /// loop ends when all of `src` is written or no slot has been freed.
    ///
    /// Returns the total number of elements written.
    ///
    /// # Execution time
    ///
    /// **This method is not bounded in time.** As long as the consumer keeps
    /// freeing slots, it keeps writing. Do not call it where a deterministic
    /// worst case is required, such as from an interrupt handler.
    ///
    /// # Example
    ///
    /// ```
    /// use ringspsc_rs::RingBuffer;
    ///
    /// let ring: RingBuffer<u8, 4> = RingBuffer::new();
    /// // SAFETY: single-threaded; one producer and one consumer handle.
    /// let (mut producer, consumer) = unsafe { (ring.producer(), ring.consumer()) };
    /// let consumer = std::cell::RefCell::new(consumer);
    ///
    /// let src: Vec<u8> = (0..20).collect();
    /// let mut received = Vec::new();
    /// let written = producer.write_bulk_chunked(&src, 4, || {
    ///     let mut buf = [0u8; 4];
    ///     let n = consumer.borrow_mut().read_bulk(&mut buf);
    ///     received.extend_from_slice(&buf[..n]);
    /// });
    ///
    /// assert_eq!(written, 20);
    /// assert_eq!(received, src);
    /// ```
    pub fn write_bulk_chunked<F>(&mut self, src: &[T], chunk_size: usize, mut on_progress: F) -> usize
    where
        F: FnMut(),
    {
        let mut head = self.ring.head_relaxed();
        let mut written = 0;
        let mut limit = if chunk_size == 0 { usize::MAX } else { chunk_size };

        while written < src.len() {
            let available = N - head.distance(self.ring.tail_acquire());
            if available == 0 {
                break;
            }

            let count = (src.len() - written).min(available).min(limit);
            // SAFETY: `count` slots starting at `head` are free.
            unsafe { self.ring.copy_in(head, &src[written..written + count]) };
            let new_head = head.advance(count);
            self.ring.publish_head(head, new_head);
            head = new_head;
            written += count;

            on_progress();
            limit = usize::MAX;
        }

        if written < src.len() {
            log::trace!(
                "write_bulk_chunked stopped at {} of {} elements: ring full",
                written,
                src.len()
            );
        }
        written
    }

    /// Discards everything currently in the ring, from the producer side.
    ///
    /// Moves `tail` up to `head`, exactly like
    /// [`Consumer::clear`](crate::Consumer::clear). Returns the number of
    /// elements discarded.
    ///
    /// # Safety
    ///
    /// The consumer must not be running any operation concurrently. The
    /// producer writes the consumer's cursor here; if the consumer is
    /// mid-read, its own `tail` publish can undo the clear, and the producer
    /// may start overwriting slots the consumer is still reading.
    pub unsafe fn clear_from_producer(&mut self) -> usize {
        // SAFETY: the caller guarantees the consumer is quiescent, so the
        // producer may act as the consumer for the duration of the call.
        let discarded = unsafe { self.ring.consumer() }.clear();
        log::debug!("producer cleared ring: {} elements discarded", discarded);
        discarded
    }
}

impl<T: Copy, const N: usize, C: Config> fmt::Debug for Producer<'_, T, N, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Producer")
            .field("capacity", &N)
            .field("write_available", &self.write_available())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Custom;
    use crate::padding::NoPadding;

    #[test]
    fn test_insert_until_full() {
        let mut ring: RingBuffer<u32, 4> = RingBuffer::new();
        let (mut producer, consumer) = ring.split();

        for i in 0..4 {
            assert!(producer.insert(i));
        }
        assert!(producer.is_full());
        assert_eq!(producer.write_available(), 0);
        assert!(!producer.insert(99));
        assert_eq!(consumer.read_available(), 4);
    }

    #[test]
    fn test_insert_with_skips_callback_when_full() {
        let mut ring: RingBuffer<u32, 1> = RingBuffer::new();
        let (mut producer, _consumer) = ring.split();

        assert!(producer.insert_with(|| 1));
        let mut called = false;
        assert!(!producer.insert_with(|| {
            called = true;
            2
        }));
        assert!(!called);
    }

    #[test]
    fn test_try_insert_returns_value() {
        let mut ring: RingBuffer<u32, 2> = RingBuffer::new();
        let (mut producer, _consumer) = ring.split();

        producer.try_insert(1).unwrap();
        producer.try_insert(2).unwrap();
        let err = producer.try_insert(3).unwrap_err();
        assert_eq!(err.into_inner(), 3);
    }

    #[test]
    fn test_write_bulk_partial() {
        let mut ring: RingBuffer<u16, 8> = RingBuffer::new();
        let (mut producer, _consumer) = ring.split();

        assert_eq!(producer.write_bulk(&[1, 2, 3]), 3);
        assert_eq!(producer.write_bulk(&[0; 10]), 5);
        assert_eq!(producer.write_bulk(&[7]), 0);
        assert_eq!(producer.write_bulk(&[]), 0);
    }

    #[test]
    fn test_chunked_first_chunk_bounded() {
        let mut ring: RingBuffer<u8, 8> = RingBuffer::new();
        let (mut producer, consumer) = ring.split();

        let mut seen = Vec::new();
        let written = producer.write_bulk_chunked(&[0; 8], 3, || seen.push(consumer.read_available()));

        assert_eq!(written, 8);
        assert_eq!(seen, vec![3, 8]);
    }

    #[test]
    fn test_chunked_zero_chunk_is_unbounded() {
        let mut ring: RingBuffer<u8, 8> = RingBuffer::new();
        let (mut producer, _consumer) = ring.split();

        let mut calls = 0;
        let written = producer.write_bulk_chunked(&[0; 6], 0, || calls += 1);
        assert_eq!(written, 6);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_chunked_stops_when_no_space_opens() {
        let mut ring: RingBuffer<u8, 4> = RingBuffer::new();
        let (mut producer, _consumer) = ring.split();

        let mut calls = 0;
        let written = producer.write_bulk_chunked(&[1; 20], 2, || calls += 1);
        assert_eq!(written, 4);
        assert_eq!(calls, 2);

        // Already full: nothing written, callback never runs.
        let written = producer.write_bulk_chunked(&[1; 20], 2, || calls += 1);
        assert_eq!(written, 0);
        assert_eq!(calls, 2);
    }

    #[test]
    fn test_clear_from_producer() {
        let mut ring: RingBuffer<u8, 8, Custom<u8, NoPadding>> = RingBuffer::new();
        let (mut producer, consumer) = ring.split();

        producer.write_bulk(&[1, 2, 3, 4, 5]);
        // SAFETY: the consumer handle is idle on this thread.
        assert_eq!(unsafe { producer.clear_from_producer() }, 5);
        assert!(consumer.is_empty());
        assert_eq!(producer.write_available(), 8);
    }
}

//! RingSPSC - Lock-Free Single-Producer Single-Consumer Ring Buffer
//!
//! A fixed-capacity circular buffer for passing `Copy` data between exactly
//! two execution contexts (two threads, or a thread and an interrupt handler)
//! with no locks, no blocking and no allocation.
//!
//! # Key Features
//!
//! - No wasted slot: all `N` slots are usable, thanks to unbounded cursors
//!   compared with wrapping arithmetic
//! - Acquire/release pairs on the two cursors, nothing stronger
//! - Cursors padded onto separate cache lines (configurable, including off)
//! - Configurable cursor width (`u8` .. `usize`) for small targets
//! - `const fn` constructor: rings can be `static`
//! - Bulk copies with a single cursor publish, and chunked transfers with a
//!   progress callback for moving more data than the ring holds
//!
//! # Example
//!
//! ```
//! use ringspsc_rs::RingBuffer;
//!
//! let mut ring: RingBuffer<u32, 8> = RingBuffer::new();
//! let (mut producer, mut consumer) = ring.split();
//!
//! // Bulk write: only as much as fits
//! let written = producer.write_bulk(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
//! assert_eq!(written, 8);
//!
//! // Bulk read: only as much as is there
//! let mut out = [0; 10];
//! let read = consumer.read_bulk(&mut out);
//! assert_eq!(&out[..read], &[1, 2, 3, 4, 5, 6, 7, 8]);
//!
//! // Single elements
//! assert!(producer.insert(9));
//! assert_eq!(consumer.peek(), Some(&9));
//! assert_eq!(consumer.pop(), Some(9));
//! ```
//!
//! # Concurrency contract
//!
//! Exactly one producer and one consumer. [`RingBuffer::split`] enforces this
//! through the borrow checker; the `unsafe` [`RingBuffer::producer`] and
//! [`RingBuffer::consumer`] leave it to the caller. No operation blocks or
//! retries internally, with one documented exception: the chunked transfers
//! ([`Producer::write_bulk_chunked`], [`Consumer::read_bulk_chunked`]) keep
//! looping as long as the other side makes progress, so their execution time
//! is unbounded.

mod config;
mod consumer;
mod error;
mod index;
mod invariants;
mod padding;
mod producer;
mod ring;

pub use config::{Config, Custom, DefaultConfig, Unpadded};
pub use consumer::Consumer;
pub use error::{Empty, Full};
pub use index::Index;
pub use padding::{CacheLine, Line128, Line256, Line32, Line64, NativeLine, NoPadding};
pub use producer::Producer;
pub use ring::RingBuffer;

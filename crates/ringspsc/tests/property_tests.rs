//! Property-based tests for the ring invariants.
//!
//! Each test drives a ring with an arbitrary sequence of producer and
//! consumer operations and checks it against a `VecDeque` model:
//!
//! - Bounded occupancy: `0 <= read_available() <= capacity`
//! - Conservation: `read_available() == successful inserts - successful removes`
//! - FIFO: removed values come out in insertion order
//! - Boundary: failed operations leave the state unchanged

use proptest::prelude::*;
use ringspsc_rs::{Custom, NoPadding, RingBuffer};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
enum Op {
    Insert,
    InsertWith,
    WriteBulk(usize),
    Remove,
    RemoveN(usize),
    Pop,
    ReadBulk(usize),
    Peek,
    At(usize),
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => Just(Op::Insert),
        2 => Just(Op::InsertWith),
        3 => (0usize..24).prop_map(Op::WriteBulk),
        2 => Just(Op::Remove),
        2 => (0usize..24).prop_map(Op::RemoveN),
        4 => Just(Op::Pop),
        3 => (0usize..24).prop_map(Op::ReadBulk),
        1 => Just(Op::Peek),
        1 => (0usize..20).prop_map(Op::At),
        1 => Just(Op::Clear),
    ]
}

/// Runs `ops` against a ring with cursor type `u8` (wraps quickly) and the model.
fn run_model(ops: &[Op]) -> Result<(), TestCaseError> {
    const CAP: usize = 16;
    let mut ring: RingBuffer<u32, CAP, Custom<u8, NoPadding>> = RingBuffer::new();
    let (mut producer, mut consumer) = ring.split();
    let mut model: VecDeque<u32> = VecDeque::new();
    let mut next = 0u32;

    for op in ops {
        match *op {
            Op::Insert => {
                let ok = producer.insert(next);
                prop_assert_eq!(ok, model.len() < CAP);
                if ok {
                    model.push_back(next);
                    next += 1;
                }
            }
            Op::InsertWith => {
                let mut called = false;
                let ok = producer.insert_with(|| {
                    called = true;
                    next
                });
                prop_assert_eq!(ok, called, "callback must run exactly when inserting");
                prop_assert_eq!(ok, model.len() < CAP);
                if ok {
                    model.push_back(next);
                    next += 1;
                }
            }
            Op::WriteBulk(len) => {
                let src: Vec<u32> = (next..next + len as u32).collect();
                let written = producer.write_bulk(&src);
                prop_assert_eq!(written, len.min(CAP - model.len()));
                model.extend(&src[..written]);
                next += written as u32;
            }
            Op::Remove => {
                let ok = consumer.remove();
                prop_assert_eq!(ok, model.pop_front().is_some());
            }
            Op::RemoveN(n) => {
                let removed = consumer.remove_n(n);
                prop_assert_eq!(removed, n.min(model.len()));
                model.drain(..removed).for_each(drop);
            }
            Op::Pop => {
                prop_assert_eq!(consumer.pop(), model.pop_front());
            }
            Op::ReadBulk(len) => {
                let mut out = vec![0u32; len];
                let read = consumer.read_bulk(&mut out);
                let expected: Vec<u32> = model.drain(..len.min(model.len())).collect();
                prop_assert_eq!(&out[..read], &expected[..]);
            }
            Op::Peek => {
                prop_assert_eq!(consumer.peek(), model.front());
            }
            Op::At(offset) => {
                prop_assert_eq!(consumer.at(offset), model.get(offset));
            }
            Op::Clear => {
                prop_assert_eq!(consumer.clear(), model.len());
                model.clear();
            }
        }

        // Bounded occupancy and conservation after every step.
        let available = consumer.read_available();
        prop_assert!(available <= CAP, "occupancy {} exceeds capacity {}", available, CAP);
        prop_assert_eq!(available, model.len());
        prop_assert_eq!(producer.write_available(), CAP - model.len());
        prop_assert_eq!(consumer.is_empty(), model.is_empty());
        prop_assert_eq!(producer.is_full(), model.len() == CAP);
    }
    Ok(())
}

proptest! {
    /// Any operation sequence keeps the ring equivalent to a bounded FIFO.
    #[test]
    fn prop_matches_fifo_model(ops in prop::collection::vec(op_strategy(), 1..400)) {
        run_model(&ops)?;
    }
}

proptest! {
    /// Bulk partiality: writing more than fits writes exactly the free space,
    /// and reading it back yields the written prefix.
    #[test]
    fn prop_bulk_partiality(prefill in 0usize..32, extra in 0usize..64) {
        const CAP: usize = 32;
        let mut ring: RingBuffer<u64, CAP> = RingBuffer::new();
        let (mut producer, mut consumer) = ring.split();

        let pre: Vec<u64> = (0..prefill as u64).collect();
        prop_assert_eq!(producer.write_bulk(&pre), prefill);

        let src: Vec<u64> = (1000..1000 + (CAP + extra) as u64).collect();
        let written = producer.write_bulk(&src);
        prop_assert_eq!(written, CAP - prefill);
        prop_assert!(producer.is_full());

        let mut out = vec![0u64; CAP + extra];
        let read = consumer.read_bulk(&mut out);
        prop_assert_eq!(read, CAP);
        prop_assert_eq!(&out[..prefill], &pre[..]);
        prop_assert_eq!(&out[prefill..CAP], &src[..written]);
    }
}

proptest! {
    /// Chunked writes deliver everything in order when the callback drains,
    /// for any chunk size and drain rate.
    #[test]
    fn prop_chunked_write_delivers_all(
        total in 0usize..200,
        chunk in 0usize..12,
        drain in 1usize..9,
    ) {
        let ring: RingBuffer<u32, 8> = RingBuffer::new();
        // SAFETY: exactly one producer and one consumer handle.
        let (mut producer, mut consumer) = unsafe { (ring.producer(), ring.consumer()) };

        let src: Vec<u32> = (0..total as u32).collect();
        let mut received = Vec::new();
        let written = producer.write_bulk_chunked(&src, chunk, || {
            let mut buf = vec![0u32; drain];
            let n = consumer.read_bulk(&mut buf);
            received.extend_from_slice(&buf[..n]);
        });

        // The loop only stops early if a callback freed nothing.
        prop_assert_eq!(written, total);
        while let Some(v) = consumer.pop() {
            received.push(v);
        }
        prop_assert_eq!(received, src);
    }
}

proptest! {
    /// Chunked reads mirror chunked writes.
    #[test]
    fn prop_chunked_read_collects_all(
        total in 0usize..200,
        chunk in 0usize..12,
        refill in 1usize..9,
    ) {
        let ring: RingBuffer<u32, 8> = RingBuffer::new();
        // SAFETY: exactly one producer and one consumer handle.
        let (mut producer, mut consumer) = unsafe { (ring.producer(), ring.consumer()) };

        let src: Vec<u32> = (0..total as u32).collect();
        let mut sent = producer.write_bulk(&src);

        let mut out = vec![0u32; total];
        let read = consumer.read_bulk_chunked(&mut out, chunk, || {
            let end = (sent + refill).min(total);
            sent += producer.write_bulk(&src[sent..end]);
        });

        prop_assert_eq!(read, total);
        prop_assert_eq!(out, src);
    }
}

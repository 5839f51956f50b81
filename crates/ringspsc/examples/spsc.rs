//! SPSC ring buffer examples.
//!
//! Demonstrates the split handles, bulk transfers, chunked transfers larger
//! than the ring, and a `static` ring fed from an interrupt-style context.
//!
//! Run with: RUST_LOG=debug cargo run --release --example spsc

use crossbeam_utils::Backoff;
use ringspsc_rs::{Custom, Line64, RingBuffer, Unpadded};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

const MSG_COUNT: u64 = 10_000_000;

fn main() {
    env_logger::init();

    println!("=== SPSC Ring Buffer Examples ===\n");

    example_basic();
    example_throughput();
    example_chunked();
    example_static_rx();
}

/// Basic usage: split, bulk write, peek, read.
fn example_basic() {
    println!("1. Basic SPSC");
    println!("   ----------");

    let mut ring: RingBuffer<u32, 8> = RingBuffer::new();
    let (mut producer, mut consumer) = ring.split();

    let written = producer.write_bulk(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]);
    println!("   Wrote {written} of 10 items (capacity {})", producer.capacity());

    if let Some(front) = consumer.peek_mut() {
        *front *= 100;
    }
    println!("   Front after peek_mut: {:?}", consumer.peek());

    let mut out = [0u32; 10];
    let read = consumer.read_bulk(&mut out);
    println!("   Read {read}: {:?}", &out[..read]);

    producer.write_bulk(&[0; 8]);
    if let Err(err) = producer.try_insert(11) {
        println!("   try_insert: {err}");
        println!("   Value handed back: {}", err.into_inner());
    }
    println!("   Discarded {} items", consumer.clear());
    println!();
}

/// Two-thread throughput with single-element operations.
fn example_throughput() {
    println!("2. SPSC Throughput");
    println!("   ---------------");

    let mut ring = Box::new(RingBuffer::<u64, 65536>::new());
    let (mut producer, mut consumer) = ring.split();

    let start = Instant::now();
    thread::scope(|s| {
        s.spawn(move || {
            let backoff = Backoff::new();
            for i in 0..MSG_COUNT {
                while !producer.insert(i) {
                    backoff.snooze();
                }
                backoff.reset();
            }
        });

        let mut sum = 0u64;
        let mut count = 0u64;
        let mut buf = [0u64; 1024];
        while count < MSG_COUNT {
            let n = consumer.read_bulk(&mut buf);
            if n == 0 {
                std::hint::spin_loop();
                continue;
            }
            sum += buf[..n].iter().sum::<u64>();
            count += n as u64;
        }
        assert_eq!(sum, MSG_COUNT * (MSG_COUNT - 1) / 2);
    });
    let elapsed = start.elapsed();

    let rate = MSG_COUNT as f64 / elapsed.as_secs_f64() / 1e6;
    println!("   {MSG_COUNT} messages in {elapsed:?} ({rate:.1} M msg/s)");
    println!();
}

/// Chunked transfer of more data than the ring holds, with the consumer
/// draining from the progress callback.
fn example_chunked() {
    println!("3. Chunked Transfer");
    println!("   ----------------");

    let ring: RingBuffer<u8, 16, Custom<u16, Line64>> = RingBuffer::new();
    // SAFETY: one producer and one consumer handle, both used on this thread.
    let (mut producer, mut consumer) = unsafe { (ring.producer(), ring.consumer()) };

    let message: Vec<u8> = b"the quick brown fox jumps over the lazy dog".to_vec();
    let mut received = Vec::new();
    let mut callbacks = 0;

    let written = producer.write_bulk_chunked(&message, 4, || {
        callbacks += 1;
        let mut buf = [0u8; 16];
        let n = consumer.read_bulk(&mut buf);
        received.extend_from_slice(&buf[..n]);
    });

    println!("   Sent {written} bytes through a 16-byte ring in {callbacks} chunks");
    println!("   Received: {:?}", String::from_utf8_lossy(&received));

    // Without a draining callback the transfer stops once the ring is full.
    let written = producer.write_bulk_chunked(&message, 0, || {});
    println!("   Without a consumer: {written} of {} bytes", message.len());
    println!();
}

static UART_RX: RingBuffer<u8, 64, Unpadded> = RingBuffer::new();
static RX_DONE: AtomicBool = AtomicBool::new(false);

/// A `static` receive buffer filled by an "interrupt handler" thread.
fn example_static_rx() {
    println!("4. Static RX Buffer");
    println!("   ----------------");

    let isr = thread::spawn(|| {
        // SAFETY: the handler is the only producer for UART_RX.
        let mut producer = unsafe { UART_RX.producer() };
        let mut bytes = b"hello from the interrupt handler".iter().copied();
        let mut pending = bytes.next();
        while let Some(byte) = pending {
            // The data register is only read when there is room for it.
            if producer.insert_with(|| byte) {
                pending = bytes.next();
            }
        }
        RX_DONE.store(true, Ordering::Release);
    });

    // SAFETY: the main loop is the only consumer for UART_RX.
    let mut consumer = unsafe { UART_RX.consumer() };
    let mut line = Vec::new();
    loop {
        match consumer.pop() {
            Some(byte) => line.push(byte),
            None if RX_DONE.load(Ordering::Acquire) && consumer.is_empty() => break,
            None => thread::yield_now(),
        }
    }
    isr.join().expect("interrupt thread panicked");

    println!("   Main loop received: {:?}", String::from_utf8_lossy(&line));
    println!();
}

//! Fixed-capacity circular byte buffer
//!
//! A power-of-two ring with single-producer/single-consumer semantics. The
//! producer owns the write index, the consumer owns the read index, and the
//! occupancy count is the only field both sides touch. Every
//! read-modify-write of the count runs inside a critical section covering a
//! single byte, so interrupt latency stays O(1) no matter how many bytes a
//! call moves.
//!
//! ```text
//!          read_index            write_index
//!              │                     │
//!              ▼                     ▼
//! ┌───┬───┬───┬───┬───┬───┬───┬───┬───┬───┐
//! │   │   │   │ a │ b │ c │ d │ e │   │   │   count = 5
//! └───┴───┴───┴───┴───┴───┴───┴───┴───┴───┘
//! ```

use core::cell::UnsafeCell;
use core::fmt;
use core::sync::atomic::{AtomicUsize, Ordering};

/// Fixed-capacity byte FIFO shared between two execution contexts
///
/// `N` must be a non-zero power of two; other capacities fail to compile
/// when the buffer is constructed. Used directly (`&mut self` methods) the
/// buffer behaves like any single-owner queue. For cross-context use,
/// [`split`](Self::split) it into a [`Producer`] and a [`Consumer`].
pub struct CircularByteBuffer<const N: usize> {
    storage: UnsafeCell<[u8; N]>,
    /// Next free slot, owned by the producer
    write_index: UnsafeCell<usize>,
    /// Oldest occupied slot, owned by the consumer
    read_index: UnsafeCell<usize>,
    /// Number of occupied slots, shared
    count: AtomicUsize,
}

// SAFETY: The only `&self` paths that mutate are reachable through
// `Producer` and `Consumer`, and `split` hands out exactly one of each.
// The producer writes `write_index` and the free slots, the consumer writes
// `read_index` and the occupied slots, and the shared `count` is an atomic
// updated under a critical section.
unsafe impl<const N: usize> Sync for CircularByteBuffer<N> {}

impl<const N: usize> Default for CircularByteBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> CircularByteBuffer<N> {
    const MASK: usize = {
        assert!(N.is_power_of_two(), "buffer capacity must be a power of two");
        N - 1
    };

    /// Create an empty, zeroed buffer
    pub const fn new() -> Self {
        let _ = Self::MASK;
        Self {
            storage: UnsafeCell::new([0; N]),
            write_index: UnsafeCell::new(0),
            read_index: UnsafeCell::new(0),
            count: AtomicUsize::new(0),
        }
    }

    /// Zero the storage and reset indices and count
    pub fn init(&mut self) {
        *self.storage.get_mut() = [0; N];
        *self.write_index.get_mut() = 0;
        *self.read_index.get_mut() = 0;
        *self.count.get_mut() = 0;
    }

    /// Number of bytes currently stored
    ///
    /// A single word read; safe to call from either context.
    #[inline]
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// Total capacity in bytes
    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Check if no bytes are stored
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if every slot is occupied
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    /// Insert as many bytes of `data` as fit
    ///
    /// Returns the number of bytes accepted, from 0 to `data.len()`.
    pub fn enqueue(&mut self, data: &[u8]) -> usize {
        // SAFETY: `&mut self` rules out any other producer or consumer.
        unsafe { self.produce(data) }
    }

    /// Remove up to `dest.len()` bytes into `dest`
    ///
    /// Returns the number of bytes removed, 0 when the buffer is empty.
    pub fn dequeue(&mut self, dest: &mut [u8]) -> usize {
        // SAFETY: `&mut self` rules out any other producer or consumer.
        unsafe { self.consume(dest) }
    }

    /// Split into producer and consumer endpoints
    ///
    /// The endpoints may live in different execution contexts (a thread
    /// and an interrupt handler, or two threads). The mutable borrow
    /// guarantees there is only ever one of each.
    pub fn split(&mut self) -> (Producer<'_, N>, Consumer<'_, N>) {
        let buffer = &*self;
        (Producer { buffer }, Consumer { buffer })
    }

    /// # Safety
    ///
    /// Only one caller may act as producer at a time.
    unsafe fn produce(&self, data: &[u8]) -> usize {
        let mut accepted = 0;

        for &byte in data {
            if self.count.load(Ordering::Acquire) == N {
                break;
            }

            // SAFETY: The producer is the only writer of `write_index`, and
            // the slot it names is free, so the consumer never reads it
            // until the count increment below publishes it.
            unsafe {
                let index = *self.write_index.get();
                self.slot(index).write(byte);
                *self.write_index.get() = (index + 1) & Self::MASK;
            }

            critical_section::with(|_| {
                let count = self.count.load(Ordering::Relaxed);
                self.count.store(count + 1, Ordering::Release);
            });
            accepted += 1;
        }

        accepted
    }

    /// # Safety
    ///
    /// Only one caller may act as consumer at a time.
    unsafe fn consume(&self, dest: &mut [u8]) -> usize {
        let mut removed = 0;

        for out in dest.iter_mut() {
            if self.count.load(Ordering::Acquire) == 0 {
                break;
            }

            // SAFETY: The consumer is the only writer of `read_index`, and
            // the slot it names is occupied, so the producer never writes
            // it until the count decrement below releases it.
            unsafe {
                let index = *self.read_index.get();
                let slot = self.slot(index);
                *out = slot.read();
                slot.write(0);
                *self.read_index.get() = (index + 1) & Self::MASK;
            }

            critical_section::with(|_| {
                let count = self.count.load(Ordering::Relaxed);
                self.count.store(count - 1, Ordering::Release);
            });
            removed += 1;
        }

        removed
    }

    /// Raw pointer to one storage slot
    ///
    /// Never forms a reference to the whole array, since the other context
    /// may be touching a different slot at the same time.
    #[inline]
    fn slot(&self, index: usize) -> *mut u8 {
        // SAFETY: `index` is always masked into `0..N`.
        unsafe { self.storage.get().cast::<u8>().add(index & Self::MASK) }
    }
}

impl<const N: usize> fmt::Debug for CircularByteBuffer<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircularByteBuffer")
            .field("len", &self.len())
            .field("capacity", &N)
            .finish()
    }
}

/// Writing endpoint of a split [`CircularByteBuffer`]
pub struct Producer<'a, const N: usize> {
    buffer: &'a CircularByteBuffer<N>,
}

impl<const N: usize> Producer<'_, N> {
    /// Insert as many bytes of `data` as fit, returning the count accepted
    pub fn enqueue(&mut self, data: &[u8]) -> usize {
        // SAFETY: `split` creates exactly one producer per buffer borrow.
        unsafe { self.buffer.produce(data) }
    }

    /// Insert one byte, returning `false` when the buffer is full
    pub fn enqueue_byte(&mut self, byte: u8) -> bool {
        self.enqueue(&[byte]) == 1
    }

    /// Number of bytes currently stored
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Total capacity in bytes
    pub fn capacity(&self) -> usize {
        N
    }

    /// Check if no bytes are stored
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Check if every slot is occupied
    pub fn is_full(&self) -> bool {
        self.buffer.is_full()
    }
}

/// Reading endpoint of a split [`CircularByteBuffer`]
pub struct Consumer<'a, const N: usize> {
    buffer: &'a CircularByteBuffer<N>,
}

impl<const N: usize> Consumer<'_, N> {
    /// Remove up to `dest.len()` bytes, returning the count removed
    pub fn dequeue(&mut self, dest: &mut [u8]) -> usize {
        // SAFETY: `split` creates exactly one consumer per buffer borrow.
        unsafe { self.buffer.consume(dest) }
    }

    /// Remove the oldest byte, if any
    pub fn dequeue_byte(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.dequeue(&mut byte) {
            1 => Some(byte[0]),
            _ => None,
        }
    }

    /// Number of bytes currently stored
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Total capacity in bytes
    pub fn capacity(&self) -> usize {
        N
    }

    /// Check if no bytes are stored
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Check if every slot is occupied
    pub fn is_full(&self) -> bool {
        self.buffer.is_full()
    }
}

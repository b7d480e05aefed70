//! Lock-free pool of reusable packet buffers
//!
//! One datagram is read into one pooled `BytesMut`, keeping the receive
//! loop free of per-packet allocations. Buffers come out of the pool at
//! full length so the kernel can write into them directly; only the
//! received prefix is ever read back.

use bytes::BytesMut;
use crossbeam::queue::ArrayQueue;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free pool of fixed-size packet buffers
#[derive(Debug)]
pub struct PacketBufferPool {
    /// Lock-free queue of available buffers
    queue: ArrayQueue<BytesMut>,

    /// Length of each buffer (one maximum-size datagram)
    buffer_size: usize,

    /// Metrics
    metrics: PoolMetrics,
}

/// Pool activity counters
#[derive(Debug, Default)]
pub struct PoolMetrics {
    /// Buffer reused from the pool
    pub hits: AtomicU64,

    /// Pool was empty, a fresh buffer was allocated
    pub misses: AtomicU64,

    /// Buffer returned to the pool
    pub returns: AtomicU64,

    /// Buffer dropped (pool full or wrong size)
    pub drops: AtomicU64,
}

/// Point-in-time snapshot of pool counters
#[derive(Debug, Clone, Copy, Default)]
pub struct PoolSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub returns: u64,
    pub drops: u64,
}

impl PacketBufferPool {
    /// Create a pool of `pool_size` buffers of `buffer_size` bytes each
    ///
    /// All buffers are pre-allocated up front.
    pub fn new(pool_size: usize, buffer_size: usize) -> Self {
        let queue = ArrayQueue::new(pool_size);

        for _ in 0..pool_size {
            let mut buf = BytesMut::with_capacity(buffer_size);
            buf.resize(buffer_size, 0);
            // Filling an empty queue never fails
            let _ = queue.push(buf);
        }

        Self {
            queue,
            buffer_size,
            metrics: PoolMetrics::default(),
        }
    }

    /// Take a full-length buffer from the pool
    ///
    /// Falls back to a fresh allocation when the pool is empty; the new
    /// buffer joins the pool on the next [`put`](Self::put).
    #[inline]
    pub fn get(&self) -> BytesMut {
        match self.queue.pop() {
            Some(buf) => {
                self.metrics.hits.fetch_add(1, Ordering::Relaxed);
                buf
            }
            None => {
                self.metrics.misses.fetch_add(1, Ordering::Relaxed);
                let mut buf = BytesMut::with_capacity(self.buffer_size);
                buf.resize(self.buffer_size, 0);
                buf
            }
        }
    }

    /// Return a buffer to the pool
    ///
    /// A buffer that shrank or a full pool drops the buffer instead.
    #[inline]
    pub fn put(&self, buf: BytesMut) {
        if buf.len() != self.buffer_size || self.queue.push(buf).is_err() {
            self.metrics.drops.fetch_add(1, Ordering::Relaxed);
            return;
        }

        self.metrics.returns.fetch_add(1, Ordering::Relaxed);
    }

    /// Number of buffers currently available
    #[inline]
    pub fn available(&self) -> usize {
        self.queue.len()
    }

    /// Length of each buffer
    #[inline]
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Snapshot of the pool counters
    pub fn snapshot(&self) -> PoolSnapshot {
        PoolSnapshot {
            hits: self.metrics.hits.load(Ordering::Relaxed),
            misses: self.metrics.misses.load(Ordering::Relaxed),
            returns: self.metrics.returns.load(Ordering::Relaxed),
            drops: self.metrics.drops.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
#[path = "pool_test.rs"]
mod pool_test;

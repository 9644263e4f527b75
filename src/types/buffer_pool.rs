// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Lock-free scratch-buffer pool for record reuse.
//!
//! Each record read from a bag borrows one growable scratch buffer for its
//! lifetime. Returning the buffer on record close (or drop) makes the
//! amortized allocation cost per record O(1): the pool hands the same
//! capacity back to the next record instead of reallocating.

use crossbeam_queue::ArrayQueue;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Default scratch capacity (64 KiB covers typical record sizes).
const DEFAULT_BUFFER_CAPACITY: usize = 64 * 1024;

/// Maximum number of buffers retained by the pool.
const MAX_POOL_SIZE: usize = 8;

/// A pooled scratch buffer that returns itself to the pool when dropped.
pub struct PooledBuffer {
    /// The buffer data
    data: Vec<u8>,
    /// Pool to return to on drop
    pool: Arc<BufferPoolInner>,
}

impl PooledBuffer {
    /// Get a mutable reference to the buffer data.
    #[inline]
    pub fn as_mut_vec(&mut self) -> &mut Vec<u8> {
        &mut self.data
    }

    /// Get the length of the buffer.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the buffer is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the capacity of the buffer.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Clear the buffer, keeping its capacity.
    #[inline]
    pub fn clear(&mut self) {
        self.data.clear();
    }
}

impl Drop for PooledBuffer {
    #[inline]
    fn drop(&mut self) {
        let data = std::mem::take(&mut self.data);
        self.pool.return_buffer(data);
    }
}

impl AsRef<[u8]> for PooledBuffer {
    #[inline]
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl std::ops::Deref for PooledBuffer {
    type Target = [u8];

    #[inline]
    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl std::fmt::Debug for PooledBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledBuffer")
            .field("len", &self.data.len())
            .field("capacity", &self.data.capacity())
            .finish()
    }
}

/// Inner pool state (shared via Arc).
#[derive(Debug)]
struct BufferPoolInner {
    /// Lock-free queue of available buffers
    queue: ArrayQueue<Vec<u8>>,
    /// Default capacity for new allocations
    default_capacity: usize,
    /// Total number of fresh allocations (for metrics)
    total_allocations: AtomicUsize,
    /// Current pool size (for metrics)
    pool_size: AtomicUsize,
}

impl BufferPoolInner {
    /// Return a buffer to the pool; dropped silently when the pool is full.
    #[inline]
    fn return_buffer(&self, mut buffer: Vec<u8>) {
        buffer.clear();
        if self.queue.push(buffer).is_ok() {
            self.pool_size.fetch_add(1, Ordering::Release);
        }
    }

    /// Take a buffer from the pool, or allocate a new one.
    #[inline]
    fn take_buffer(&self, min_capacity: usize) -> Vec<u8> {
        if let Some(mut buf) = self.queue.pop() {
            self.pool_size.fetch_sub(1, Ordering::Acquire);
            if buf.capacity() < min_capacity {
                buf.reserve(min_capacity - buf.capacity());
            }
            return buf;
        }

        self.total_allocations.fetch_add(1, Ordering::Release);
        Vec::with_capacity(min_capacity.max(self.default_capacity))
    }
}

/// Lock-free pool of record scratch buffers.
///
/// Cloning the pool shares the same buffer queue; one decoder instance owns
/// one pool and every record it produces draws from it.
#[derive(Clone, Debug)]
pub struct BufferPool {
    inner: Arc<BufferPoolInner>,
}

impl BufferPool {
    /// Create a new pool with the specified default buffer capacity.
    pub fn with_capacity(default_capacity: usize) -> Self {
        Self {
            inner: Arc::new(BufferPoolInner {
                queue: ArrayQueue::new(MAX_POOL_SIZE),
                default_capacity,
                total_allocations: AtomicUsize::new(0),
                pool_size: AtomicUsize::new(0),
            }),
        }
    }

    /// Create a pool with the default 64 KiB capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    /// Get an empty buffer with at least the specified capacity.
    ///
    /// The buffer is automatically returned to the pool when dropped.
    #[inline]
    pub fn acquire(&self, min_capacity: usize) -> PooledBuffer {
        let data = self.inner.take_buffer(min_capacity);
        PooledBuffer {
            data,
            pool: Arc::clone(&self.inner),
        }
    }

    /// Get the current number of buffers resting in the pool.
    #[inline]
    pub fn pool_size(&self) -> usize {
        self.inner.pool_size.load(Ordering::Acquire)
    }

    /// Get the total number of fresh allocations (excluding reuses).
    #[inline]
    pub fn total_allocations(&self) -> usize {
        self.inner.total_allocations.load(Ordering::Acquire)
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

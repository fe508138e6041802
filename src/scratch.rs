//! Scratch buffer pool
//!
//! Intermediate polar buffers are checked out for one filter invocation and
//! handed back afterwards, so repeated renders reuse allocations without any
//! shared global canvas.

use crate::display::PixelBuffer;

/// Pool of reusable pixel buffers
#[derive(Debug)]
pub struct ScratchPool {
    free: Vec<PixelBuffer>,
    capacity: usize,
}

impl ScratchPool {
    /// Pool that keeps at most `capacity` idle buffers
    pub fn new(capacity: usize) -> Self {
        Self {
            free: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Take a buffer of exactly `width` x `height`. Reuses an idle buffer of
    /// that size when one exists; contents of a reused buffer are stale.
    pub fn checkout(&mut self, width: u32, height: u32) -> PixelBuffer {
        match self
            .free
            .iter()
            .position(|b| b.width() == width && b.height() == height)
        {
            Some(idx) => self.free.swap_remove(idx),
            None => PixelBuffer::with_size(width, height),
        }
    }

    /// Return a buffer for later reuse. When the pool is full the oldest idle
    /// buffer is dropped.
    pub fn give_back(&mut self, buffer: PixelBuffer) {
        if self.capacity == 0 {
            return;
        }
        if self.free.len() >= self.capacity {
            self.free.remove(0);
        }
        self.free.push(buffer);
    }

    /// Number of idle buffers
    pub fn idle(&self) -> usize {
        self.free.len()
    }

    /// Drop every idle buffer
    pub fn clear(&mut self) {
        self.free.clear();
    }
}

impl Default for ScratchPool {
    fn default() -> Self {
        Self::new(2)
    }
}

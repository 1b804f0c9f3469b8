//! Uniform buffer sub-allocation
//!
//! Uniform data is written into fixed-size sub-buffers carved out of larger
//! chunk buffers. Each sub-buffer size is rounded up to the device's offset
//! alignment. When every sub-buffer of every chunk is taken, a new chunk is
//! created.

use super::device::{BufferId, GraphicsDevice};
use super::{RenderError, RenderResult};

/// A sub-buffer: a range of a chunk buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UboRegion {
    /// Chunk buffer
    pub buffer: BufferId,
    /// Byte offset inside the chunk
    pub offset: u32,
    /// Usable size in bytes
    pub size: u32,
}

#[derive(Debug)]
struct Chunk {
    buffer: BufferId,
    free: Vec<u32>,
}

/// Pool of equally sized sub-buffers
#[derive(Debug)]
pub struct BufferPool {
    sub_buffer_size: u32,
    aligned_size: u32,
    chunk_len: u32,
    chunks: Vec<Chunk>,
}

fn align_up(size: u32, alignment: u32) -> u32 {
    let alignment = alignment.max(1);
    size.div_ceil(alignment).saturating_mul(alignment)
}

impl BufferPool {
    /// Pool of `sub_buffer_size` byte regions, `chunk_len` per chunk
    pub fn new(sub_buffer_size: u32, chunk_len: u32, alignment: u32) -> Self {
        Self {
            sub_buffer_size,
            aligned_size: align_up(sub_buffer_size, alignment),
            chunk_len: chunk_len.max(1),
            chunks: Vec::new(),
        }
    }

    /// Stride between regions of a chunk
    pub fn aligned_size(&self) -> u32 {
        self.aligned_size
    }

    /// Number of chunk buffers
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Take a free region, creating a chunk when needed
    pub fn allocate<D: GraphicsDevice + ?Sized>(&mut self, device: &mut D) -> RenderResult<UboRegion> {
        if let Some(chunk) = self.chunks.iter_mut().find(|c| !c.free.is_empty()) {
            if let Some(offset) = chunk.free.pop() {
                return Ok(UboRegion {
                    buffer: chunk.buffer,
                    offset,
                    size: self.sub_buffer_size,
                });
            }
        }

        let chunk_size = self.aligned_size.checked_mul(self.chunk_len).ok_or_else(|| {
            RenderError::ResourceCreationFailed(format!(
                "uniform chunk of {} x {} bytes exceeds the addressable size",
                self.chunk_len, self.aligned_size
            ))
        })?;
        let buffer = device.create_uniform_buffer(chunk_size)?;
        log::debug!(
            "Buffer pool chunk {} created ({} x {} bytes)",
            self.chunks.len(),
            self.chunk_len,
            self.aligned_size
        );
        // lowest offsets are handed out first
        let free = (1..self.chunk_len).rev().map(|i| i * self.aligned_size).collect();
        self.chunks.push(Chunk { buffer, free });
        Ok(UboRegion {
            buffer,
            offset: 0,
            size: self.sub_buffer_size,
        })
    }

    /// Whether the region was handed out by this pool
    pub fn owns(&self, region: &UboRegion) -> bool {
        self.chunks.iter().any(|c| c.buffer == region.buffer)
    }

    /// Return a region to its chunk
    pub fn free(&mut self, region: UboRegion) {
        match self.chunks.iter_mut().find(|c| c.buffer == region.buffer) {
            Some(chunk) if !chunk.free.contains(&region.offset) => chunk.free.push(region.offset),
            Some(_) => log::warn!("Buffer pool region {region:?} freed twice"),
            None => log::warn!("Buffer pool region {region:?} does not belong to this pool"),
        }
    }

    /// Return every region; chunks are kept
    pub fn free_all(&mut self) {
        let (len, stride) = (self.chunk_len, self.aligned_size);
        for chunk in &mut self.chunks {
            chunk.free.clear();
            chunk.free.extend((0..len).rev().map(|i| i * stride));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::headless::{DeviceCommand, HeadlessDevice};

    #[test]
    fn test_alignment() {
        assert_eq!(align_up(80, 256), 256);
        assert_eq!(align_up(256, 256), 256);
        assert_eq!(align_up(257, 256), 512);
        assert_eq!(BufferPool::new(80, 4, 64).aligned_size(), 128);
    }

    #[test]
    fn test_regions_are_distinct_and_chunked() {
        let mut device = HeadlessDevice::new(8, 8);
        let mut pool = BufferPool::new(100, 2, 256);
        let a = pool.allocate(&mut device).unwrap();
        let b = pool.allocate(&mut device).unwrap();
        assert_eq!(a.buffer, b.buffer);
        assert_eq!((a.offset, b.offset), (0, 256));
        assert_eq!(a.size, 100);

        let c = pool.allocate(&mut device).unwrap();
        assert_ne!(c.buffer, a.buffer);
        assert_eq!(pool.chunk_count(), 2);
        assert!(device
            .commands()
            .iter()
            .all(|cmd| matches!(cmd, DeviceCommand::CreateBuffer(_, 512))));
    }

    #[test]
    fn test_free_reuses_region() {
        let mut device = HeadlessDevice::new(8, 8);
        let mut pool = BufferPool::new(64, 2, 64);
        let a = pool.allocate(&mut device).unwrap();
        let _b = pool.allocate(&mut device).unwrap();
        pool.free(a);
        assert_eq!(pool.allocate(&mut device).unwrap(), a);
        assert_eq!(pool.chunk_count(), 1);

        pool.free_all();
        let first = pool.allocate(&mut device).unwrap();
        assert_eq!(first.offset, 0);
        assert_eq!(pool.chunk_count(), 1);
    }

    #[test]
    fn test_oversized_chunk_is_an_error() {
        let mut device = HeadlessDevice::new(8, 8);
        let mut pool = BufferPool::new(u32::MAX / 2, 4, 256);
        assert!(matches!(
            pool.allocate(&mut device),
            Err(RenderError::ResourceCreationFailed(_))
        ));
        assert_eq!(pool.chunk_count(), 0);
        assert!(device.commands().is_empty());

        // saturated sub-buffer size
        let mut pool = BufferPool::new(u32::MAX, 2, 256);
        assert!(pool.allocate(&mut device).is_err());
    }
}

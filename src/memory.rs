//! Backing store interface.
//!
//! The cache never owns real memory contents; on a miss it asks a [`Memory`]
//! for one whole block. [`VecMemory`] is a flat in-process store used by the
//! tests and benchmarks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;

/// A byte-addressable, read-only backing store.
pub trait Memory {
    /// Error signalled by a failed read. Propagated unchanged through the cache.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fill `buf` with the bytes at `[address, address + buf.len())`.
    fn read(&self, address: u64, buf: &mut [u8]) -> Result<(), Self::Error>;
}

impl<M: Memory + ?Sized> Memory for &M {
    type Error = M::Error;

    fn read(&self, address: u64, buf: &mut [u8]) -> Result<(), Self::Error> {
        (**self).read(address, buf)
    }
}

impl<M: Memory + ?Sized> Memory for Box<M> {
    type Error = M::Error;

    fn read(&self, address: u64, buf: &mut [u8]) -> Result<(), Self::Error> {
        (**self).read(address, buf)
    }
}

impl<M: Memory + ?Sized> Memory for Arc<M> {
    type Error = M::Error;

    fn read(&self, address: u64, buf: &mut [u8]) -> Result<(), Self::Error> {
        (**self).read(address, buf)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoryError {
    #[error("Read of {len} bytes at {address:#x} exceeds memory size {size}")]
    OutOfRange { address: u64, len: usize, size: usize },
}

/// Read accounting for [`VecMemory`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    pub reads: u64,
    pub bytes_read: u64,
}

/// Flat byte vector acting as main memory.
#[derive(Debug, Default)]
pub struct VecMemory {
    data: Vec<u8>,
    reads: AtomicU64,
    bytes_read: AtomicU64,
}

impl VecMemory {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            reads: AtomicU64::new(0),
            bytes_read: AtomicU64::new(0),
        }
    }

    /// Memory of `len` bytes where each byte holds its own address, truncated to `u8`.
    pub fn with_pattern(len: usize) -> Self {
        Self::new((0..len).map(|i| i as u8).collect())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Direct, uncounted view of the contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn stats(&self) -> MemoryStats {
        MemoryStats {
            reads: self.reads.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
        }
    }
}

impl Memory for VecMemory {
    type Error = MemoryError;

    fn read(&self, address: u64, buf: &mut [u8]) -> Result<(), MemoryError> {
        let out_of_range = || MemoryError::OutOfRange {
            address,
            len: buf.len(),
            size: self.data.len(),
        };
        let start = usize::try_from(address).map_err(|_| out_of_range())?;
        let end = start.checked_add(buf.len()).ok_or_else(out_of_range)?;
        let src = self.data.get(start..end).ok_or_else(out_of_range)?;
        buf.copy_from_slice(src);

        self.reads.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(buf.len() as u64, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_read() {
        let mem = VecMemory::with_pattern(300);
        let mut buf = [0u8; 4];
        mem.read(256, &mut buf).unwrap();
        assert_eq!(buf, [0, 1, 2, 3]);
        assert_eq!(
            mem.stats(),
            MemoryStats {
                reads: 1,
                bytes_read: 4
            }
        );
    }

    #[test]
    fn test_out_of_range() {
        let mem = VecMemory::with_pattern(16);
        let mut buf = [0u8; 4];
        let err = mem.read(14, &mut buf).unwrap_err();
        assert_eq!(
            err,
            MemoryError::OutOfRange {
                address: 14,
                len: 4,
                size: 16
            }
        );
        // Failed reads are not counted.
        assert_eq!(mem.stats().reads, 0);
    }

    #[test]
    fn test_read_through_reference() {
        let mem = VecMemory::with_pattern(8);
        let by_ref = &mem;
        let mut buf = [0u8; 2];
        by_ref.read(6, &mut buf).unwrap();
        assert_eq!(buf, [6, 7]);
        assert_eq!(mem.stats().reads, 1);
    }
}

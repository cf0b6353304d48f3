//! Read-only block cache.
//!
//! This module contains the cache data structures and algorithms:
//! - [`geometry`]: address decomposition into tag, index and offset
//! - [`slot`]: per-slot block storage, valid bit and tag
//! - [`evictor`]: placement and the fixed-slot replacement rule
//! - [`controller`]: the [`Cache`] itself, its lookup-or-fill path and statistics

pub mod controller;
pub mod evictor;
pub mod geometry;
pub mod slot;

pub use controller::{
    new_shared_cache, Access, AccessKind, Cache, CacheStats, SharedCache, SlotView,
};

/// A cache that can only be read through.
pub trait ReadOnlyCache {
    type Error;

    /// Return the byte stored at `address`.
    fn load(&mut self, address: u64) -> Result<u8, Self::Error>;
}

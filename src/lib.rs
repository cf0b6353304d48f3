//! block-cache-sim: a read-only block cache simulator.
//!
//! Models a hardware cache between a caller and a byte-addressable backing
//! store. Direct-mapped, fully-associative and set-associative geometries are
//! supported; each load reports whether it hit, filled a free slot or evicted
//! a resident block.
//!
//! ```
//! use block_cache_sim::cache::Cache;
//! use block_cache_sim::config::CacheConfig;
//! use block_cache_sim::memory::VecMemory;
//!
//! let memory = VecMemory::with_pattern(16);
//! let mut cache = Cache::new(&memory, CacheConfig::direct_mapped(2, 4)).unwrap();
//! assert_eq!(cache.load(9).unwrap(), 9);
//! assert!(cache.contains(10));
//! ```

pub mod cache;
pub mod config;
pub mod memory;

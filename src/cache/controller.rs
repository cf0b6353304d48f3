//! Cache controller: lookup-or-fill over a backing [`Memory`].
//!
//! The controller is the only owner of slot state. Every load:
//! - Splits the address into tag, index and offset
//! - Looks for a valid slot carrying the tag (one slot, or all of them when
//!   fully associative)
//! - On a miss, reads the whole containing block from memory and installs it
//!   in the slot picked by the [`Evictor`]
//!
//! Set-associative caches currently behave exactly like direct-mapped ones:
//! a block has a single candidate slot (its index), and the associativity
//! only distinguishes the mode. Ways within a set are never searched.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, trace};

use crate::cache::evictor::{Evictor, Victim};
use crate::cache::geometry::{AddressParts, Geometry};
use crate::cache::slot::Slot;
use crate::cache::ReadOnlyCache;
use crate::config::{Associativity, CacheConfig, ConfigError};
use crate::memory::Memory;

/// Hit/miss accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Successful loads.
    pub loads: u64,
    pub hits: u64,
    /// Misses, `fills + evictions`.
    pub misses: u64,
    /// Misses installed into a previously invalid slot.
    pub fills: u64,
    /// Misses that replaced a valid block.
    pub evictions: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        if self.loads == 0 {
            return 1.0;
        }
        self.hits as f64 / self.loads as f64
    }

    pub fn miss_rate(&self) -> f64 {
        if self.loads == 0 {
            return 0.0;
        }
        self.misses as f64 / self.loads as f64
    }
}

/// How a load was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Hit,
    /// Miss placed in an invalid slot.
    Fill,
    /// Miss that replaced the block tagged `evicted_tag`.
    Eviction { evicted_tag: u64 },
}

/// Result of a single load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Access {
    pub value: u8,
    /// Slot that served the load.
    pub slot: usize,
    pub kind: AccessKind,
}

impl Access {
    pub fn is_hit(&self) -> bool {
        self.kind == AccessKind::Hit
    }
}

/// Read-only view of a valid slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotView<'a> {
    pub index: usize,
    pub tag: u64,
    /// Backing store address of the block, rebuilt from `(tag, index)`.
    pub block_address: u64,
    pub data: &'a [u8],
}

/// A read-only block cache in front of `M`.
#[derive(Debug)]
pub struct Cache<M> {
    memory: M,
    config: CacheConfig,
    geometry: Geometry,
    slots: Vec<Slot>,
    evictor: Evictor,
    /// Block buffer for the next fill. Swapped with the victim's buffer on install.
    scratch: Box<[u8]>,
    stats: CacheStats,
}

impl<M: Memory> Cache<M> {
    /// Create a cache with every slot invalid.
    pub fn new(memory: M, config: CacheConfig) -> Result<Self, ConfigError> {
        let geometry = Geometry::new(&config)?;
        let slots = (0..config.block_count)
            .map(|_| Slot::new(config.bytes_per_block))
            .collect();

        info!(
            block_count = config.block_count,
            bytes_per_block = config.bytes_per_block,
            associativity = config.associativity,
            mode = %geometry.mode(),
            "Cache initialized"
        );

        Ok(Self {
            memory,
            evictor: Evictor::new(config.block_count),
            scratch: vec![0u8; config.bytes_per_block].into_boxed_slice(),
            config,
            geometry,
            slots,
            stats: CacheStats::default(),
        })
    }

    /// Return the byte at `address`, filling from memory on a miss.
    pub fn load(&mut self, address: u64) -> Result<u8, M::Error> {
        self.access(address).map(|access| access.value)
    }

    /// Like [`Cache::load`], but also reports which slot served the load and how.
    ///
    /// A failed memory read leaves the cache untouched.
    pub fn access(&mut self, address: u64) -> Result<Access, M::Error> {
        let parts = self.geometry.decompose(address);

        if let Some(slot) = self.lookup(&parts) {
            self.stats.loads += 1;
            self.stats.hits += 1;
            trace!(address, slot, tag = parts.tag, "Cache hit");
            return Ok(Access {
                value: self.slots[slot].byte(parts.offset),
                slot,
                kind: AccessKind::Hit,
            });
        }

        let victim = match self.geometry.mode() {
            Associativity::FullyAssociative => self.evictor.select_any(&self.slots),
            Associativity::DirectMapped | Associativity::SetAssociative { .. } => {
                self.evictor.select_indexed(&self.slots, parts.index)
            }
        };

        self.memory.read(parts.block_address, &mut self.scratch)?;

        let slot = victim.slot();
        let evicted = self.slots[slot].install(parts.tag, &mut self.scratch);

        self.stats.loads += 1;
        self.stats.misses += 1;
        let kind = match (victim, evicted) {
            (Victim::Occupied(_), Some(evicted_tag)) => {
                self.stats.evictions += 1;
                debug!(
                    address,
                    slot,
                    tag = parts.tag,
                    evicted_tag,
                    block_address = parts.block_address,
                    "Evicted block"
                );
                AccessKind::Eviction { evicted_tag }
            }
            _ => {
                self.stats.fills += 1;
                debug!(
                    address,
                    slot,
                    tag = parts.tag,
                    block_address = parts.block_address,
                    "Filled free slot"
                );
                AccessKind::Fill
            }
        };

        Ok(Access {
            value: self.slots[slot].byte(parts.offset),
            slot,
            kind,
        })
    }
}

impl<M> Cache<M> {
    /// Slot holding the block for `parts`, if resident.
    fn lookup(&self, parts: &AddressParts) -> Option<usize> {
        match self.geometry.mode() {
            Associativity::FullyAssociative => {
                self.slots.iter().position(|slot| slot.matches(parts.tag))
            }
            Associativity::DirectMapped | Associativity::SetAssociative { .. } => self.slots
                [parts.index]
                .matches(parts.tag)
                .then_some(parts.index),
        }
    }

    /// Whether `address` would hit. No state changes and no memory access.
    pub fn contains(&self, address: u64) -> bool {
        self.lookup(&self.geometry.decompose(address)).is_some()
    }

    pub fn offset(&self, address: u64) -> usize {
        self.geometry.offset(address)
    }

    pub fn index(&self, address: u64) -> usize {
        self.geometry.index(address)
    }

    pub fn tag(&self, address: u64) -> u64 {
        self.geometry.tag(address)
    }

    pub fn block_address(&self, address: u64) -> u64 {
        self.geometry.block_address(address)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Consume the cache, returning the backing memory.
    pub fn into_memory(self) -> M {
        self.memory
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = CacheStats::default();
    }

    /// Raw slot by position.
    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// Valid slots in slot order.
    pub fn slots(&self) -> impl Iterator<Item = SlotView<'_>> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.tag().map(|tag| SlotView {
                index,
                tag,
                block_address: self.geometry.base_address(tag, index),
                data: slot.data(),
            })
        })
    }

    /// Number of valid slots.
    pub fn occupancy(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_valid()).count()
    }
}

impl<M: Memory> ReadOnlyCache for Cache<M> {
    type Error = M::Error;

    fn load(&mut self, address: u64) -> Result<u8, Self::Error> {
        self.access(address).map(|access| access.value)
    }
}

/// A cache behind a single lock, for callers that share it across threads.
pub type SharedCache<M> = Arc<Mutex<Cache<M>>>;

/// Create a new lock-guarded cache.
pub fn new_shared_cache<M: Memory>(
    memory: M,
    config: CacheConfig,
) -> Result<SharedCache<M>, ConfigError> {
    Ok(Arc::new(Mutex::new(Cache::new(memory, config)?)))
}

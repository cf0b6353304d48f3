//! Placement and replacement: decides which slot receives a missed block.
//!
//! - Direct-mapped and set-associative caches place a block in the slot its
//!   index names, replacing whatever lives there.
//! - Fully-associative caches take the first invalid slot in slot order and,
//!   once every slot is valid, always replace the last slot. No recency or
//!   frequency is tracked.

use crate::cache::slot::Slot;

/// The slot chosen for a miss fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Victim {
    /// An invalid slot; nothing is evicted.
    Free(usize),
    /// A valid slot whose block will be replaced.
    Occupied(usize),
}

impl Victim {
    pub fn slot(&self) -> usize {
        match *self {
            Victim::Free(slot) | Victim::Occupied(slot) => slot,
        }
    }

    pub fn evicts(&self) -> bool {
        matches!(self, Victim::Occupied(_))
    }

    fn classify(slots: &[Slot], slot: usize) -> Self {
        if slots[slot].is_valid() {
            Victim::Occupied(slot)
        } else {
            Victim::Free(slot)
        }
    }
}

/// Replacement policy with a fixed eviction slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evictor {
    /// Slot replaced when a fully-associative cache is full.
    forced_slot: usize,
}

impl Evictor {
    /// Policy for a cache of `block_count` slots. `block_count` must be non-zero.
    pub fn new(block_count: usize) -> Self {
        Self {
            forced_slot: block_count - 1,
        }
    }

    pub fn forced_slot(&self) -> usize {
        self.forced_slot
    }

    /// Single-candidate placement: the block always goes to `index`.
    pub fn select_indexed(&self, slots: &[Slot], index: usize) -> Victim {
        Victim::classify(slots, index)
    }

    /// Fully-associative placement: first free slot, else the forced slot.
    pub fn select_any(&self, slots: &[Slot]) -> Victim {
        match slots.iter().position(|slot| !slot.is_valid()) {
            Some(free) => Victim::Free(free),
            None => Victim::Occupied(self.forced_slot),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(tags: &[Option<u64>]) -> Vec<Slot> {
        tags.iter()
            .map(|tag| {
                let mut slot = Slot::new(1);
                if let Some(tag) = tag {
                    let mut block: Box<[u8]> = vec![0].into_boxed_slice();
                    slot.install(*tag, &mut block);
                }
                slot
            })
            .collect()
    }

    #[test]
    fn test_first_free_slot_wins() {
        let evictor = Evictor::new(4);
        let slots = filled(&[Some(1), None, Some(2), None]);
        assert_eq!(evictor.select_any(&slots), Victim::Free(1));
    }

    #[test]
    fn test_full_cache_evicts_last_slot() {
        let evictor = Evictor::new(3);
        let slots = filled(&[Some(1), Some(2), Some(3)]);
        let victim = evictor.select_any(&slots);
        assert_eq!(victim, Victim::Occupied(2));
        assert!(victim.evicts());
    }

    #[test]
    fn test_indexed_placement() {
        let evictor = Evictor::new(2);
        let slots = filled(&[Some(4), None]);
        assert_eq!(evictor.select_indexed(&slots, 0), Victim::Occupied(0));
        assert_eq!(evictor.select_indexed(&slots, 1), Victim::Free(1));
        assert_eq!(evictor.select_indexed(&slots, 1).slot(), 1);
    }
}

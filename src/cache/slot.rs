//! Block slots.
//!
//! A slot holds one block-sized copy of backing store data together with its
//! valid bit and tag. Slots are the unit of placement and replacement.

/// One cache slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    data: Box<[u8]>,
    valid: bool,
    /// Meaningful only while `valid`.
    tag: u64,
}

impl Slot {
    /// An invalid slot with a zeroed buffer of `bytes_per_block` bytes.
    pub fn new(bytes_per_block: usize) -> Self {
        Self {
            data: vec![0u8; bytes_per_block].into_boxed_slice(),
            valid: false,
            tag: 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Tag of the resident block, or `None` while invalid.
    pub fn tag(&self) -> Option<u64> {
        self.valid.then_some(self.tag)
    }

    /// Whether this slot holds the block identified by `tag`.
    pub fn matches(&self, tag: u64) -> bool {
        self.valid && self.tag == tag
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn byte(&self, offset: usize) -> u8 {
        self.data[offset]
    }

    /// Install a freshly read block, returning the tag it replaced if the slot was valid.
    ///
    /// `block` is swapped in; on return it holds the previous contents.
    pub(crate) fn install(&mut self, tag: u64, block: &mut Box<[u8]>) -> Option<u64> {
        debug_assert_eq!(block.len(), self.data.len());
        let evicted = self.tag();
        std::mem::swap(&mut self.data, block);
        self.valid = true;
        self.tag = tag;
        evicted
    }
}

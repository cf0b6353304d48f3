//! Address decomposition: tag, index and offset.
//!
//! For direct-mapped and set-associative caches:
//!
//! ```text
//! offset = address % bytes_per_block
//! index  = (address / bytes_per_block) % block_count
//! tag    = address / (bytes_per_block * block_count)
//! ```
//!
//! A fully-associative cache has no index (always 0) and uses the block
//! number as its tag: `tag = address / bytes_per_block`.

use crate::config::{Associativity, CacheConfig, ConfigError};

/// An address split into its cache fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressParts {
    pub tag: u64,
    pub index: usize,
    pub offset: usize,
    /// Address of byte 0 of the containing block.
    pub block_address: u64,
}

/// Validated cache shape with the decomposition arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    block_count: u64,
    bytes_per_block: u64,
    /// `bytes_per_block * block_count`, the address span of one full pass over the slots.
    frame_bytes: u64,
    mode: Associativity,
}

impl Geometry {
    pub fn new(config: &CacheConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let frame_bytes = config
            .capacity_bytes()
            .ok_or(ConfigError::CapacityOverflow)?;
        Ok(Self {
            block_count: config.block_count as u64,
            bytes_per_block: config.bytes_per_block as u64,
            frame_bytes,
            mode: config.mode(),
        })
    }

    pub fn mode(&self) -> Associativity {
        self.mode
    }

    pub fn block_count(&self) -> usize {
        self.block_count as usize
    }

    pub fn bytes_per_block(&self) -> usize {
        self.bytes_per_block as usize
    }

    pub fn offset(&self, address: u64) -> usize {
        (address % self.bytes_per_block) as usize
    }

    pub fn block_address(&self, address: u64) -> u64 {
        address - address % self.bytes_per_block
    }

    pub fn index(&self, address: u64) -> usize {
        match self.mode {
            Associativity::FullyAssociative => 0,
            Associativity::DirectMapped | Associativity::SetAssociative { .. } => {
                ((address / self.bytes_per_block) % self.block_count) as usize
            }
        }
    }

    pub fn tag(&self, address: u64) -> u64 {
        match self.mode {
            Associativity::FullyAssociative => address / self.bytes_per_block,
            Associativity::DirectMapped | Associativity::SetAssociative { .. } => {
                address / self.frame_bytes
            }
        }
    }

    pub fn decompose(&self, address: u64) -> AddressParts {
        AddressParts {
            tag: self.tag(address),
            index: self.index(address),
            offset: self.offset(address),
            block_address: self.block_address(address),
        }
    }

    /// Block address of the block held in slot `slot` under `tag`.
    ///
    /// Fully-associative tags are block numbers, so the slot position is ignored.
    pub fn base_address(&self, tag: u64, slot: usize) -> u64 {
        match self.mode {
            Associativity::FullyAssociative => tag * self.bytes_per_block,
            Associativity::DirectMapped | Associativity::SetAssociative { .. } => {
                tag * self.frame_bytes + slot as u64 * self.bytes_per_block
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry(block_count: usize, bytes_per_block: usize, associativity: usize) -> Geometry {
        Geometry::new(&CacheConfig::new(block_count, bytes_per_block, associativity)).unwrap()
    }

    #[test]
    fn test_direct_mapped_fields() {
        let g = geometry(2, 4, 1);
        let parts = g.decompose(8);
        assert_eq!(parts.offset, 0);
        assert_eq!(parts.index, 0);
        assert_eq!(parts.tag, 1);
        assert_eq!(parts.block_address, 8);

        let parts = g.decompose(7);
        assert_eq!((parts.tag, parts.index, parts.offset), (0, 1, 3));
        assert_eq!(parts.block_address, 4);
    }

    #[test]
    fn test_fully_associative_fields() {
        let g = geometry(4, 16, 4);
        assert_eq!(g.index(1000), 0);
        assert_eq!(g.tag(1000), 1000 / 16);
        assert_eq!(g.offset(1000), 1000 % 16);
    }

    #[test]
    fn test_set_associative_uses_direct_mapped_formulas() {
        let set = geometry(8, 4, 2);
        let direct = geometry(8, 4, 1);
        for address in [0u64, 3, 31, 32, 33, 1_000, 4_097] {
            assert_eq!(set.index(address), direct.index(address));
            assert_eq!(set.tag(address), direct.tag(address));
            assert_eq!(set.offset(address), direct.offset(address));
        }
    }

    #[test]
    fn test_non_power_of_two_geometry() {
        let g = geometry(3, 5, 1);
        // block number 7, slot 7 % 3 = 1, tag 37 / 15 = 2
        assert_eq!(g.decompose(37).index, 1);
        assert_eq!(g.decompose(37).tag, 2);
        assert_eq!(g.decompose(37).offset, 2);
    }

    #[test]
    fn test_base_address_reconstruction() {
        let g = geometry(4, 8, 1);
        let parts = g.decompose(201);
        assert_eq!(g.base_address(parts.tag, parts.index), parts.block_address);

        let g = geometry(4, 8, 4);
        let parts = g.decompose(201);
        assert_eq!(g.base_address(parts.tag, 3), parts.block_address);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert_eq!(
            Geometry::new(&CacheConfig::new(4, 0, 1)),
            Err(ConfigError::ZeroBytesPerBlock)
        );
    }
}

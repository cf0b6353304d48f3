//! Cache configuration.
//!
//! A configuration can be loaded from a JSON file or constructed
//! programmatically. It is fixed for the lifetime of the cache built from it.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("block_count must be at least 1")]
    ZeroBlockCount,

    #[error("bytes_per_block must be at least 1")]
    ZeroBytesPerBlock,

    #[error("associativity must be at least 1")]
    ZeroAssociativity,

    #[error("associativity {associativity} exceeds block_count {block_count}")]
    AssociativityTooLarge {
        associativity: usize,
        block_count: usize,
    },

    #[error("associativity {associativity} does not divide block_count {block_count}")]
    UnevenSets {
        associativity: usize,
        block_count: usize,
    },

    #[error("cache capacity bytes_per_block * block_count overflows a 64-bit address")]
    CapacityOverflow,
}

/// Placement scheme selected by the associativity value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Associativity {
    /// One slot per set.
    DirectMapped,
    /// A single set spanning every slot.
    FullyAssociative,
    /// `ways` slots per set. Lookup still uses a single slot, see [`crate::cache`].
    SetAssociative { ways: usize },
}

impl fmt::Display for Associativity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Associativity::DirectMapped => write!(f, "direct-mapped"),
            Associativity::FullyAssociative => write!(f, "fully-associative"),
            Associativity::SetAssociative { ways } => write!(f, "{ways}-way set-associative"),
        }
    }
}

/// Cache geometry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Total number of block slots.
    pub block_count: usize,

    /// Size of each block in bytes.
    pub bytes_per_block: usize,

    /// Slots per set. 1 is direct-mapped, `block_count` is fully associative.
    pub associativity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            block_count: 8,
            bytes_per_block: 16,
            associativity: 1,
        }
    }
}

impl CacheConfig {
    pub fn new(block_count: usize, bytes_per_block: usize, associativity: usize) -> Self {
        Self {
            block_count,
            bytes_per_block,
            associativity,
        }
    }

    pub fn direct_mapped(block_count: usize, bytes_per_block: usize) -> Self {
        Self::new(block_count, bytes_per_block, 1)
    }

    pub fn fully_associative(block_count: usize, bytes_per_block: usize) -> Self {
        Self::new(block_count, bytes_per_block, block_count)
    }

    /// Load configuration from a JSON file, falling back to defaults if the file is missing.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let data = std::fs::read_to_string(path)?;
            let config = Self::from_json(&data)?;
            Ok(config)
        } else {
            tracing::warn!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Parse and validate a JSON configuration.
    pub fn from_json(data: &str) -> anyhow::Result<Self> {
        let config: CacheConfig = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the geometry is well formed.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_count == 0 {
            return Err(ConfigError::ZeroBlockCount);
        }
        if self.bytes_per_block == 0 {
            return Err(ConfigError::ZeroBytesPerBlock);
        }
        if self.associativity == 0 {
            return Err(ConfigError::ZeroAssociativity);
        }
        if self.associativity > self.block_count {
            return Err(ConfigError::AssociativityTooLarge {
                associativity: self.associativity,
                block_count: self.block_count,
            });
        }
        if self.block_count % self.associativity != 0 {
            return Err(ConfigError::UnevenSets {
                associativity: self.associativity,
                block_count: self.block_count,
            });
        }
        self.capacity_bytes().ok_or(ConfigError::CapacityOverflow)?;
        Ok(())
    }

    /// Placement scheme. Direct-mapped takes precedence when `block_count == 1`.
    pub fn mode(&self) -> Associativity {
        if self.associativity == 1 {
            Associativity::DirectMapped
        } else if self.associativity == self.block_count {
            Associativity::FullyAssociative
        } else {
            Associativity::SetAssociative {
                ways: self.associativity,
            }
        }
    }

    /// Nominal number of sets (`block_count / associativity`).
    pub fn num_sets(&self) -> usize {
        if self.associativity == 0 {
            return 0;
        }
        self.block_count / self.associativity
    }

    /// Total bytes held when every slot is valid, or `None` on overflow.
    pub fn capacity_bytes(&self) -> Option<u64> {
        let bytes_per_block = u64::try_from(self.bytes_per_block).ok()?;
        let block_count = u64::try_from(self.block_count).ok()?;
        bytes_per_block.checked_mul(block_count)
    }
}

//! Addresses of blocks and stages inside a project
//!
//! Provides [`BlockAddress`] and [`StageAddress`], the owned coordinates the
//! reference engine hands back when it reports where something lives.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Location of a block: `category:block`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockAddress {
    /// Category holding the block
    pub category: String,

    /// Block name (unique within its category)
    pub block: String,
}

/// Location of a stage: `category:block:stage`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StageAddress {
    /// Category holding the block
    pub category: String,

    /// Block name
    pub block: String,

    /// Stage name within the block
    pub stage: String,
}

impl BlockAddress {
    /// Create new block address
    #[inline]
    #[must_use]
    pub fn new(category: impl Into<String>, block: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            block: block.into(),
        }
    }

    /// Address of a stage inside this block
    #[inline]
    #[must_use]
    pub fn stage(&self, stage: impl Into<String>) -> StageAddress {
        StageAddress {
            category: self.category.clone(),
            block: self.block.clone(),
            stage: stage.into(),
        }
    }

    /// Check whether this address names `category:block`
    #[inline]
    #[must_use]
    pub fn is(&self, category: &str, block: &str) -> bool {
        self.category == category && self.block == block
    }
}

impl StageAddress {
    /// Create new stage address
    #[inline]
    #[must_use]
    pub fn new(
        category: impl Into<String>,
        block: impl Into<String>,
        stage: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            block: block.into(),
            stage: stage.into(),
        }
    }

    /// Address of the containing block
    #[inline]
    #[must_use]
    pub fn block_address(&self) -> BlockAddress {
        BlockAddress::new(self.category.clone(), self.block.clone())
    }
}

impl Display for BlockAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.category, self.block)
    }
}

impl Display for StageAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.category, self.block, self.stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_address_display() {
        let addr = BlockAddress::new("character", "alice");
        assert_eq!(addr.to_string(), "character:alice");
    }

    #[test]
    fn stage_address_display() {
        let addr = StageAddress::new("character", "alice", "raw");
        assert_eq!(addr.to_string(), "character:alice:raw");
    }

    #[test]
    fn block_address_stage_round_trip() {
        let addr = BlockAddress::new("location", "forest");
        let stage = addr.stage("output");

        assert_eq!(stage.stage, "output");
        assert_eq!(stage.block_address(), addr);
    }

    #[test]
    fn block_address_is() {
        let addr = BlockAddress::new("location", "forest");
        assert!(addr.is("location", "forest"));
        assert!(!addr.is("character", "forest"));
    }
}

//! Error types for document mutations

/// Errors raised by Content Store CRUD operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DocumentError {
    /// Block does not exist
    #[error("block not found: {category}:{block}")]
    BlockNotFound {
        /// Category looked in
        category: String,
        /// Missing block name
        block: String,
    },

    /// Block name already taken in the category
    #[error("block already exists: {category}:{block}")]
    BlockExists {
        /// Category holding the clash
        category: String,
        /// Taken block name
        block: String,
    },

    /// Stage does not exist
    #[error("stage not found: {category}:{block}:{stage}")]
    StageNotFound {
        /// Category of the block
        category: String,
        /// Block looked in
        block: String,
        /// Missing stage name
        stage: String,
    },

    /// Version key does not exist in the stage output
    #[error("version not found: {category}:{block}:{stage}:{version}")]
    VersionNotFound {
        /// Category of the block
        category: String,
        /// Block holding the stage
        block: String,
        /// Stage looked in
        stage: String,
        /// Missing version key
        version: String,
    },
}

impl DocumentError {
    pub(crate) fn block_not_found(category: &str, block: &str) -> Self {
        Self::BlockNotFound {
            category: category.to_string(),
            block: block.to_string(),
        }
    }

    pub(crate) fn block_exists(category: &str, block: &str) -> Self {
        Self::BlockExists {
            category: category.to_string(),
            block: block.to_string(),
        }
    }

    pub(crate) fn stage_not_found(category: &str, block: &str, stage: &str) -> Self {
        Self::StageNotFound {
            category: category.to_string(),
            block: block.to_string(),
            stage: stage.to_string(),
        }
    }

    /// Check if the error reports a missing item (as opposed to a name clash)
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        !matches!(self, Self::BlockExists { .. })
    }
}

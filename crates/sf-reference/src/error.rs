//! Resolution errors
//!
//! Every failure is a value. Bulk callers (expansion, the dependency index)
//! hit these constantly while a writer has dangling references mid-draft, so
//! nothing here panics.

use serde::Serialize;
use sf_document::StageAddress;

/// Coarse classification of a [`ResolveError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveErrorKind {
    /// Category, block or stage absent
    NotFound,

    /// Name exists in more than one category
    Ambiguous,

    /// Target exists but has no active version
    NoSelectedOutput,

    /// Reference string is malformed
    InvalidSyntax,
}

/// Why a reference failed to resolve
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolveError {
    /// No interpretation of the reference located its target
    #[error("{reference} not found ({})", join_missing(.missing))]
    NotFound {
        /// Reference string that failed
        reference: String,
        /// One entry per interpretation tried
        missing: Vec<Missing>,
    },

    /// Block name matched in several categories
    #[error(
        "{reference} is ambiguous: block `{block}` exists in categories {}",
        .categories.join(", ")
    )]
    Ambiguous {
        /// Reference string that failed
        reference: String,
        /// Block name that matched more than once
        block: String,
        /// Every category holding a block with that name
        categories: Vec<String>,
    },

    /// Stage exists but nothing usable is selected
    #[error("{reference} has no selected output in {stage}")]
    NoSelectedOutput {
        /// Reference string that failed
        reference: String,
        /// Stage the reference landed on
        stage: StageAddress,
        /// Stale selection key, if one was set
        selected: Option<String>,
    },

    /// Reference string does not follow the grammar
    #[error("invalid reference syntax {reference:?}: {reason}")]
    InvalidSyntax {
        /// Input as given
        reference: String,
        /// Parser message
        reason: String,
    },
}

/// The link that was absent when looking up a reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "missing", rename_all = "snake_case")]
pub enum Missing {
    /// Named category does not exist
    #[error("no category named `{category}`")]
    Category {
        /// Category name looked up
        category: String,
    },

    /// Bare lookup found no block with this name
    #[error("no block named `{block}` in any category")]
    Block {
        /// Block name looked up
        block: String,
    },

    /// Category exists but not the block
    #[error("no block `{category}:{block}`")]
    BlockInCategory {
        /// Category that exists
        category: String,
        /// Block name absent from it
        block: String,
    },

    /// Block exists but not the stage
    #[error("block `{category}:{block}` has no stage `{stage}`")]
    Stage {
        /// Category of the block
        category: String,
        /// Block that exists
        block: String,
        /// Stage name absent from it
        stage: String,
    },

    /// Block exists but has no stages at all
    #[error("block `{category}:{block}` has no stages")]
    NoStages {
        /// Category of the block
        category: String,
        /// Block without stages
        block: String,
    },
}

impl ResolveError {
    /// Coarse error kind
    #[must_use]
    pub fn kind(&self) -> ResolveErrorKind {
        match self {
            Self::NotFound { .. } => ResolveErrorKind::NotFound,
            Self::Ambiguous { .. } => ResolveErrorKind::Ambiguous,
            Self::NoSelectedOutput { .. } => ResolveErrorKind::NoSelectedOutput,
            Self::InvalidSyntax { .. } => ResolveErrorKind::InvalidSyntax,
        }
    }

    /// Reference string that failed
    #[must_use]
    pub fn reference(&self) -> &str {
        match self {
            Self::NotFound { reference, .. }
            | Self::Ambiguous { reference, .. }
            | Self::NoSelectedOutput { reference, .. }
            | Self::InvalidSyntax { reference, .. } => reference,
        }
    }
}

impl Missing {
    /// True when this reading did not even find a block.
    /// The resolver moves on to the next reading only in that case.
    #[inline]
    #[must_use]
    pub fn is_block_level(&self) -> bool {
        matches!(
            self,
            Self::Category { .. } | Self::Block { .. } | Self::BlockInCategory { .. }
        )
    }
}

fn join_missing(missing: &[Missing]) -> String {
    missing
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Expansion left references unresolved; the prompt must not be sent
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} unresolved reference(s): {}", .errors.len(), .errors.join("; "))]
pub struct UnresolvedReferences {
    /// Human-readable errors, one per failed occurrence
    pub errors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_reference() {
        let err = ResolveError::NotFound {
            reference: "missing_block".into(),
            missing: vec![Missing::Block {
                block: "missing_block".into(),
            }],
        };

        let msg = err.to_string();
        assert!(msg.contains("missing_block not found"));
        assert!(msg.contains("no block named `missing_block`"));
        assert_eq!(err.kind(), ResolveErrorKind::NotFound);
    }

    #[test]
    fn ambiguous_message_lists_categories() {
        let err = ResolveError::Ambiguous {
            reference: "shadow".into(),
            block: "shadow".into(),
            categories: vec!["character".into(), "location".into()],
        };

        assert!(err.to_string().contains("character, location"));
        assert_eq!(err.reference(), "shadow");
    }

    #[test]
    fn no_selected_output_message() {
        let err = ResolveError::NoSelectedOutput {
            reference: "alice".into(),
            stage: StageAddress::new("character", "alice", "raw"),
            selected: None,
        };
        assert_eq!(
            err.to_string(),
            "alice has no selected output in character:alice:raw"
        );
    }

    #[test]
    fn missing_block_level() {
        assert!(Missing::Category {
            category: "c".into()
        }
        .is_block_level());
        assert!(!Missing::NoStages {
            category: "c".into(),
            block: "b".into()
        }
        .is_block_level());
    }

    #[test]
    fn unresolved_references_message() {
        let err = UnresolvedReferences {
            errors: vec!["a not found".into(), "b not found".into()],
        };
        assert_eq!(
            err.to_string(),
            "2 unresolved reference(s): a not found; b not found"
        );
    }
}

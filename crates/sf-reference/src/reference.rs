//! Reference - tagged form of a `[...]` citation
//!
//! A reference has one to three colon-separated segments. Segment count is
//! decided here once; the resolver and dependency index work on the tagged
//! [`Reference`] and its [`Target`] interpretations instead of re-splitting
//! strings.

use serde::Serialize;
use sf_document::PairResolution;
use smallvec::{smallvec, SmallVec};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Maximum number of segments in a reference
pub const MAX_SEGMENTS: usize = 3;

/// Parsed reference
///
/// | Syntax | Variant |
/// |--------|---------|
/// | `[name]` | `Bare` |
/// | `[a:b]` | `Pair` (`category:block` or `block:stage`) |
/// | `[category:block:stage]` | `Full` |
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "String")]
pub enum Reference {
    /// Block name, looked up in every category
    Bare(String),

    /// Two segments; read as `category:block` or `block:stage`
    Pair(String, String),

    /// `category:block:stage`
    Full(String, String, String),
}

/// One concrete reading of a [`Reference`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target<'r> {
    /// Block in any category, default stage
    Bare { block: &'r str },

    /// Block in a named category, default stage
    Qualified { category: &'r str, block: &'r str },

    /// Block in any category, explicit stage
    Staged { block: &'r str, stage: &'r str },

    /// Everything explicit
    FullyQualified {
        category: &'r str,
        block: &'r str,
        stage: &'r str,
    },
}

impl Reference {
    /// Parse a reference string, with or without one enclosing `[` `]` pair
    ///
    /// # Errors
    /// Returns [`ReferenceSyntaxError`] when the segment count is outside
    /// 1..=3 or a segment is not an identifier.
    pub fn parse(input: &str) -> Result<Self, ReferenceSyntaxError> {
        let inner = input
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(input);

        if inner.is_empty() {
            return Err(ReferenceSyntaxError::Empty);
        }

        let segments: SmallVec<[&str; MAX_SEGMENTS]> = inner.split(':').collect();
        if segments.len() > MAX_SEGMENTS {
            return Err(ReferenceSyntaxError::TooManySegments(segments.len()));
        }
        if let Some(bad) = segments.iter().find(|seg| !is_segment(seg)) {
            return Err(ReferenceSyntaxError::InvalidSegment((*bad).to_string()));
        }

        Ok(match segments.as_slice() {
            [name] => Self::Bare((*name).to_string()),
            [first, second] => Self::Pair((*first).to_string(), (*second).to_string()),
            [category, block, stage] => Self::Full(
                (*category).to_string(),
                (*block).to_string(),
                (*stage).to_string(),
            ),
            _ => return Err(ReferenceSyntaxError::Empty),
        })
    }

    /// Segments in source order
    #[must_use]
    pub fn segments(&self) -> SmallVec<[&str; MAX_SEGMENTS]> {
        match self {
            Self::Bare(name) => smallvec![name.as_str()],
            Self::Pair(first, second) => smallvec![first.as_str(), second.as_str()],
            Self::Full(category, block, stage) => {
                smallvec![category.as_str(), block.as_str(), stage.as_str()]
            }
        }
    }

    /// Number of segments
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Bare(_) => 1,
            Self::Pair(..) => 2,
            Self::Full(..) => 3,
        }
    }

    /// Bracketed token as it appears in text: `[a:b]`
    #[must_use]
    pub fn to_token(&self) -> String {
        format!("[{self}]")
    }

    /// Interpretations to try, in order
    ///
    /// Only a pair has two; `order` decides which comes first.
    #[must_use]
    pub fn candidates(&self, order: PairResolution) -> SmallVec<[Target<'_>; 2]> {
        match self {
            Self::Bare(block) => smallvec![Target::Bare {
                block: block.as_str()
            }],
            Self::Pair(first, second) => {
                let qualified = Target::Qualified {
                    category: first.as_str(),
                    block: second.as_str(),
                };
                let staged = Target::Staged {
                    block: first.as_str(),
                    stage: second.as_str(),
                };
                match order {
                    PairResolution::QualifiedFirst => smallvec![qualified, staged],
                    PairResolution::StagedFirst => smallvec![staged, qualified],
                }
            }
            Self::Full(category, block, stage) => smallvec![Target::FullyQualified {
                category: category.as_str(),
                block: block.as_str(),
                stage: stage.as_str(),
            }],
        }
    }
}

impl Target<'_> {
    /// Block name this reading looks for
    #[inline]
    #[must_use]
    pub fn block(&self) -> &str {
        match self {
            Self::Bare { block }
            | Self::Qualified { block, .. }
            | Self::Staged { block, .. }
            | Self::FullyQualified { block, .. } => block,
        }
    }

    /// Category, when the reading names one
    #[inline]
    #[must_use]
    pub fn category(&self) -> Option<&str> {
        match self {
            Self::Qualified { category, .. } | Self::FullyQualified { category, .. } => {
                Some(category)
            }
            Self::Bare { .. } | Self::Staged { .. } => None,
        }
    }

    /// Stage, when the reading names one
    #[inline]
    #[must_use]
    pub fn stage(&self) -> Option<&str> {
        match self {
            Self::Staged { stage, .. } | Self::FullyQualified { stage, .. } => Some(stage),
            Self::Bare { .. } | Self::Qualified { .. } => None,
        }
    }
}

/// Check a single segment against `[A-Za-z_][A-Za-z0-9_]*`
#[must_use]
pub fn is_segment(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

impl Display for Reference {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments().join(":"))
    }
}

impl From<Reference> for String {
    fn from(reference: Reference) -> Self {
        reference.to_string()
    }
}

impl FromStr for Reference {
    type Err = ReferenceSyntaxError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Malformed reference string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceSyntaxError {
    /// Nothing between the brackets
    #[error("reference is empty")]
    Empty,

    /// More than three segments
    #[error("reference has {0} segments (at most 3 allowed)")]
    TooManySegments(usize),

    /// Segment is not an identifier
    #[error("invalid segment: {0:?} (must match [A-Za-z_][A-Za-z0-9_]*)")]
    InvalidSegment(String),
}

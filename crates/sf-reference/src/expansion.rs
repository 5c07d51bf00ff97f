//! Expansion - substitutes resolved content for every reference occurrence
//!
//! Fail-soft: an occurrence that does not resolve stays in the text exactly
//! as written and contributes one error string. Resolved content is inserted
//! literally and is not scanned again.
//!
//! Expansion reads the current selected versions, so the same text can expand
//! differently after the project changes. Callers wanting a stable prompt must
//! expand against an unchanged snapshot.

use crate::error::{ResolveError, UnresolvedReferences};
use crate::parser::occurrences;
use crate::resolver::Resolver;
use serde::Serialize;
use sf_document::{Project, StageAddress};
use std::ops::Range;

/// Result of expanding one text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Expansion {
    /// Text with every resolvable occurrence substituted
    pub resolved_text: String,

    /// One human-readable error per failed occurrence; empty when fully resolved
    pub errors: Vec<String>,

    /// Per-occurrence trace in text order
    pub references: Vec<ExpandedReference>,
}

/// Trace entry for one occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpandedReference {
    /// Bracketed token as written
    pub original: String,

    /// Reference string between the brackets
    pub reference: String,

    /// Byte range of the token in the input text
    pub span: Range<usize>,

    /// Stage the content came from
    pub source: Option<StageAddress>,

    /// Substituted content, `None` on failure
    pub content: Option<String>,

    /// Failure, `None` on success
    pub error: Option<ResolveError>,
}

impl Expansion {
    /// True when every occurrence resolved
    #[inline]
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.errors.is_empty()
    }

    /// Occurrences that failed
    pub fn failures(&self) -> impl Iterator<Item = &ExpandedReference> {
        self.references.iter().filter(|r| r.error.is_some())
    }

    /// Final prompt text, only if nothing failed
    ///
    /// # Errors
    /// [`UnresolvedReferences`] carrying the error list verbatim
    pub fn into_prompt(self) -> Result<String, UnresolvedReferences> {
        if self.errors.is_empty() {
            Ok(self.resolved_text)
        } else {
            Err(UnresolvedReferences {
                errors: self.errors,
            })
        }
    }
}

impl ExpandedReference {
    /// True when this occurrence was substituted
    #[inline]
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.error.is_none()
    }
}

/// Expand every reference occurrence in `text` against `project`
#[must_use]
pub fn expand(text: &str, project: &Project) -> Expansion {
    Resolver::new(project).expand(text)
}

impl Resolver<'_> {
    /// Expand every reference occurrence in `text`
    #[must_use]
    pub fn expand(&self, text: &str) -> Expansion {
        let mut resolved_text = String::with_capacity(text.len());
        let mut errors = Vec::new();
        let mut references = Vec::new();
        let mut cursor = 0;

        for occ in occurrences(text) {
            let span = occ.range();
            resolved_text.push_str(&text[cursor..span.start]);
            cursor = span.end;

            let entry = match self.resolve(occ.reference) {
                Ok(resolution) => {
                    resolved_text.push_str(resolution.content);
                    ExpandedReference {
                        original: occ.original.to_string(),
                        reference: occ.reference.to_string(),
                        span,
                        source: Some(resolution.address),
                        content: Some(resolution.content.to_string()),
                        error: None,
                    }
                }
                Err(err) => {
                    resolved_text.push_str(occ.original);
                    errors.push(err.to_string());
                    ExpandedReference {
                        original: occ.original.to_string(),
                        reference: occ.reference.to_string(),
                        span,
                        source: None,
                        content: None,
                        error: Some(err),
                    }
                }
            };
            references.push(entry);
        }
        resolved_text.push_str(&text[cursor..]);

        tracing::debug!(
            occurrences = references.len(),
            unresolved = errors.len(),
            "expanded text"
        );

        Expansion {
            resolved_text,
            errors,
            references,
        }
    }

    /// Expand the input template of a stage
    ///
    /// Returns `None` when the stage does not exist.
    #[must_use]
    pub fn expand_stage(&self, address: &StageAddress) -> Option<Expansion> {
        let stage = self
            .project()
            .stage(&address.category, &address.block, &address.stage)?;
        Some(self.expand(&stage.input))
    }
}

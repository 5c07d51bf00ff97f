//! Dependency index - "uses" and "used by" views of a block
//!
//! Recomputed from the project on every call; nothing is cached. Validity
//! always comes from the [`Resolver`], so a reference flagged valid here is
//! exactly one that expansion would substitute.
//!
//! No cycle detection: indexing never expands content, so mutually
//! referencing blocks are indexed like any others.

use crate::error::ResolveError;
use crate::parser::find_references;
use crate::reference::Reference;
use crate::resolver::Resolver;
use indexmap::IndexMap;
use serde::Serialize;
use sf_document::{BlockAddress, Project, StageAddress};

/// One distinct reference used by a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    /// Reference string between the brackets
    pub reference: String,

    /// Stages of the block whose input contains the reference, in stage order
    pub stages: Vec<String>,

    /// Whether the reference currently resolves
    pub valid: bool,

    /// Stage it resolves to, when valid
    pub target: Option<StageAddress>,

    /// Why it does not resolve, when invalid
    pub error: Option<ResolveError>,
}

/// A reference anywhere in the project that does not resolve
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrokenReference {
    /// Stage whose input contains the reference
    pub location: StageAddress,

    /// Reference string between the brackets
    pub reference: String,

    /// Resolution failure
    pub error: ResolveError,
}

/// References used by `category:block`, one entry per distinct reference
///
/// Empty when the block does not exist.
#[must_use]
pub fn uses_of(project: &Project, category: &str, block: &str) -> Vec<Dependency> {
    Resolver::new(project).uses_of(category, block)
}

/// Stages of other blocks that reference `category:block`
#[must_use]
pub fn used_by_of(project: &Project, category: &str, block: &str) -> Vec<StageAddress> {
    Resolver::new(project).used_by_of(category, block)
}

/// Every reference in the project that fails to resolve, in document order
#[must_use]
pub fn broken_references(project: &Project) -> Vec<BrokenReference> {
    Resolver::new(project).broken_references()
}

impl Resolver<'_> {
    /// References used by `category:block`
    #[must_use]
    pub fn uses_of(&self, category: &str, block: &str) -> Vec<Dependency> {
        let Some(block_data) = self.project().block(category, block) else {
            return Vec::new();
        };

        // reference -> stages containing it
        let mut found: IndexMap<&str, Vec<String>> = IndexMap::new();
        for (stage_name, stage) in block_data.stages() {
            for reference in find_references(&stage.input) {
                found
                    .entry(reference)
                    .or_default()
                    .push(stage_name.to_string());
            }
        }

        found
            .into_iter()
            .map(|(reference, stages)| {
                let (target, error) = match self.resolve(reference) {
                    Ok(resolution) => (Some(resolution.address), None),
                    Err(err) => (None, Some(err)),
                };
                Dependency {
                    reference: reference.to_string(),
                    stages,
                    valid: error.is_none(),
                    target,
                    error,
                }
            })
            .collect()
    }

    /// Stages of other blocks whose input reaches `category:block`
    ///
    /// A stage is reported once no matter how many of its references point at
    /// the subject. Ambiguous bare names count as pointing at every block they
    /// match.
    #[must_use]
    pub fn used_by_of(&self, category: &str, block: &str) -> Vec<StageAddress> {
        let subject = BlockAddress::new(category, block);
        let mut users = Vec::new();

        for (cat_name, cat) in self.project().categories() {
            for (block_name, block_data) in cat.blocks() {
                if subject.is(cat_name, block_name) {
                    continue;
                }
                for (stage_name, stage) in block_data.stages() {
                    if self.input_reaches(&stage.input, &subject) {
                        users.push(StageAddress::new(cat_name, block_name, stage_name));
                    }
                }
            }
        }

        tracing::debug!(subject = %subject, users = users.len(), "computed used-by");
        users
    }

    /// Every failing reference in the project
    #[must_use]
    pub fn broken_references(&self) -> Vec<BrokenReference> {
        let mut broken = Vec::new();

        for (cat_name, cat) in self.project().categories() {
            for (block_name, block_data) in cat.blocks() {
                for (stage_name, stage) in block_data.stages() {
                    for reference in find_references(&stage.input) {
                        if let Err(error) = self.resolve(reference) {
                            broken.push(BrokenReference {
                                location: StageAddress::new(cat_name, block_name, stage_name),
                                reference: reference.to_string(),
                                error,
                            });
                        }
                    }
                }
            }
        }

        broken
    }

    fn input_reaches(&self, input: &str, subject: &BlockAddress) -> bool {
        find_references(input).into_iter().any(|raw| {
            Reference::parse(raw)
                .map(|reference| self.reached_blocks(&reference).contains(subject))
                .unwrap_or(false)
        })
    }
}

//! Resolver - looks references up in a project snapshot
//!
//! Lookup walks category → block → stage → selected version. Each reading of
//! a reference (see [`Reference::candidates`]) is tried in order; the first
//! one that locates a block decides the outcome, including its stage and
//! selection errors. Later readings are only tried when an earlier one found
//! no block at all.

use crate::error::{Missing, ResolveError};
use crate::reference::{Reference, Target};
use serde::Serialize;
use sf_document::{Block, BlockAddress, Project, Stage, StageAddress};
use smallvec::SmallVec;

/// Successful lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution<'p> {
    /// Stage the content came from
    pub address: StageAddress,

    /// Key of the selected version
    pub version: &'p str,

    /// Selected version content
    pub content: &'p str,
}

/// Reference lookup bound to one project snapshot
///
/// Holds nothing but the borrow; every call re-reads the document, so the
/// same reference may resolve differently once the project changes.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'p> {
    project: &'p Project,
}

/// Outcome of locating the block a single reading points at
enum Located<'p> {
    Block {
        category: &'p str,
        block: &'p Block,
    },
    Ambiguous(Vec<&'p str>),
    Missing(Missing),
}

impl<'p> Resolver<'p> {
    /// Bind a resolver to a project snapshot
    #[inline]
    #[must_use]
    pub fn new(project: &'p Project) -> Self {
        Self { project }
    }

    /// Project this resolver reads
    #[inline]
    #[must_use]
    pub fn project(&self) -> &'p Project {
        self.project
    }

    /// Resolve a reference string (with or without brackets)
    ///
    /// # Errors
    /// [`ResolveError::InvalidSyntax`] for malformed input, otherwise see
    /// [`Resolver::resolve_reference`].
    pub fn resolve(&self, reference: &str) -> Result<Resolution<'p>, ResolveError> {
        let parsed = Reference::parse(reference).map_err(|e| ResolveError::InvalidSyntax {
            reference: reference.to_string(),
            reason: e.to_string(),
        })?;
        self.resolve_reference(&parsed)
    }

    /// Resolve a parsed reference
    ///
    /// # Errors
    /// - [`ResolveError::NotFound`] when no reading locates a block, or the
    ///   deciding reading's stage is absent
    /// - [`ResolveError::Ambiguous`] when a bare block name exists in several
    ///   categories
    /// - [`ResolveError::NoSelectedOutput`] when the stage has no usable
    ///   selection
    pub fn resolve_reference(&self, reference: &Reference) -> Result<Resolution<'p>, ResolveError> {
        tracing::trace!(%reference, "resolving reference");

        let order = self.project.settings().pair_resolution;
        let mut missing = Vec::new();

        for target in reference.candidates(order) {
            match self.locate(&target) {
                Located::Block { category, block } => {
                    return self.extract(reference, &target, category, block);
                }
                Located::Ambiguous(categories) => {
                    tracing::debug!(%reference, ?categories, "ambiguous reference");
                    return Err(ResolveError::Ambiguous {
                        reference: reference.to_string(),
                        block: target.block().to_string(),
                        categories: categories.into_iter().map(str::to_string).collect(),
                    });
                }
                Located::Missing(m) => missing.push(m),
            }
        }

        tracing::debug!(%reference, "reference not found");
        Err(ResolveError::NotFound {
            reference: reference.to_string(),
            missing,
        })
    }

    /// Blocks the deciding reading of a reference points at
    ///
    /// Empty when no reading locates a block. An ambiguous bare name yields
    /// every matching block. Stage and selection are not checked, so this
    /// answers "would resolving reach these blocks", not "would it succeed".
    #[must_use]
    pub fn reached_blocks(&self, reference: &Reference) -> SmallVec<[BlockAddress; 1]> {
        let order = self.project.settings().pair_resolution;

        for target in reference.candidates(order) {
            match self.locate(&target) {
                Located::Block { category, .. } => {
                    let mut reached = SmallVec::new();
                    reached.push(BlockAddress::new(category, target.block()));
                    return reached;
                }
                Located::Ambiguous(categories) => {
                    return categories
                        .into_iter()
                        .map(|category| BlockAddress::new(category, target.block()))
                        .collect();
                }
                Located::Missing(_) => {}
            }
        }

        SmallVec::new()
    }

    fn locate(&self, target: &Target<'_>) -> Located<'p> {
        let name = target.block();

        let Some(category) = target.category() else {
            let mut matches = self.project.find_blocks(name);
            return match matches.len() {
                0 => Located::Missing(Missing::Block {
                    block: name.to_string(),
                }),
                1 => {
                    let (category, block) = matches.remove(0);
                    Located::Block { category, block }
                }
                _ => Located::Ambiguous(matches.into_iter().map(|(cat, _)| cat).collect()),
            };
        };

        let Some((category_name, cat)) = self
            .project
            .categories()
            .find(|(cat_name, _)| *cat_name == category)
        else {
            return Located::Missing(Missing::Category {
                category: category.to_string(),
            });
        };

        match cat.block(name) {
            Some(block) => Located::Block {
                category: category_name,
                block,
            },
            None => Located::Missing(Missing::BlockInCategory {
                category: category.to_string(),
                block: name.to_string(),
            }),
        }
    }

    /// Pick the stage and read its selected version
    fn extract(
        &self,
        reference: &Reference,
        target: &Target<'_>,
        category: &str,
        block: &'p Block,
    ) -> Result<Resolution<'p>, ResolveError> {
        let block_name = target.block();

        let (stage_name, stage) = match target.stage() {
            Some(name) => block.stage(name).map(|stage| (name, stage)).ok_or_else(|| {
                ResolveError::NotFound {
                    reference: reference.to_string(),
                    missing: vec![Missing::Stage {
                        category: category.to_string(),
                        block: block_name.to_string(),
                        stage: name.to_string(),
                    }],
                }
            })?,
            None => self.default_stage(block).ok_or_else(|| ResolveError::NotFound {
                reference: reference.to_string(),
                missing: vec![Missing::NoStages {
                    category: category.to_string(),
                    block: block_name.to_string(),
                }],
            })?,
        };

        let address = StageAddress::new(category, block_name, stage_name);
        match stage.selected_content() {
            Some(content) => Ok(Resolution {
                address,
                version: stage.selected.as_str(),
                content,
            }),
            None => Err(ResolveError::NoSelectedOutput {
                reference: reference.to_string(),
                stage: address,
                selected: (!stage.selected.is_empty()).then(|| stage.selected.clone()),
            }),
        }
    }

    /// Default stage: first name in the preference list that the block has,
    /// else the block's first stage
    fn default_stage<'b>(&self, block: &'b Block) -> Option<(&'b str, &'b Stage)> {
        default_stage(block, &self.project.settings().default_stage_preference)
    }
}

/// Default stage of a block under a preference list
#[must_use]
pub fn default_stage<'b>(block: &'b Block, preference: &[String]) -> Option<(&'b str, &'b Stage)> {
    preference
        .iter()
        .find_map(|preferred| {
            block
                .stages()
                .find(|(name, _)| *name == preferred.as_str())
        })
        .or_else(|| block.first_stage())
}

/// Resolve a reference string against a project
///
/// # Errors
/// See [`Resolver::resolve`].
pub fn resolve<'p>(reference: &str, project: &'p Project) -> Result<Resolution<'p>, ResolveError> {
    Resolver::new(project).resolve(reference)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResolveErrorKind;
    use sf_document::{PairResolution, Settings};

    fn selected(project: &mut Project, category: &str, block: &str, stage: &str, content: &str) {
        if project.block(category, block).is_none() {
            project.create_block(category, block).unwrap();
        }
        project.add_stage(category, block, stage, "").unwrap();
        project.add_version(category, block, stage, "v1", content).unwrap();
        project.select_version(category, block, stage, "v1").unwrap();
    }

    #[test]
    fn resolve_bare() {
        let mut project = Project::default();
        selected(&mut project, "character", "alice", "raw", "Alice content");

        let res = resolve("alice", &project).unwrap();
        assert_eq!(res.content, "Alice content");
        assert_eq!(res.version, "v1");
        assert_eq!(res.address, StageAddress::new("character", "alice", "raw"));
    }

    #[test]
    fn resolve_accepts_brackets() {
        let mut project = Project::default();
        selected(&mut project, "character", "alice", "raw", "Alice content");

        assert_eq!(resolve("[alice]", &project).unwrap().content, "Alice content");
    }

    #[test]
    fn resolve_qualified_and_staged() {
        let mut project = Project::default();
        selected(&mut project, "character", "alice", "raw", "Raw content");
        selected(&mut project, "character", "alice", "summary", "Summary content");

        assert_eq!(resolve("character:alice", &project).unwrap().content, "Raw content");
        assert_eq!(resolve("alice:summary", &project).unwrap().content, "Summary content");
        assert_eq!(
            resolve("character:alice:summary", &project).unwrap().content,
            "Summary content"
        );
    }

    #[test]
    fn resolve_qualified_wins_over_staged() {
        // `scene` is both a category and a block with a stage named `intro`
        let mut project = Project::default();
        selected(&mut project, "scene", "intro", "output", "qualified");
        selected(&mut project, "act", "scene", "intro", "staged");

        assert_eq!(resolve("scene:intro", &project).unwrap().content, "qualified");

        project.settings_mut().pair_resolution = PairResolution::StagedFirst;
        assert_eq!(resolve("scene:intro", &project).unwrap().content, "staged");
    }

    #[test]
    fn resolve_qualified_stage_error_does_not_fall_back() {
        // character:alice exists without selection; bare block `character`
        // with stage `alice` also exists but must not be consulted
        let mut project = Project::default();
        project.create_block("character", "alice").unwrap();
        project.add_stage("character", "alice", "raw", "").unwrap();
        selected(&mut project, "misc", "character", "alice", "fallback");

        let err = resolve("character:alice", &project).unwrap_err();
        assert_eq!(err.kind(), ResolveErrorKind::NoSelectedOutput);
    }

    #[test]
    fn resolve_pair_not_found_reports_both_readings() {
        let project = Project::default();
        let err = resolve("nope:nothing", &project).unwrap_err();

        match err {
            ResolveError::NotFound { missing, .. } => {
                assert_eq!(
                    missing,
                    vec![
                        Missing::Category {
                            category: "nope".into()
                        },
                        Missing::Block {
                            block: "nope".into()
                        },
                    ]
                );
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[test]
    fn resolve_ambiguous_in_pair_fallback() {
        let mut project = Project::default();
        selected(&mut project, "character", "shadow", "raw", "a");
        selected(&mut project, "location", "shadow", "raw", "b");

        let err = resolve("shadow:raw", &project).unwrap_err();
        assert_eq!(err.kind(), ResolveErrorKind::Ambiguous);
    }

    #[test]
    fn resolve_full_missing_links() {
        let mut project = Project::default();
        selected(&mut project, "character", "alice", "raw", "x");

        for reference in ["nope:alice:raw", "character:bob:raw", "character:alice:summary"] {
            let err = resolve(reference, &project).unwrap_err();
            assert_eq!(err.kind(), ResolveErrorKind::NotFound, "{reference}");
        }
    }

    #[test]
    fn resolve_block_without_stages() {
        let mut project = Project::default();
        project.create_block("character", "empty").unwrap();

        let err = resolve("empty", &project).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::NotFound { ref missing, .. }
                if matches!(missing[0], Missing::NoStages { .. })
        ));
    }

    #[test]
    fn resolve_stale_selection() {
        let mut project = Project::default();
        selected(&mut project, "character", "alice", "raw", "x");
        project
            .block_mut("character", "alice")
            .and_then(|b| b.stage_mut("raw"))
            .unwrap()
            .selected = "v7".into();

        let err = resolve("alice", &project).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::NoSelectedOutput { selected: Some(ref key), .. } if key == "v7"
        ));
    }

    #[test]
    fn resolve_invalid_syntax() {
        let project = Project::default();
        let err = resolve("a:b:c:d", &project).unwrap_err();
        assert_eq!(err.kind(), ResolveErrorKind::InvalidSyntax);
    }

    #[test]
    fn resolve_custom_stage_preference() {
        let mut project =
            Project::default().with_settings(Settings::new().with_stage_preference(["summary"]));
        selected(&mut project, "character", "alice", "output", "output");
        selected(&mut project, "character", "alice", "summary", "summary");

        assert_eq!(resolve("alice", &project).unwrap().content, "summary");
    }

    #[test]
    fn reached_blocks_for_ambiguous_name() {
        let mut project = Project::default();
        project.create_block("character", "shadow").unwrap();
        project.create_block("location", "shadow").unwrap();

        let reached = Resolver::new(&project).reached_blocks(&Reference::parse("shadow").unwrap());
        assert_eq!(reached.len(), 2);
        assert!(reached.contains(&BlockAddress::new("location", "shadow")));
    }

    #[test]
    fn reached_blocks_ignores_stage_existence() {
        let mut project = Project::default();
        project.create_block("character", "alice").unwrap();

        let resolver = Resolver::new(&project);
        let reached = resolver.reached_blocks(&Reference::parse("alice:missing").unwrap());
        assert_eq!(reached.as_slice(), &[BlockAddress::new("character", "alice")]);

        let none = resolver.reached_blocks(&Reference::parse("bob").unwrap());
        assert!(none.is_empty());
    }
}

//! StoryForge References
//!
//! Bracketed `[ref]` citations inside stage templates: finding them, looking
//! them up in a [`Project`](sf_document::Project), splicing their content into
//! prompts, and indexing which blocks use which.
//!
//! # Overview
//!
//! - **Parser**: [`find_references`] and [`occurrences`] scan free text
//! - **Resolver**: [`Resolver`] maps one reference to a selected version
//! - **Expansion**: [`expand`] substitutes every occurrence, fail-soft
//! - **Dependencies**: [`uses_of`], [`used_by_of`] and [`broken_references`]
//!
//! # Example
//!
//! ```rust
//! use sf_document::Project;
//! use sf_reference::{expand, find_references, Resolver};
//!
//! let mut project = Project::new("Demo", "Author");
//! project.create_block("character", "alice").unwrap();
//! project.add_stage("character", "alice", "summary", "").unwrap();
//! project.add_version("character", "alice", "summary", "v1", "Alice is a ranger").unwrap();
//! project.select_version("character", "alice", "summary", "v1").unwrap();
//!
//! let template = "Describe [alice:summary] meeting [ghost].";
//! assert_eq!(find_references(template), vec!["alice:summary", "ghost"]);
//!
//! let expansion = expand(template, &project);
//! assert_eq!(expansion.resolved_text, "Describe Alice is a ranger meeting [ghost].");
//! assert_eq!(expansion.errors.len(), 1);
//!
//! let resolver = Resolver::new(&project);
//! assert_eq!(resolver.resolve("character:alice").unwrap().content, "Alice is a ranger");
//! ```

#![warn(unreachable_pub)]

pub mod dependency;
pub mod error;
pub mod expansion;
pub mod parser;
pub mod reference;
pub mod resolver;

// Re-exports
pub use dependency::{broken_references, used_by_of, uses_of, BrokenReference, Dependency};
pub use error::{Missing, ResolveError, ResolveErrorKind, UnresolvedReferences};
pub use expansion::{expand, ExpandedReference, Expansion};
pub use parser::{find_references, has_references, occurrences, Occurrence};
pub use reference::{is_segment, Reference, ReferenceSyntaxError, Target, MAX_SEGMENTS};
pub use resolver::{default_stage, resolve, Resolution, Resolver};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for reference operations
    pub use crate::{
        expand, find_references, resolve, Dependency, Expansion, Reference, ResolveError,
        ResolveErrorKind, Resolver,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

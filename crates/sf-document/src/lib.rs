//! StoryForge Document
//!
//! The Content Store: an in-memory project document of categories, blocks,
//! stages and versions, with the CRUD operations an editor issues against it.
//!
//! # Core Concepts
//!
//! - [`Project`]: root document, owns everything below it
//! - [`Category`]: named group of blocks
//! - [`Block`]: ordered set of [`Stage`]s
//! - [`Stage`]: prompt template (`input`) plus versioned `output`
//! - [`Settings`]: default-stage preference and pair interpretation order
//!
//! # Example
//!
//! ```rust
//! use sf_document::Project;
//!
//! let mut project = Project::new("My Story", "Author Name");
//! project.create_block("character", "alice").unwrap();
//! project.add_stage("character", "alice", "raw", "Create a character...").unwrap();
//! project.add_version("character", "alice", "raw", "v1", "Alice is...").unwrap();
//! project.select_version("character", "alice", "raw", "v1").unwrap();
//!
//! assert_eq!(project.selected_output("character", "alice", "raw"), Some("Alice is..."));
//! ```

#![warn(unreachable_pub)]

mod address;
mod block;
mod error;
mod project;
mod settings;

// Re-exports
pub use address::{BlockAddress, StageAddress};
pub use block::{Block, Category, Stage};
pub use error::DocumentError;
pub use project::{Project, ProjectMeta, SCHEMA_VERSION, STORYFORGE_VERSION};
pub use settings::{PairResolution, Settings, DEFAULT_STAGE_PREFERENCE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! StoryForge command line
//!
//! Loads a project document read-only and exposes the reference engine for
//! inspection: resolve a reference, expand a template, list a block's
//! dependencies, or check the whole project for broken references.

#![warn(unreachable_pub)]

pub mod commands;
pub mod loader;

pub use commands::Output;
pub use loader::{load_project, parse_project};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

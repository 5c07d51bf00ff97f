//! Testing utilities for StoryForge workspace
//!
//! Shared fixtures: canned projects and helpers for building selected stages.

#![allow(missing_docs)]
#![allow(clippy::missing_panics_doc)]

use sf_document::{Project, Settings};

pub fn create_project() -> Project {
    Project::new("Test Story", "Tester")
}

pub fn create_project_with_settings(settings: Settings) -> Project {
    create_project().with_settings(settings)
}

/// Add a stage with one version `v1` holding `content`, selected
///
/// Creates the block first when it does not exist yet.
pub fn add_selected_stage(
    project: &mut Project,
    category: &str,
    block: &str,
    stage: &str,
    content: &str,
) {
    add_stage_with_input(project, category, block, stage, "", Some(content));
}

/// Add a stage with the given input template and, optionally, a selected `v1`
pub fn add_stage_with_input(
    project: &mut Project,
    category: &str,
    block: &str,
    stage: &str,
    input: &str,
    content: Option<&str>,
) {
    if project.block(category, block).is_none() {
        project.create_block(category, block).unwrap();
    }
    project.add_stage(category, block, stage, input).unwrap();
    if let Some(content) = content {
        project.add_version(category, block, stage, "v1", content).unwrap();
        project.select_version(category, block, stage, "v1").unwrap();
    }
}

/// Small story used across resolution and dependency tests
///
/// - `character:alice` - `raw` stage whose input is `[location:forest]`
/// - `location:forest` - `output` selected "A dark wood."
/// - `prompts:greeting` - only a `summary` stage, selected "Hello there."
/// - `character:shadow` and `location:shadow` - same block name in two categories
pub fn create_story_project() -> Project {
    let mut project = create_project();

    add_stage_with_input(
        &mut project,
        "character",
        "alice",
        "raw",
        "[location:forest]",
        Some("Alice walks into the forest."),
    );
    add_selected_stage(&mut project, "location", "forest", "output", "A dark wood.");
    add_selected_stage(&mut project, "prompts", "greeting", "summary", "Hello there.");
    add_selected_stage(&mut project, "character", "shadow", "raw", "A figure in black.");
    add_selected_stage(&mut project, "location", "shadow", "raw", "A cold, unlit valley.");

    project
}

/// Block with the given stages in order, each selected with its own name as content
pub fn create_staged_block(project: &mut Project, category: &str, block: &str, stages: &[&str]) {
    for stage in stages {
        add_selected_stage(project, category, block, stage, stage);
    }
}

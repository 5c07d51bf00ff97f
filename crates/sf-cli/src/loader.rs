//! Project document loader
//!
//! Reads a StoryForge YAML file into a [`Project`]. Loading is read-only;
//! saving belongs to the editor.

use anyhow::{bail, Context, Result};
use serde_yaml::Value;
use sf_document::Project;
use std::fs;
use std::path::Path;

/// Key every StoryForge document carries at the top level
const FORMAT_KEY: &str = "storyforge";

/// Load a project document from disk
///
/// # Errors
/// Fails when the file cannot be read or is not a StoryForge document.
pub fn load_project(path: &Path) -> Result<Project> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read project file {}", path.display()))?;

    let project =
        parse_project(&text).with_context(|| format!("failed to load {}", path.display()))?;

    tracing::debug!(
        path = %path.display(),
        categories = project.list_categories().len(),
        "loaded project"
    );
    Ok(project)
}

/// Parse a project document from YAML text
///
/// # Errors
/// Fails on invalid YAML, an empty document, a document without the
/// `storyforge` key, or a document whose shape does not match the schema.
pub fn parse_project(text: &str) -> Result<Project> {
    if text.trim().is_empty() {
        bail!("empty project document");
    }

    let mut value: Value = serde_yaml::from_str(text).context("invalid YAML")?;
    if value.is_null() {
        bail!("empty project document");
    }

    let Some(map) = value.as_mapping_mut() else {
        bail!("project document must be a mapping");
    };

    let Some(version) = map.get_mut(FORMAT_KEY) else {
        bail!("not a StoryForge project: missing `{FORMAT_KEY}` key");
    };
    // `storyforge: 1.0` written without quotes parses as a number
    if let Value::Number(number) = version {
        *version = Value::String(number.to_string());
    }

    serde_yaml::from_value(value).context("project document does not match the StoryForge schema")
}

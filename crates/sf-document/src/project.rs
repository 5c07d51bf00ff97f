//! Project document and its CRUD operations
//!
//! [`Project`] exclusively owns every category, block, stage and version.
//! Readers (resolver, expansion, dependency index) borrow it immutably; only
//! the methods here mutate it.

use crate::address::BlockAddress;
use crate::block::{Block, Category, Stage};
use crate::error::DocumentError;
use crate::settings::Settings;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Application format version written into new documents
pub const STORYFORGE_VERSION: &str = "1.0";

/// Document schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Root project document
///
/// Field names follow the on-disk StoryForge schema so a loaded file
/// deserializes straight into this type. Unknown top-level keys (editor UI
/// state) are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    storyforge: String,

    #[serde(default)]
    schema_version: u32,

    #[serde(default, rename = "project")]
    meta: ProjectMeta,

    #[serde(default)]
    settings: Settings,

    #[serde(default)]
    blocks: IndexMap<String, Category>,
}

/// Descriptive project metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectMeta {
    /// Story title
    pub title: String,

    /// Author name, may be empty
    pub author: String,
}

impl Project {
    /// Create empty project
    #[must_use]
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            storyforge: STORYFORGE_VERSION.to_string(),
            schema_version: SCHEMA_VERSION,
            meta: ProjectMeta {
                title: title.into(),
                author: author.into(),
            },
            settings: Settings::default(),
            blocks: IndexMap::new(),
        }
    }

    /// With explicit settings
    #[inline]
    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    // ------------------------------------------------------------------
    // Metadata
    // ------------------------------------------------------------------

    /// Project title
    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.meta.title
    }

    /// Set project title
    #[inline]
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.meta.title = title.into();
    }

    /// Project author
    #[inline]
    #[must_use]
    pub fn author(&self) -> &str {
        &self.meta.author
    }

    /// Set project author
    #[inline]
    pub fn set_author(&mut self, author: impl Into<String>) {
        self.meta.author = author.into();
    }

    /// Application format version recorded in the document
    #[inline]
    #[must_use]
    pub fn storyforge_version(&self) -> &str {
        &self.storyforge
    }

    /// Schema version recorded in the document
    #[inline]
    #[must_use]
    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Resolution settings
    #[inline]
    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Mutable resolution settings
    #[inline]
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    // ------------------------------------------------------------------
    // Categories
    // ------------------------------------------------------------------

    /// Category names in insertion order
    #[must_use]
    pub fn list_categories(&self) -> Vec<&str> {
        self.blocks.keys().map(String::as_str).collect()
    }

    /// Iterate categories in insertion order
    pub fn categories(&self) -> impl Iterator<Item = (&str, &Category)> {
        self.blocks.iter().map(|(name, cat)| (name.as_str(), cat))
    }

    /// Category by name
    #[inline]
    #[must_use]
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.blocks.get(name)
    }

    /// Create an empty category; no-op if it exists
    pub fn create_category(&mut self, name: &str) {
        if !self.blocks.contains_key(name) {
            tracing::debug!(category = name, "creating category");
            self.blocks.insert(name.to_string(), Category::new());
        }
    }

    /// Delete a category and all its blocks. Returns true if it existed.
    pub fn delete_category(&mut self, name: &str) -> bool {
        let removed = self.blocks.shift_remove(name).is_some();
        if removed {
            tracing::debug!(category = name, "deleted category");
        }
        removed
    }

    // ------------------------------------------------------------------
    // Blocks
    // ------------------------------------------------------------------

    /// Block names of a category; empty when the category is absent
    #[must_use]
    pub fn list_blocks(&self, category: &str) -> Vec<&str> {
        self.blocks
            .get(category)
            .map(Category::block_names)
            .unwrap_or_default()
    }

    /// Block by category and name
    #[inline]
    #[must_use]
    pub fn block(&self, category: &str, name: &str) -> Option<&Block> {
        self.blocks.get(category)?.block(name)
    }

    /// Mutable block by category and name
    #[inline]
    pub fn block_mut(&mut self, category: &str, name: &str) -> Option<&mut Block> {
        self.blocks.get_mut(category)?.block_mut(name)
    }

    /// Every block named `name`, across all categories, in category order
    #[must_use]
    pub fn find_blocks(&self, name: &str) -> Vec<(&str, &Block)> {
        self.blocks
            .iter()
            .filter_map(|(cat, category)| category.block(name).map(|b| (cat.as_str(), b)))
            .collect()
    }

    /// Addresses of every block in the document, in document order
    #[must_use]
    pub fn block_addresses(&self) -> Vec<BlockAddress> {
        self.categories()
            .flat_map(|(cat, category)| {
                category
                    .blocks()
                    .map(move |(name, _)| BlockAddress::new(cat, name))
            })
            .collect()
    }

    /// Create an empty block, creating the category if needed
    ///
    /// # Errors
    /// [`DocumentError::BlockExists`] if the name is taken in the category
    pub fn create_block(
        &mut self,
        category: &str,
        name: &str,
    ) -> Result<&mut Block, DocumentError> {
        self.insert_block(category, name, Block::new())
    }

    /// Create a block with initial stages, creating the category if needed
    ///
    /// # Errors
    /// [`DocumentError::BlockExists`] if the name is taken in the category
    pub fn insert_block(
        &mut self,
        category: &str,
        name: &str,
        block: Block,
    ) -> Result<&mut Block, DocumentError> {
        let cat = self.blocks.entry(category.to_string()).or_default();
        if cat.contains(name) {
            return Err(DocumentError::block_exists(category, name));
        }
        tracing::debug!(category, block = name, "creating block");
        Ok(cat.insert(name.to_string(), block))
    }

    /// Replace the stages of an existing block
    ///
    /// # Errors
    /// [`DocumentError::BlockNotFound`] if the block does not exist
    pub fn update_block(
        &mut self,
        category: &str,
        name: &str,
        block: Block,
    ) -> Result<(), DocumentError> {
        let existing = self
            .block_mut(category, name)
            .ok_or_else(|| DocumentError::block_not_found(category, name))?;
        *existing = block;
        Ok(())
    }

    /// Delete a block. Returns true if it existed.
    pub fn delete_block(&mut self, category: &str, name: &str) -> bool {
        let removed = self
            .blocks
            .get_mut(category)
            .and_then(|cat| cat.remove(name))
            .is_some();
        if removed {
            tracing::debug!(category, block = name, "deleted block");
        }
        removed
    }

    /// Rename a block within its category, keeping its position
    ///
    /// # Errors
    /// - [`DocumentError::BlockNotFound`] if `old_name` does not exist
    /// - [`DocumentError::BlockExists`] if `new_name` is taken
    pub fn rename_block(
        &mut self,
        category: &str,
        old_name: &str,
        new_name: &str,
    ) -> Result<(), DocumentError> {
        if self.block(category, old_name).is_none() {
            return Err(DocumentError::block_not_found(category, old_name));
        }
        if self.block(category, new_name).is_some() {
            return Err(DocumentError::block_exists(category, new_name));
        }

        let renamed = self
            .blocks
            .get_mut(category)
            .is_some_and(|cat| cat.rename(old_name, new_name.to_string()));
        if !renamed {
            return Err(DocumentError::block_not_found(category, old_name));
        }

        tracing::debug!(category, from = old_name, to = new_name, "renamed block");
        Ok(())
    }

    /// Move a block to another category, creating it if needed
    ///
    /// # Errors
    /// - [`DocumentError::BlockNotFound`] if the block does not exist
    /// - [`DocumentError::BlockExists`] if the target category has the name
    pub fn move_block(
        &mut self,
        from_category: &str,
        name: &str,
        to_category: &str,
    ) -> Result<(), DocumentError> {
        if self.block(from_category, name).is_none() {
            return Err(DocumentError::block_not_found(from_category, name));
        }
        if self.block(to_category, name).is_some() {
            return Err(DocumentError::block_exists(to_category, name));
        }

        let block = self
            .blocks
            .get_mut(from_category)
            .and_then(|cat| cat.remove(name))
            .ok_or_else(|| DocumentError::block_not_found(from_category, name))?;

        self.blocks
            .entry(to_category.to_string())
            .or_default()
            .insert(name.to_string(), block);

        tracing::debug!(block = name, from = from_category, to = to_category, "moved block");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Stages
    // ------------------------------------------------------------------

    /// Stage names of a block; empty when the block is absent
    #[must_use]
    pub fn list_stages(&self, category: &str, block: &str) -> Vec<&str> {
        self.block(category, block)
            .map(Block::stage_names)
            .unwrap_or_default()
    }

    /// Stage by address
    #[inline]
    #[must_use]
    pub fn stage(&self, category: &str, block: &str, stage: &str) -> Option<&Stage> {
        self.block(category, block)?.stage(stage)
    }

    fn stage_mut_or_err(
        &mut self,
        category: &str,
        block: &str,
        stage: &str,
    ) -> Result<&mut Stage, DocumentError> {
        self.block_mut(category, block)
            .and_then(|b| b.stage_mut(stage))
            .ok_or_else(|| DocumentError::stage_not_found(category, block, stage))
    }

    /// Add a fresh stage (no versions, nothing selected) to a block
    ///
    /// An existing stage of the same name is replaced in place.
    ///
    /// # Errors
    /// [`DocumentError::BlockNotFound`] if the block does not exist
    pub fn add_stage(
        &mut self,
        category: &str,
        block: &str,
        stage: &str,
        input: &str,
    ) -> Result<&mut Stage, DocumentError> {
        let block_data = self
            .block_mut(category, block)
            .ok_or_else(|| DocumentError::block_not_found(category, block))?;
        Ok(block_data.insert_stage(stage, Stage::new(input)))
    }

    /// Replace the prompt template of a stage
    ///
    /// # Errors
    /// [`DocumentError::StageNotFound`] if the stage does not exist
    pub fn update_stage_input(
        &mut self,
        category: &str,
        block: &str,
        stage: &str,
        input: &str,
    ) -> Result<(), DocumentError> {
        self.stage_mut_or_err(category, block, stage)?.input = input.to_string();
        Ok(())
    }

    /// Delete a stage. Returns true if it existed.
    pub fn delete_stage(&mut self, category: &str, block: &str, stage: &str) -> bool {
        self.block_mut(category, block)
            .and_then(|b| b.remove_stage(stage))
            .is_some()
    }

    // ------------------------------------------------------------------
    // Versions
    // ------------------------------------------------------------------

    /// Add (or overwrite) a version in a stage's output
    ///
    /// # Errors
    /// [`DocumentError::StageNotFound`] if the stage does not exist
    pub fn add_version(
        &mut self,
        category: &str,
        block: &str,
        stage: &str,
        version: &str,
        content: &str,
    ) -> Result<(), DocumentError> {
        self.stage_mut_or_err(category, block, stage)?
            .output
            .insert(version.to_string(), content.to_string());
        Ok(())
    }

    /// Version content by key
    #[must_use]
    pub fn version(&self, category: &str, block: &str, stage: &str, version: &str) -> Option<&str> {
        self.stage(category, block, stage)?.version(version)
    }

    /// Make a version the active output of its stage
    ///
    /// # Errors
    /// - [`DocumentError::StageNotFound`] if the stage does not exist
    /// - [`DocumentError::VersionNotFound`] if the version does not exist
    pub fn select_version(
        &mut self,
        category: &str,
        block: &str,
        stage: &str,
        version: &str,
    ) -> Result<(), DocumentError> {
        let stage_data = self.stage_mut_or_err(category, block, stage)?;
        if !stage_data.output.contains_key(version) {
            return Err(DocumentError::VersionNotFound {
                category: category.to_string(),
                block: block.to_string(),
                stage: stage.to_string(),
                version: version.to_string(),
            });
        }
        stage_data.selected = version.to_string();
        Ok(())
    }

    /// Delete a version. Clears the selection if it pointed at it.
    /// Returns true if the version existed.
    pub fn delete_version(
        &mut self,
        category: &str,
        block: &str,
        stage: &str,
        version: &str,
    ) -> bool {
        let Some(stage_data) = self
            .block_mut(category, block)
            .and_then(|b| b.stage_mut(stage))
        else {
            return false;
        };
        if stage_data.output.shift_remove(version).is_none() {
            return false;
        }
        if stage_data.selected == version {
            stage_data.selected.clear();
        }
        true
    }

    /// Content of a stage's selected version
    #[must_use]
    pub fn selected_output(&self, category: &str, block: &str, stage: &str) -> Option<&str> {
        self.stage(category, block, stage)?.selected_content()
    }

    /// Version keys of a stage in insertion order
    #[must_use]
    pub fn list_versions(&self, category: &str, block: &str, stage: &str) -> Vec<&str> {
        self.stage(category, block, stage)
            .map(Stage::version_keys)
            .unwrap_or_default()
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new("", "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn project_with_alice() -> Project {
        let mut project = Project::new("Test", "");
        project.create_block("character", "alice").unwrap();
        project
            .add_stage("character", "alice", "raw", "Create character")
            .unwrap();
        project
    }

    #[test]
    fn project_new_has_defaults() {
        let project = Project::new("Test Story", "Test Author");

        assert_eq!(project.title(), "Test Story");
        assert_eq!(project.author(), "Test Author");
        assert_eq!(project.storyforge_version(), "1.0");
        assert_eq!(project.schema_version(), 1);
        assert!(project.list_categories().is_empty());
    }

    #[test]
    fn project_metadata_setters() {
        let mut project = Project::new("Original", "Someone");
        project.set_title("Updated");
        project.set_author("Someone Else");

        assert_eq!(project.title(), "Updated");
        assert_eq!(project.author(), "Someone Else");
    }

    #[test]
    fn category_create_is_idempotent() {
        let mut project = Project::default();
        project.create_category("character");
        project.create_category("character");

        assert_eq!(project.list_categories(), vec!["character"]);
    }

    #[test]
    fn category_delete() {
        let mut project = project_with_alice();

        assert!(project.delete_category("character"));
        assert!(!project.delete_category("character"));
        assert!(project.block("character", "alice").is_none());
    }

    #[test]
    fn block_create_creates_category() {
        let mut project = Project::default();
        let block = project.create_block("character", "alice").unwrap();

        assert!(block.is_empty());
        assert_eq!(project.list_categories(), vec!["character"]);
        assert_eq!(project.list_blocks("character"), vec!["alice"]);
    }

    #[test]
    fn block_create_duplicate_fails() {
        let mut project = project_with_alice();
        let result = project.create_block("character", "alice");

        assert!(matches!(result, Err(DocumentError::BlockExists { .. })));
    }

    #[test]
    fn block_same_name_in_two_categories() {
        let mut project = Project::default();
        project.create_block("character", "shadow").unwrap();
        project.create_block("location", "shadow").unwrap();

        let found: Vec<&str> = project
            .find_blocks("shadow")
            .into_iter()
            .map(|(cat, _)| cat)
            .collect();
        assert_eq!(found, vec!["character", "location"]);
    }

    #[test]
    fn block_insert_with_stages() {
        let mut project = Project::default();
        let block = Block::single("raw", Stage::new("test"));
        project.insert_block("character", "alice", block).unwrap();

        assert_eq!(project.stage("character", "alice", "raw").unwrap().input, "test");
    }

    #[test]
    fn block_update() {
        let mut project = project_with_alice();
        project
            .update_block("character", "alice", Block::single("updated", Stage::new("new")))
            .unwrap();

        assert_eq!(project.list_stages("character", "alice"), vec!["updated"]);
    }

    #[test]
    fn block_update_missing_fails() {
        let mut project = Project::default();
        let result = project.update_block("character", "alice", Block::new());

        assert!(matches!(result, Err(DocumentError::BlockNotFound { .. })));
    }

    #[test]
    fn block_delete() {
        let mut project = project_with_alice();

        assert!(project.delete_block("character", "alice"));
        assert!(!project.delete_block("character", "alice"));
        assert!(project.list_blocks("character").is_empty());
    }

    #[test]
    fn block_rename() {
        let mut project = project_with_alice();
        project.create_block("character", "carol").unwrap();

        project.rename_block("character", "alice", "bob").unwrap();

        assert_eq!(project.list_blocks("character"), vec!["bob", "carol"]);
        assert!(project.stage("character", "bob", "raw").is_some());
    }

    #[test]
    fn block_rename_errors() {
        let mut project = project_with_alice();
        project.create_block("character", "bob").unwrap();

        assert!(matches!(
            project.rename_block("character", "alice", "bob"),
            Err(DocumentError::BlockExists { .. })
        ));
        assert!(matches!(
            project.rename_block("character", "nobody", "new"),
            Err(DocumentError::BlockNotFound { .. })
        ));
    }

    #[test]
    fn block_move() {
        let mut project = project_with_alice();

        project.move_block("character", "alice", "npc").unwrap();

        assert_eq!(project.list_blocks("npc"), vec!["alice"]);
        assert!(project.list_blocks("character").is_empty());
        assert!(project.stage("npc", "alice", "raw").is_some());
    }

    #[test]
    fn block_move_onto_existing_fails() {
        let mut project = project_with_alice();
        project.create_block("npc", "alice").unwrap();

        let result = project.move_block("character", "alice", "npc");
        assert!(matches!(result, Err(DocumentError::BlockExists { .. })));
        assert!(project.block("character", "alice").is_some());
    }

    #[test]
    fn block_addresses_in_document_order() {
        let mut project = project_with_alice();
        project.create_block("location", "forest").unwrap();

        let addrs: Vec<String> = project
            .block_addresses()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(addrs, vec!["character:alice", "location:forest"]);
    }

    #[test]
    fn stage_add_is_fresh() {
        let mut project = project_with_alice();
        let stage = project.stage("character", "alice", "raw").unwrap();

        assert_eq!(stage.input, "Create character");
        assert!(stage.selected.is_empty());
        assert!(stage.output.is_empty());
    }

    #[test]
    fn stage_add_to_missing_block_fails() {
        let mut project = Project::default();
        let result = project.add_stage("character", "nobody", "raw", "");

        assert!(matches!(result, Err(DocumentError::BlockNotFound { .. })));
    }

    #[test]
    fn stage_update_input() {
        let mut project = project_with_alice();
        project
            .update_stage_input("character", "alice", "raw", "updated")
            .unwrap();

        assert_eq!(project.stage("character", "alice", "raw").unwrap().input, "updated");
        assert!(matches!(
            project.update_stage_input("character", "alice", "missing", "x"),
            Err(DocumentError::StageNotFound { .. })
        ));
    }

    #[test]
    fn stage_list_and_delete() {
        let mut project = project_with_alice();
        project.add_stage("character", "alice", "refined", "").unwrap();
        project.add_stage("character", "alice", "summary", "").unwrap();

        assert_eq!(
            project.list_stages("character", "alice"),
            vec!["raw", "refined", "summary"]
        );

        assert!(project.delete_stage("character", "alice", "raw"));
        assert!(!project.delete_stage("character", "alice", "raw"));
        assert_eq!(project.list_stages("character", "alice"), vec!["refined", "summary"]);
    }

    #[test]
    fn version_add_and_select() {
        let mut project = project_with_alice();
        project
            .add_version("character", "alice", "raw", "v1", "content v1")
            .unwrap();
        project
            .add_version("character", "alice", "raw", "v2", "content v2")
            .unwrap();
        project.select_version("character", "alice", "raw", "v2").unwrap();

        assert_eq!(project.list_versions("character", "alice", "raw"), vec!["v1", "v2"]);
        assert_eq!(
            project.selected_output("character", "alice", "raw"),
            Some("content v2")
        );
        assert_eq!(
            project.version("character", "alice", "raw", "v1"),
            Some("content v1")
        );
    }

    #[test]
    fn version_errors() {
        let mut project = project_with_alice();

        assert!(matches!(
            project.add_version("character", "alice", "missing", "v1", "x"),
            Err(DocumentError::StageNotFound { .. })
        ));
        assert!(matches!(
            project.select_version("character", "alice", "raw", "v1"),
            Err(DocumentError::VersionNotFound { .. })
        ));
    }

    #[test]
    fn version_delete_clears_selection() {
        let mut project = project_with_alice();
        project
            .add_version("character", "alice", "raw", "v1", "content")
            .unwrap();
        project.select_version("character", "alice", "raw", "v1").unwrap();

        assert!(project.delete_version("character", "alice", "raw", "v1"));
        assert!(!project.delete_version("character", "alice", "raw", "v1"));
        assert_eq!(project.selected_output("character", "alice", "raw"), None);
        assert!(project.stage("character", "alice", "raw").unwrap().selected.is_empty());
    }

    #[test]
    fn selected_output_without_selection() {
        let project = project_with_alice();
        assert_eq!(project.selected_output("character", "alice", "raw"), None);
    }

    #[test]
    fn document_schema_round_trip() {
        let json = r#"{
            "storyforge": "1.0",
            "schema_version": 1,
            "project": {"title": "Tale", "author": ""},
            "settings": {"llm_provider": "", "default_reference_mode": "summary"},
            "blocks": {
                "location": {
                    "forest": {
                        "output": {"input": "", "selected": "v1", "output": {"v1": "A dark wood."}}
                    }
                }
            },
            "tree": {"expanded_categories": [], "selected": ""}
        }"#;

        let project: Project = serde_json::from_str(json).unwrap();

        assert_eq!(project.title(), "Tale");
        assert_eq!(
            project.selected_output("location", "forest", "output"),
            Some("A dark wood.")
        );
        assert_eq!(project.settings().default_stage_preference, vec!["output", "raw"]);

        let encoded = serde_json::to_string(&project).unwrap();
        let decoded: Project = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, project);
    }
}

//! Categories, blocks and stages
//!
//! Every collection here is an [`IndexMap`] because insertion order is
//! observable: editors display it, and a reference without a stage falls back
//! to a block's first stage.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Named group of blocks (`character`, `location`, `prompts`, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category {
    blocks: IndexMap<String, Block>,
}

/// Named unit of content composed of ordered stages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Block {
    stages: IndexMap<String, Stage>,
}

/// Processing step of a block: prompt template plus generated versions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// Prompt template; may contain `[references]`
    #[serde(default, deserialize_with = "null_as_empty")]
    pub input: String,

    /// Key of the active version, empty when nothing is selected
    #[serde(default, deserialize_with = "null_as_empty")]
    pub selected: String,

    /// Version key -> content
    #[serde(default)]
    pub output: IndexMap<String, String>,
}

/// A bare `input:` in hand-edited YAML is null; read it as empty
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Category {
    /// Create empty category
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Block by name
    #[inline]
    #[must_use]
    pub fn block(&self, name: &str) -> Option<&Block> {
        self.blocks.get(name)
    }

    /// Mutable block by name
    #[inline]
    pub fn block_mut(&mut self, name: &str) -> Option<&mut Block> {
        self.blocks.get_mut(name)
    }

    /// Check if the category holds a block with this name
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.blocks.contains_key(name)
    }

    /// Iterate blocks in insertion order
    pub fn blocks(&self) -> impl Iterator<Item = (&str, &Block)> {
        self.blocks.iter().map(|(name, block)| (name.as_str(), block))
    }

    /// Block names in insertion order
    #[must_use]
    pub fn block_names(&self) -> Vec<&str> {
        self.blocks.keys().map(String::as_str).collect()
    }

    /// Number of blocks
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Check if category has no blocks
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub(crate) fn insert(&mut self, name: String, block: Block) -> &mut Block {
        match self.blocks.entry(name) {
            indexmap::map::Entry::Occupied(mut entry) => {
                entry.insert(block);
                entry.into_mut()
            }
            indexmap::map::Entry::Vacant(entry) => entry.insert(block),
        }
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<Block> {
        self.blocks.shift_remove(name)
    }

    /// Rename a block in place, keeping its position
    pub(crate) fn rename(&mut self, old: &str, new: String) -> bool {
        let Some(index) = self.blocks.get_index_of(old) else {
            return false;
        };
        let Some(block) = self.blocks.shift_remove(old) else {
            return false;
        };
        self.blocks.shift_insert(index, new, block);
        true
    }
}

impl Block {
    /// Create block without stages
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a simple block with a single stage (e.g. a static prompt
    /// template under `output`)
    #[must_use]
    pub fn single(stage_name: impl Into<String>, stage: Stage) -> Self {
        let mut block = Self::new();
        block.insert_stage(stage_name, stage);
        block
    }

    /// Stage by name
    #[inline]
    #[must_use]
    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages.get(name)
    }

    /// Mutable stage by name
    #[inline]
    pub fn stage_mut(&mut self, name: &str) -> Option<&mut Stage> {
        self.stages.get_mut(name)
    }

    /// First stage in insertion order
    #[inline]
    #[must_use]
    pub fn first_stage(&self) -> Option<(&str, &Stage)> {
        self.stages
            .first()
            .map(|(name, stage)| (name.as_str(), stage))
    }

    /// Iterate stages in insertion order
    pub fn stages(&self) -> impl Iterator<Item = (&str, &Stage)> {
        self.stages.iter().map(|(name, stage)| (name.as_str(), stage))
    }

    /// Stage names in insertion order
    #[must_use]
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.keys().map(String::as_str).collect()
    }

    /// Check if the block has a stage with this name
    #[inline]
    #[must_use]
    pub fn has_stage(&self, name: &str) -> bool {
        self.stages.contains_key(name)
    }

    /// Number of stages
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Check if block has no stages
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Insert or replace a stage. A replaced stage keeps its position.
    pub fn insert_stage(&mut self, name: impl Into<String>, stage: Stage) -> &mut Stage {
        match self.stages.entry(name.into()) {
            indexmap::map::Entry::Occupied(mut entry) => {
                entry.insert(stage);
                entry.into_mut()
            }
            indexmap::map::Entry::Vacant(entry) => entry.insert(stage),
        }
    }

    /// Remove a stage; remaining stages keep their order
    pub fn remove_stage(&mut self, name: &str) -> Option<Stage> {
        self.stages.shift_remove(name)
    }
}

impl Stage {
    /// Create stage with the given prompt template and no versions
    #[inline]
    #[must_use]
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            selected: String::new(),
            output: IndexMap::new(),
        }
    }

    /// Content of the selected version
    ///
    /// `None` when nothing is selected or the selection names a version that
    /// no longer exists.
    #[must_use]
    pub fn selected_content(&self) -> Option<&str> {
        if self.selected.is_empty() {
            return None;
        }
        self.output.get(&self.selected).map(String::as_str)
    }

    /// Version content by key
    #[inline]
    #[must_use]
    pub fn version(&self, key: &str) -> Option<&str> {
        self.output.get(key).map(String::as_str)
    }

    /// Version keys in insertion order
    #[must_use]
    pub fn version_keys(&self) -> Vec<&str> {
        self.output.keys().map(String::as_str).collect()
    }

    /// Add (or overwrite) a version and select it
    #[must_use]
    pub fn with_selected(mut self, key: impl Into<String>, content: impl Into<String>) -> Self {
        let key = key.into();
        self.output.insert(key.clone(), content.into());
        self.selected = key;
        self
    }
}

//! Project settings that steer reference resolution

use serde::{Deserialize, Serialize};

/// Stage names preferred when a reference does not name a stage
pub const DEFAULT_STAGE_PREFERENCE: [&str; 2] = ["output", "raw"];

/// Project-wide settings record
///
/// Missing keys in a loaded document fall back to their defaults, so older
/// project files without the resolution keys keep working.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// LLM provider identifier (opaque to the reference engine)
    pub llm_provider: String,

    /// Reference display mode used by editors (opaque to the reference engine)
    pub default_reference_mode: String,

    /// Stage names tried in order when a reference names no stage.
    /// After the list is exhausted the block's first stage is used.
    pub default_stage_preference: Vec<String>,

    /// Order in which the two readings of `[a:b]` are tried
    pub pair_resolution: PairResolution,
}

/// Interpretation order for two-segment references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairResolution {
    /// `[category:block]` first, then `[block:stage]`
    #[default]
    QualifiedFirst,

    /// `[block:stage]` first, then `[category:block]`
    StagedFirst,
}

impl Settings {
    /// Create default settings
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With an explicit default-stage preference list
    #[must_use]
    pub fn with_stage_preference<I, S>(mut self, stages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_stage_preference = stages.into_iter().map(Into::into).collect();
        self
    }

    /// With pair interpretation order
    #[inline]
    #[must_use]
    pub fn with_pair_resolution(mut self, order: PairResolution) -> Self {
        self.pair_resolution = order;
        self
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm_provider: String::new(),
            default_reference_mode: "summary".to_string(),
            default_stage_preference: DEFAULT_STAGE_PREFERENCE
                .iter()
                .map(ToString::to_string)
                .collect(),
            pair_resolution: PairResolution::QualifiedFirst,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_default_preference() {
        let settings = Settings::default();
        assert_eq!(settings.default_stage_preference, vec!["output", "raw"]);
        assert_eq!(settings.pair_resolution, PairResolution::QualifiedFirst);
        assert_eq!(settings.default_reference_mode, "summary");
    }

    #[test]
    fn settings_missing_keys_take_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{"llm_provider": "local"}"#).unwrap();

        assert_eq!(settings.llm_provider, "local");
        assert_eq!(settings.default_stage_preference, vec!["output", "raw"]);
    }

    #[test]
    fn settings_pair_resolution_snake_case() {
        let settings: Settings =
            serde_json::from_str(r#"{"pair_resolution": "staged_first"}"#).unwrap();
        assert_eq!(settings.pair_resolution, PairResolution::StagedFirst);
    }

    #[test]
    fn settings_builders() {
        let settings = Settings::new()
            .with_stage_preference(["summary"])
            .with_pair_resolution(PairResolution::StagedFirst);

        assert_eq!(settings.default_stage_preference, vec!["summary"]);
        assert_eq!(settings.pair_resolution, PairResolution::StagedFirst);
    }
}

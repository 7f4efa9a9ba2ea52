use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    /// Expand named fragment spreads into the merged selection.
    /// When `false`, spreads stay opaque and are emitted as references to their fragment.
    ///
    /// Default: `true`.
    #[serde(default = "default_merge_fragment_spreads")]
    pub merge_fragment_spreads: bool,

    /// Maximum nesting of selection sets (including expanded fragments) before merging fails.
    ///
    /// Default: `128`.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            merge_fragment_spreads: default_merge_fragment_spreads(),
            max_depth: default_max_depth(),
        }
    }
}

fn default_merge_fragment_spreads() -> bool {
    true
}

fn default_max_depth() -> usize {
    128
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tool versions stamped at the top of generated files.
#[derive(Debug, Default, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(deny_unknown_fields)]
pub struct VersionsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cli_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codegen_version: Option<String>,
}

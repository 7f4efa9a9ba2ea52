pub mod log;
pub mod merge;
pub mod versions;

use std::convert::Infallible;
use std::path::PathBuf;

use config::{Config, File, FileFormat, FileSourceFile};
use model_codegen_core::output::Frontend;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{log::LoggingConfig, merge::MergeConfig, versions::VersionsConfig};

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CodegenConfig {
    /// The logger configuration. Quiet (`warn`) unless configured otherwise.
    #[serde(default)]
    pub log: LoggingConfig,

    /// Field merging configuration.
    #[serde(default)]
    pub merge: MergeConfig,

    /// The platform models are generated for: `javascript`, `android`, `ios` or `flutter`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub frontend: Option<Frontend>,

    /// Versions written into the header comment of generated files.
    #[serde(default)]
    pub versions: VersionsConfig,
}

#[derive(Debug, thiserror::Error)]
pub enum CodegenConfigError {
    #[error("Failed to load configuration: {0}")]
    ConfigLoadError(#[from] config::ConfigError),
    #[error("Failed to parse the configuration file path: {0}")]
    ConfigPathParseError(Infallible),
}

static DEFAULT_FILE_NAMES: &[&str] = &[
    "codegen.config.yaml",
    "codegen.config.yml",
    "codegen.config.json",
];

/// Loads the configuration from `override_config_path`, or from the first
/// `codegen.config.*` file found in the working directory. Missing default
/// files are fine and yield the defaults.
pub fn load_config(
    override_config_path: Option<String>,
) -> Result<CodegenConfig, CodegenConfigError> {
    let mut config = Config::builder();

    if let Some(path_str) = override_config_path {
        let path_buf = path_str
            .parse::<PathBuf>()
            .map_err(CodegenConfigError::ConfigPathParseError)?;
        debug!(path = %path_buf.display(), "loading configuration file");
        let as_file: File<FileSourceFile, _> = path_buf.into();

        config = config.add_source(as_file.required(true));
    } else {
        for name in DEFAULT_FILE_NAMES {
            config = config.add_source(File::with_name(name).required(false));
        }
    }

    Ok(config.build()?.try_deserialize::<CodegenConfig>()?)
}

pub fn parse_yaml_config(config_raw: String) -> Result<CodegenConfig, CodegenConfigError> {
    Config::builder()
        .add_source(File::from_str(&config_raw, FileFormat::Yaml))
        .build()?
        .try_deserialize::<CodegenConfig>()
        .map_err(CodegenConfigError::ConfigLoadError)
}

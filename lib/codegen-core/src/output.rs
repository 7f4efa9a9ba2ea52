use std::{fmt::Display, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

/// Platform the generated models are written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frontend {
    Javascript,
    Android,
    Ios,
    Flutter,
}

impl Frontend {
    pub const ALL: [Frontend; 4] = [
        Frontend::Javascript,
        Frontend::Android,
        Frontend::Ios,
        Frontend::Flutter,
    ];

    /// Output directory of the models, relative to the project root.
    pub fn output_dir(&self) -> PathBuf {
        let segments: &[&str] = match self {
            Frontend::Javascript => &["src", "models"],
            Frontend::Android => &[
                "app",
                "src",
                "main",
                "java",
                "com",
                "amplifyframework",
                "datastore",
                "generated",
                "model",
            ],
            Frontend::Ios => &["amplify", "generated", "models"],
            Frontend::Flutter => &["lib", "models"],
        };

        segments.iter().collect()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Frontend::Javascript => "javascript",
            Frontend::Android => "android",
            Frontend::Ios => "ios",
            Frontend::Flutter => "flutter",
        }
    }
}

impl Display for Frontend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Frontend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "javascript" => Ok(Frontend::Javascript),
            "android" => Ok(Frontend::Android),
            "ios" => Ok(Frontend::Ios),
            "flutter" => Ok(Frontend::Flutter),
            _ => Err(format!("Unknown frontend: {}", s)),
        }
    }
}

fn non_empty(version: Option<&str>) -> Option<&str> {
    version.map(str::trim).filter(|v| !v.is_empty())
}

/// `// Generated using amplify-cli-version: <v>, amplify-codegen-version: <v>`.
/// A clause is left out when its version is missing; `None` when both are.
pub fn version_comment(cli_version: Option<&str>, codegen_version: Option<&str>) -> Option<String> {
    let clauses: Vec<String> = [
        non_empty(cli_version).map(|v| format!("amplify-cli-version: {}", v)),
        non_empty(codegen_version).map(|v| format!("amplify-codegen-version: {}", v)),
    ]
    .into_iter()
    .flatten()
    .collect();

    if clauses.is_empty() {
        return None;
    }

    Some(format!("// Generated using {}", clauses.join(", ")))
}

pub fn prefix_with_version_comment(
    body: &str,
    cli_version: Option<&str>,
    codegen_version: Option<&str>,
) -> String {
    match version_comment(cli_version, codegen_version) {
        Some(comment) => format!("{}\n\n{}", comment, body),
        None => body.to_string(),
    }
}

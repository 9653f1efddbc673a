//! JSON output types for machine-readable CLI output.
//!
//! Used by the `--json` flag on `import`, `query` and `check`.

use serde::{Deserialize, Serialize};
use skinio_core::{Reconciliation, SkinError};

/// Error codes for CLI-level failures that do not come from the library.
pub mod error_codes {
    /// Argument, scene snapshot or other CLI failure
    pub const INTERNAL: &str = "CLI_001";
}

/// A structured error in JSON output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonError {
    /// Stable error code (e.g. "SKIN_004", "CLI_001")
    pub code: String,
    /// Error category (e.g. "document", "reconcile")
    pub category: String,
    /// Human-readable error message
    pub message: String,
}

impl From<&SkinError> for JsonError {
    fn from(err: &SkinError) -> Self {
        Self {
            code: err.code().to_string(),
            category: err.category().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<&anyhow::Error> for JsonError {
    fn from(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<SkinError>() {
            Some(skin) => Self::from(skin),
            None => Self {
                code: error_codes::INTERNAL.to_string(),
                category: "cli".to_string(),
                message: format!("{:#}", err),
            },
        }
    }
}

/// One saved influence and where it ended up.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct JsonSubstitution {
    pub saved: String,
    pub resolved: String,
    pub resolution: String,
}

/// Result of importing onto one mesh.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportResult {
    pub mesh: String,
    pub file: String,
    pub success: bool,
    /// Influences whose name changed on the way in
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub substitutions: Vec<JsonSubstitution>,
    /// Influences added to the binding
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<String>,
    /// Resolved names with no live column
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dropped: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonError>,
}

impl ImportResult {
    /// Builds a successful entry from a reconciliation.
    pub fn succeeded(
        mesh: &str,
        file: &str,
        reconciliation: &Reconciliation,
        dropped: &[String],
    ) -> Self {
        Self {
            mesh: mesh.to_string(),
            file: file.to_string(),
            success: true,
            substitutions: reconciliation
                .substitutions()
                .map(|s| JsonSubstitution {
                    saved: s.saved.clone(),
                    resolved: s.resolved.clone(),
                    resolution: s.resolution.as_str().to_string(),
                })
                .collect(),
            added: reconciliation.to_register.clone(),
            dropped: dropped.to_vec(),
            error: None,
        }
    }

    /// Builds a failed entry.
    pub fn failed(mesh: &str, file: &str, error: JsonError) -> Self {
        Self {
            mesh: mesh.to_string(),
            file: file.to_string(),
            success: false,
            substitutions: Vec::new(),
            added: Vec::new(),
            dropped: Vec::new(),
            error: Some(error),
        }
    }
}

/// Output of `import --json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportOutput {
    pub success: bool,
    pub results: Vec<ImportResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene_file: Option<String>,
}

/// Output of `query --json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryOutput {
    pub success: bool,
    pub file: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub influences: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertex_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonError>,
}

/// Output of `check --json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckOutput {
    pub success: bool,
    pub mesh: String,
    pub max_influences: usize,
    pub over_influenced: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonError>,
}

//! Error types for skin weight operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for skin weight operations.
pub type SkinResult<T> = Result<T, SkinError>;

/// Errors that can occur while exporting, importing or editing skin weights.
#[derive(Debug, Error)]
pub enum SkinError {
    /// The persisted document is malformed, incomplete or inconsistent.
    #[error("Invalid skin weight document: {message}")]
    InvalidDocument { message: String },

    /// The document file does not exist.
    #[error("Skin weight file not found: {path}")]
    NotFound { path: PathBuf },

    /// The document was captured from a mesh with a different vertex count.
    #[error("Mismatched topologies: document covers {expected} vertices, target has {actual}")]
    TopologyMismatch { expected: usize, actual: usize },

    /// One or more saved influences could not be resolved in the scene.
    #[error("Unable to load skin weights, the following influences were missing: {}", .names.join(", "))]
    MissingInfluence { names: Vec<String> },

    /// The mesh has no skin binding.
    #[error("No skin binding found on mesh '{mesh}'")]
    NoBinding { mesh: String },

    /// A target influence list was supplied with the wrong length.
    #[error("Target list has {actual} influences but the document has {expected}")]
    TargetListMismatch { expected: usize, actual: usize },

    /// The rename pattern is not a valid regular expression.
    #[error("Invalid rename pattern: {0}")]
    InvalidRenameRule(#[source] regex::Error),

    /// A max influence count of zero was requested.
    #[error("Max influences must be at least 1, got {value}")]
    InvalidMaxInfluences { value: usize },

    /// The scene has no mesh with this name.
    #[error("Unknown mesh '{name}'")]
    UnknownMesh { name: String },

    /// The scene has no object with this name.
    #[error("Unknown object '{name}'")]
    UnknownObject { name: String },

    /// The scene rejected a request.
    #[error("Scene error: {message}")]
    Scene { message: String },

    /// IO error during file operations.
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to encode a document.
    #[error("Failed to serialize skin weight document: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl SkinError {
    /// Creates a new invalid document error.
    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument {
            message: message.into(),
        }
    }

    /// Creates a new scene error.
    pub fn scene(message: impl Into<String>) -> Self {
        Self::Scene {
            message: message.into(),
        }
    }

    /// Creates a new IO error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns the stable error code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            SkinError::InvalidDocument { .. } => "SKIN_001",
            SkinError::NotFound { .. } => "SKIN_002",
            SkinError::TopologyMismatch { .. } => "SKIN_003",
            SkinError::MissingInfluence { .. } => "SKIN_004",
            SkinError::NoBinding { .. } => "SKIN_005",
            SkinError::TargetListMismatch { .. } => "SKIN_006",
            SkinError::InvalidRenameRule(_) => "SKIN_007",
            SkinError::InvalidMaxInfluences { .. } => "SKIN_008",
            SkinError::UnknownMesh { .. } => "SKIN_009",
            SkinError::UnknownObject { .. } => "SKIN_010",
            SkinError::Scene { .. } => "SKIN_011",
            SkinError::Io { .. } => "SKIN_012",
            SkinError::Serialize(_) => "SKIN_013",
        }
    }

    /// Returns the error category.
    pub fn category(&self) -> &'static str {
        match self {
            SkinError::InvalidDocument { .. }
            | SkinError::NotFound { .. }
            | SkinError::Io { .. }
            | SkinError::Serialize(_) => "document",
            SkinError::TopologyMismatch { .. }
            | SkinError::MissingInfluence { .. }
            | SkinError::TargetListMismatch { .. }
            | SkinError::InvalidRenameRule(_) => "reconcile",
            SkinError::InvalidMaxInfluences { .. } => "prune",
            SkinError::NoBinding { .. }
            | SkinError::UnknownMesh { .. }
            | SkinError::UnknownObject { .. }
            | SkinError::Scene { .. } => "scene",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SkinError::TopologyMismatch {
            expected: 1000,
            actual: 998,
        };
        assert!(err.to_string().contains("1000"));
        assert!(err.to_string().contains("998"));

        let err = SkinError::NoBinding {
            mesh: "body".to_string(),
        };
        assert!(err.to_string().contains("'body'"));
    }

    #[test]
    fn test_missing_influence_lists_every_name() {
        let err = SkinError::MissingInfluence {
            names: vec!["spine_tip".to_string(), "hand_l".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("spine_tip"));
        assert!(message.contains("hand_l"));
    }

    #[test]
    fn test_codes_and_categories() {
        let err = SkinError::invalid_document("no influences");
        assert_eq!(err.code(), "SKIN_001");
        assert_eq!(err.category(), "document");

        let err = SkinError::InvalidMaxInfluences { value: 0 };
        assert_eq!(err.code(), "SKIN_008");
        assert_eq!(err.category(), "prune");
    }
}

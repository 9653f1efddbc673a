//! Influence references.

use serde::{Deserialize, Serialize};

/// Separator between names in a hierarchy path.
pub const PATH_SEPARATOR: char = '|';

/// One skeletal joint acting as a weight target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InfluenceRef {
    /// Leaf identifier. May collide across the hierarchy.
    pub partial_name: String,
    /// Root-to-leaf path, names joined by `|`. Unique.
    pub full_path: String,
}

impl InfluenceRef {
    /// Creates a new influence reference.
    pub fn new(partial_name: impl Into<String>, full_path: impl Into<String>) -> Self {
        Self {
            partial_name: partial_name.into(),
            full_path: full_path.into(),
        }
    }

    /// Creates a reference from a full path, taking the leaf as partial name.
    pub fn from_full_path(full_path: impl Into<String>) -> Self {
        let full_path = full_path.into();
        let partial_name = full_path
            .rsplit(PATH_SEPARATOR)
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            partial_name,
            full_path,
        }
    }

    /// Returns the non-empty names of the full path, root first.
    pub fn path_segments(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.full_path
            .split(PATH_SEPARATOR)
            .filter(|segment| !segment.is_empty())
    }

    /// Returns the ancestors of this influence, immediate parent first.
    ///
    /// The leaf itself is not included.
    pub fn ancestors(&self) -> Vec<&str> {
        let mut segments: Vec<&str> = self.path_segments().collect();
        segments.pop();
        segments.reverse();
        segments
    }
}

//! Argument helpers shared by the commands.
//!
//! Vertex selections are given on the command line as comma separated indices
//! and inclusive ranges, e.g. `0,4,10-19`.

use anyhow::{bail, Context, Result};
use skinio_core::MemoryScene;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Parses a vertex selection such as `0,4,10-19`.
///
/// Indices are deduplicated and returned in ascending order.
pub fn parse_vertex_list(text: &str) -> Result<Vec<u32>> {
    let mut vertices = BTreeSet::new();

    for part in text.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                let start = parse_index(start, part)?;
                let end = parse_index(end, part)?;
                if start > end {
                    bail!("invalid vertex range '{}': start is after end", part);
                }
                vertices.extend(start..=end);
            }
            None => {
                vertices.insert(parse_index(part, part)?);
            }
        }
    }

    if vertices.is_empty() {
        bail!("vertex selection '{}' is empty", text);
    }
    Ok(vertices.into_iter().collect())
}

fn parse_index(text: &str, part: &str) -> Result<u32> {
    text.trim()
        .parse::<u32>()
        .with_context(|| format!("invalid vertex index in '{}'", part))
}

/// Parses an optional vertex selection argument.
pub fn parse_vertices(arg: Option<&str>) -> Result<Option<Vec<u32>>> {
    arg.map(parse_vertex_list).transpose()
}

/// Loads a scene snapshot.
pub fn load_scene(path: &str) -> Result<MemoryScene> {
    MemoryScene::load(Path::new(path))
        .with_context(|| format!("Failed to load scene: {}", path))
}

/// Writes a modified scene to `save_to`, or back over `scene_path`.
pub fn save_scene(scene: &MemoryScene, scene_path: &str, save_to: Option<&str>) -> Result<PathBuf> {
    let target = PathBuf::from(save_to.unwrap_or(scene_path));
    scene
        .save(&target)
        .with_context(|| format!("Failed to save scene: {}", target.display()))?;
    log::debug!("wrote scene snapshot {}", target.display());
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vertex_list_indices_and_ranges() {
        assert_eq!(parse_vertex_list("0,4,10-12").unwrap(), vec![0, 4, 10, 11, 12]);
        assert_eq!(parse_vertex_list(" 3 , 1-2 ,3").unwrap(), vec![1, 2, 3]);
        assert_eq!(parse_vertex_list("7-7").unwrap(), vec![7]);
    }

    #[test]
    fn test_parse_vertex_list_rejects_bad_input() {
        assert!(parse_vertex_list("").is_err());
        assert!(parse_vertex_list(",,").is_err());
        assert!(parse_vertex_list("5-2").is_err());
        assert!(parse_vertex_list("a").is_err());
        assert!(parse_vertex_list("-1").is_err());
    }

    #[test]
    fn test_parse_vertices_optional() {
        assert_eq!(parse_vertices(None).unwrap(), None);
        assert_eq!(parse_vertices(Some("1")).unwrap(), Some(vec![1]));
    }

    #[test]
    fn test_save_scene_defaults_to_source_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        let mut scene = MemoryScene::new();
        scene.add_joint("root", None);
        let path_str = path.to_str().unwrap();

        let written = save_scene(&scene, path_str, None).unwrap();
        assert_eq!(written, path);
        assert_eq!(load_scene(path_str).unwrap(), scene);
    }
}

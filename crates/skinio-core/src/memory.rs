//! An in-memory [`Scene`] that can be saved to and loaded from JSON.
//!
//! Used by the CLI to work on scene snapshots and by tests as a stand-in for a
//! live host scene.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SkinError, SkinResult};
use crate::influence::{InfluenceRef, PATH_SEPARATOR};
use crate::scene::Scene;

/// Kind of a hierarchy node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A skeletal joint.
    Joint,
    /// A plain transform (group, control, locator).
    Transform,
}

/// A named hierarchy node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

/// A skin binding: influences plus a dense vertex-by-influence weight table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinBinding {
    pub name: String,
    pub influences: Vec<String>,
    pub max_influences: usize,
    pub weights: Vec<f64>,
}

/// A mesh with an optional skin binding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshNode {
    pub name: String,
    pub vertex_count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skin: Option<SkinBinding>,
}

/// A scene held entirely in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryScene {
    #[serde(default)]
    pub nodes: Vec<SceneNode>,
    #[serde(default)]
    pub meshes: Vec<MeshNode>,
}

impl MemoryScene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a scene snapshot from a JSON file.
    pub fn load(path: &Path) -> SkinResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SkinError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                SkinError::io(path, e)
            }
        })?;
        let scene: MemoryScene = serde_json::from_str(&text)
            .map_err(|e| SkinError::scene(format!("invalid scene file {}: {}", path.display(), e)))?;
        scene.check()?;
        Ok(scene)
    }

    /// Writes the scene as pretty JSON.
    pub fn save(&self, path: &Path) -> SkinResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(SkinError::Serialize)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SkinError::io(parent, e))?;
        }
        fs::write(path, json).map_err(|e| SkinError::io(path, e))
    }

    /// Adds a joint under `parent`.
    pub fn add_joint(&mut self, name: &str, parent: Option<&str>) {
        self.add_node(name, NodeKind::Joint, parent);
    }

    /// Adds a plain transform under `parent`.
    pub fn add_transform(&mut self, name: &str, parent: Option<&str>) {
        self.add_node(name, NodeKind::Transform, parent);
    }

    fn add_node(&mut self, name: &str, kind: NodeKind, parent: Option<&str>) {
        self.nodes.push(SceneNode {
            name: name.to_string(),
            kind,
            parent: parent.map(str::to_string),
        });
    }

    /// Adds an unbound mesh.
    pub fn add_mesh(&mut self, name: &str, vertex_count: usize) {
        self.meshes.push(MeshNode {
            name: name.to_string(),
            vertex_count,
            skin: None,
        });
    }

    /// Binds `mesh` to `influences`; every vertex starts fully weighted to the
    /// first influence.
    pub fn bind(
        &mut self,
        mesh: &str,
        skin: &str,
        influences: &[&str],
        max_influences: usize,
    ) -> SkinResult<()> {
        if influences.is_empty() {
            return Err(SkinError::scene("a skin binding needs at least one influence"));
        }
        for name in influences {
            if self.node(name).is_none() {
                return Err(SkinError::UnknownObject {
                    name: name.to_string(),
                });
            }
        }
        let mesh = self.mesh_mut(mesh)?;
        let mut weights = vec![0.0; mesh.vertex_count * influences.len()];
        for row in weights.chunks_exact_mut(influences.len()) {
            row[0] = 1.0;
        }
        mesh.skin = Some(SkinBinding {
            name: skin.to_string(),
            influences: influences.iter().map(|s| s.to_string()).collect(),
            max_influences,
            weights,
        });
        Ok(())
    }

    /// Replaces the whole weight table of a bound mesh.
    pub fn set_all_weights(&mut self, mesh: &str, weights: Vec<f64>) -> SkinResult<()> {
        let node = self.mesh_mut(mesh)?;
        let vertex_count = node.vertex_count;
        let name = node.name.clone();
        let binding = node
            .skin
            .as_mut()
            .ok_or(SkinError::NoBinding { mesh: name })?;
        let expected = vertex_count * binding.influences.len();
        if weights.len() != expected {
            return Err(SkinError::scene(format!(
                "expected {} weights, got {}",
                expected,
                weights.len()
            )));
        }
        binding.weights = weights;
        Ok(())
    }

    /// The skin binding of `mesh`, if any.
    pub fn binding(&self, mesh: &str) -> Option<&SkinBinding> {
        self.meshes
            .iter()
            .find(|m| m.name == mesh)
            .and_then(|m| m.skin.as_ref())
    }

    /// Full `|`-separated path of a node, root first.
    pub fn full_path(&self, name: &str) -> String {
        let mut segments = vec![name];
        let mut current = self.node(name);
        while let Some(parent) = current.and_then(|n| n.parent.as_deref()) {
            if segments.contains(&parent) {
                break;
            }
            segments.push(parent);
            current = self.node(parent);
        }
        segments.reverse();
        let mut path = String::new();
        for segment in segments {
            path.push(PATH_SEPARATOR);
            path.push_str(segment);
        }
        path
    }

    fn node(&self, name: &str) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    fn mesh(&self, name: &str) -> SkinResult<&MeshNode> {
        self.meshes
            .iter()
            .find(|m| m.name == name)
            .ok_or_else(|| SkinError::UnknownMesh {
                name: name.to_string(),
            })
    }

    fn mesh_mut(&mut self, name: &str) -> SkinResult<&mut MeshNode> {
        self.meshes
            .iter_mut()
            .find(|m| m.name == name)
            .ok_or_else(|| SkinError::UnknownMesh {
                name: name.to_string(),
            })
    }

    fn skin(&self, skin: &str) -> SkinResult<(&MeshNode, &SkinBinding)> {
        self.meshes
            .iter()
            .find_map(|m| m.skin.as_ref().filter(|s| s.name == skin).map(|s| (m, s)))
            .ok_or_else(|| SkinError::UnknownObject {
                name: skin.to_string(),
            })
    }

    fn bound_mesh(&self, mesh: &str) -> SkinResult<(&MeshNode, &SkinBinding)> {
        let node = self.mesh(mesh)?;
        let binding = node.skin.as_ref().ok_or_else(|| SkinError::NoBinding {
            mesh: mesh.to_string(),
        })?;
        Ok((node, binding))
    }

    fn check(&self) -> SkinResult<()> {
        for mesh in &self.meshes {
            if let Some(ref binding) = mesh.skin {
                if binding.influences.is_empty() {
                    return Err(SkinError::scene(format!(
                        "skin '{}' on mesh '{}' has no influences",
                        binding.name, mesh.name
                    )));
                }
                let expected = mesh.vertex_count * binding.influences.len();
                if binding.weights.len() != expected {
                    return Err(SkinError::scene(format!(
                        "mesh '{}' has {} weights, expected {}",
                        mesh.name,
                        binding.weights.len(),
                        expected
                    )));
                }
            }
        }
        Ok(())
    }
}

fn check_indices(
    mesh: &MeshNode,
    binding: &SkinBinding,
    vertices: &[u32],
    influence_indices: &[usize],
) -> SkinResult<()> {
    if let Some(v) = vertices.iter().find(|v| **v as usize >= mesh.vertex_count) {
        return Err(SkinError::scene(format!(
            "vertex {} out of range for mesh '{}' ({} vertices)",
            v, mesh.name, mesh.vertex_count
        )));
    }
    if let Some(i) = influence_indices
        .iter()
        .find(|i| **i >= binding.influences.len())
    {
        return Err(SkinError::scene(format!(
            "influence index {} out of range for '{}' ({} influences)",
            i,
            binding.name,
            binding.influences.len()
        )));
    }
    Ok(())
}

impl Scene for MemoryScene {
    fn skin_binding(&self, mesh: &str) -> SkinResult<Option<String>> {
        Ok(self.mesh(mesh)?.skin.as_ref().map(|s| s.name.clone()))
    }

    fn resolve_influences(&self, skin: &str) -> SkinResult<Vec<InfluenceRef>> {
        let (_, binding) = self.skin(skin)?;
        Ok(binding
            .influences
            .iter()
            .map(|name| InfluenceRef::new(name.clone(), self.full_path(name)))
            .collect())
    }

    fn vertex_count(&self, mesh: &str) -> SkinResult<usize> {
        Ok(self.mesh(mesh)?.vertex_count)
    }

    fn vertex_weights(
        &self,
        mesh: &str,
        vertices: &[u32],
        influence_indices: &[usize],
    ) -> SkinResult<Vec<f64>> {
        let (node, binding) = self.bound_mesh(mesh)?;
        check_indices(node, binding, vertices, influence_indices)?;

        let stride = binding.influences.len();
        let mut out = Vec::with_capacity(vertices.len() * influence_indices.len());
        for &v in vertices {
            let row = &binding.weights[v as usize * stride..(v as usize + 1) * stride];
            out.extend(influence_indices.iter().map(|&i| row[i]));
        }
        Ok(out)
    }

    fn set_vertex_weights(
        &mut self,
        mesh: &str,
        vertices: &[u32],
        influence_indices: &[usize],
        weights: &[f64],
        normalize: bool,
    ) -> SkinResult<Vec<f64>> {
        if weights.len() != vertices.len() * influence_indices.len() {
            return Err(SkinError::scene(format!(
                "expected {} weights for {} vertices x {} influences, got {}",
                vertices.len() * influence_indices.len(),
                vertices.len(),
                influence_indices.len(),
                weights.len()
            )));
        }
        let previous = self.vertex_weights(mesh, vertices, influence_indices)?;

        let node = self.mesh_mut(mesh)?;
        let binding = node.skin.as_mut().ok_or_else(|| SkinError::NoBinding {
            mesh: mesh.to_string(),
        })?;
        let stride = binding.influences.len();
        let columns = influence_indices.len().max(1);
        for (&v, values) in vertices.iter().zip(weights.chunks(columns)) {
            let row = &mut binding.weights[v as usize * stride..(v as usize + 1) * stride];
            for (&i, &w) in influence_indices.iter().zip(values) {
                row[i] = w;
            }
            if normalize {
                let sum: f64 = row.iter().sum();
                if sum > 0.0 {
                    row.iter_mut().for_each(|w| *w /= sum);
                }
            }
        }
        Ok(previous)
    }

    fn object_exists(&self, name: &str) -> bool {
        self.node(name).is_some()
            || self.meshes.iter().any(|m| {
                m.name == name || m.skin.as_ref().is_some_and(|s| s.name == name)
            })
    }

    fn is_joint(&self, name: &str) -> bool {
        self.node(name).is_some_and(|n| n.kind == NodeKind::Joint)
    }

    fn add_influence(&mut self, skin: &str, name: &str) -> SkinResult<()> {
        if !self.object_exists(name) {
            return Err(SkinError::UnknownObject {
                name: name.to_string(),
            });
        }
        let mesh = self
            .meshes
            .iter_mut()
            .find(|m| m.skin.as_ref().is_some_and(|s| s.name == skin))
            .ok_or_else(|| SkinError::UnknownObject {
                name: skin.to_string(),
            })?;
        let vertex_count = mesh.vertex_count;
        let Some(binding) = mesh.skin.as_mut() else {
            return Err(SkinError::UnknownObject {
                name: skin.to_string(),
            });
        };
        if binding.influences.iter().any(|i| i == name) {
            return Ok(());
        }

        let old_stride = binding.influences.len();
        let mut weights = Vec::with_capacity(vertex_count * (old_stride + 1));
        for row in binding.weights.chunks_exact(old_stride) {
            weights.extend_from_slice(row);
            weights.push(0.0);
        }
        binding.weights = weights;
        binding.influences.push(name.to_string());
        Ok(())
    }

    fn max_influences(&self, skin: &str) -> SkinResult<usize> {
        Ok(self.skin(skin)?.1.max_influences)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rigged() -> MemoryScene {
        let mut scene = MemoryScene::new();
        scene.add_joint("root", None);
        scene.add_joint("spine", Some("root"));
        scene.add_joint("neck", Some("spine"));
        scene.add_mesh("body", 3);
        scene.bind("body", "skin1", &["root", "spine"], 4).unwrap();
        scene
    }

    #[test]
    fn test_full_path() {
        let scene = rigged();
        assert_eq!(scene.full_path("neck"), "|root|spine|neck");
        assert_eq!(scene.full_path("root"), "|root");
    }

    #[test]
    fn test_resolve_influences() {
        let scene = rigged();
        let influences = scene.resolve_influences("skin1").unwrap();
        assert_eq!(
            influences,
            vec![
                InfluenceRef::new("root", "|root"),
                InfluenceRef::new("spine", "|root|spine"),
            ]
        );
    }

    #[test]
    fn test_set_weights_returns_previous() {
        let mut scene = rigged();
        let previous = scene
            .set_vertex_weights("body", &[1, 2], &[0, 1], &[0.25, 0.75, 0.5, 0.5], false)
            .unwrap();
        assert_eq!(previous, vec![1.0, 0.0, 1.0, 0.0]);
        assert_eq!(
            scene.vertex_weights("body", &[1], &[1]).unwrap(),
            vec![0.75]
        );
    }

    #[test]
    fn test_set_weights_normalizes() {
        let mut scene = rigged();
        scene
            .set_vertex_weights("body", &[0], &[0, 1], &[1.0, 3.0], true)
            .unwrap();
        assert_eq!(
            scene.vertex_weights("body", &[0], &[0, 1]).unwrap(),
            vec![0.25, 0.75]
        );
    }

    #[test]
    fn test_add_influence_appends_zero_column() {
        let mut scene = rigged();
        scene.add_influence("skin1", "neck").unwrap();
        let binding = scene.binding("body").unwrap();
        assert_eq!(binding.influences, vec!["root", "spine", "neck"]);
        assert_eq!(binding.weights, vec![1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);

        scene.add_influence("skin1", "neck").unwrap();
        assert_eq!(scene.binding("body").unwrap().influences.len(), 3);
        assert!(scene.add_influence("skin1", "ghost").is_err());
    }

    #[test]
    fn test_out_of_range_vertex() {
        let scene = rigged();
        assert!(scene.vertex_weights("body", &[3], &[0]).is_err());
        assert!(scene.vertex_weights("body", &[0], &[2]).is_err());
    }

    #[test]
    fn test_unbound_mesh() {
        let mut scene = rigged();
        scene.add_mesh("prop", 4);
        assert_eq!(scene.skin_binding("prop").unwrap(), None);
        assert!(matches!(
            scene.vertex_weights("prop", &[0], &[0]),
            Err(SkinError::NoBinding { .. })
        ));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        let scene = rigged();
        scene.save(&path).unwrap();
        assert_eq!(MemoryScene::load(&path).unwrap(), scene);
    }

    #[test]
    fn test_load_rejects_inconsistent_weights() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        let mut scene = rigged();
        scene.meshes[0].skin.as_mut().unwrap().weights.pop();
        scene.save(&path).unwrap();
        assert!(MemoryScene::load(&path).is_err());
    }
}

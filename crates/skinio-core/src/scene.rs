//! The host scene boundary.
//!
//! Everything the core needs from the content-creation host goes through the
//! [`Scene`] trait. Meshes, skin bindings and influences are addressed by name
//! and re-resolved on every call; no handle outlives a single operation.

use std::collections::BTreeSet;

use crate::error::{SkinError, SkinResult};
use crate::influence::InfluenceRef;

/// Access to a live, externally owned scene.
///
/// Weight arrays exchanged with the scene are flat and row-major: one row per
/// vertex in `vertices` order, one column per entry of `influence_indices`.
pub trait Scene {
    /// Name of the skin binding deforming `mesh`, if any.
    fn skin_binding(&self, mesh: &str) -> SkinResult<Option<String>>;

    /// Influences of a skin binding, in live column order.
    fn resolve_influences(&self, skin: &str) -> SkinResult<Vec<InfluenceRef>>;

    /// Number of vertices of `mesh`.
    fn vertex_count(&self, mesh: &str) -> SkinResult<usize>;

    /// Reads weights for `vertices` and the given influence columns.
    fn vertex_weights(
        &self,
        mesh: &str,
        vertices: &[u32],
        influence_indices: &[usize],
    ) -> SkinResult<Vec<f64>>;

    /// Writes weights and returns the weights they replaced, in the same layout.
    ///
    /// With `normalize` set, each written row is rescaled to sum to one.
    fn set_vertex_weights(
        &mut self,
        mesh: &str,
        vertices: &[u32],
        influence_indices: &[usize],
        weights: &[f64],
        normalize: bool,
    ) -> SkinResult<Vec<f64>>;

    /// True if an object with this name exists.
    fn object_exists(&self, name: &str) -> bool;

    /// True if `name` exists and is a joint.
    fn is_joint(&self, name: &str) -> bool;

    /// Adds `name` to the binding's influences with zero weight everywhere.
    fn add_influence(&mut self, skin: &str, name: &str) -> SkinResult<()>;

    /// The binding's configured maximum number of influences per vertex.
    fn max_influences(&self, skin: &str) -> SkinResult<usize>;
}

/// Partial names of a binding's influences, in live order.
pub fn live_influence_names<S: Scene + ?Sized>(scene: &S, skin: &str) -> SkinResult<Vec<String>> {
    Ok(scene
        .resolve_influences(skin)?
        .into_iter()
        .map(|inf| inf.partial_name)
        .collect())
}

/// Every vertex index of `mesh`, ascending.
pub fn all_vertices<S: Scene + ?Sized>(scene: &S, mesh: &str) -> SkinResult<Vec<u32>> {
    let count = scene.vertex_count(mesh)?;
    let count = u32::try_from(count).map_err(|_| {
        SkinError::scene(format!(
            "mesh '{}' has {} vertices, more than a u32 index can address",
            mesh, count
        ))
    })?;
    Ok((0..count).collect())
}

/// Checks that every index in `vertices` is a vertex of `mesh` and appears once.
pub fn check_vertex_selection<S: Scene + ?Sized>(
    scene: &S,
    mesh: &str,
    vertices: &[u32],
) -> SkinResult<()> {
    let count = scene.vertex_count(mesh)?;
    let mut seen = BTreeSet::new();
    for &vertex in vertices {
        if vertex as usize >= count {
            return Err(SkinError::scene(format!(
                "vertex {} out of range for mesh '{}' ({} vertices)",
                vertex, mesh, count
            )));
        }
        if !seen.insert(vertex) {
            return Err(SkinError::scene(format!(
                "vertex {} is selected more than once",
                vertex
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryScene;

    #[test]
    fn test_all_vertices() {
        let mut scene = MemoryScene::new();
        scene.add_mesh("body", 3);
        assert_eq!(all_vertices(&scene, "body").unwrap(), vec![0, 1, 2]);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_all_vertices_rejects_unaddressable_count() {
        let mut scene = MemoryScene::new();
        scene.add_mesh("huge", u32::MAX as usize + 1);
        assert!(matches!(
            all_vertices(&scene, "huge"),
            Err(SkinError::Scene { .. })
        ));
    }

    #[test]
    fn test_vertex_selection_checks() {
        let mut scene = MemoryScene::new();
        scene.add_mesh("body", 2);
        assert!(check_vertex_selection(&scene, "body", &[1, 0]).is_ok());

        let err = check_vertex_selection(&scene, "body", &[0, 99]).unwrap_err();
        assert!(err.to_string().contains("99"));
        let err = check_vertex_selection(&scene, "body", &[0, 0]).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }
}

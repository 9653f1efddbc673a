//! Export, import and pruning operations against a [`Scene`].
//!
//! Each operation works on one mesh and re-resolves everything it needs from
//! the scene. Import and prune read and validate everything up front; the
//! scene is only written once all checks have passed.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use log::info;

use crate::codec;
use crate::document::SkinWeightDocument;
use crate::error::{SkinError, SkinResult};
use crate::prune::{check_max_influences, over_influenced, prune_matrix};
use crate::reconcile::{reconcile, ReconcileOptions, Reconciliation};
use crate::remap::{remap, RemappedWeights};
use crate::rename::RenameRule;
use crate::scene::{all_vertices, check_vertex_selection, live_influence_names, Scene};
use crate::weights::WeightMatrix;

pub use crate::codec::query_influence_list;

/// Options for [`export_weights`].
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Vertices to export. `None` exports the whole mesh.
    pub vertices: Option<Vec<u32>>,
}

impl ExportOptions {
    /// Restricts the export to `vertices`.
    pub fn vertices(mut self, vertices: impl Into<Vec<u32>>) -> Self {
        self.vertices = Some(vertices.into());
        self
    }
}

/// Options for [`import_weights`].
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Influence reconciliation settings.
    pub reconcile: ReconcileOptions,
    /// Vertices to write, in document row order. `None` targets the whole mesh.
    pub vertices: Option<Vec<u32>>,
    /// Ask the scene to normalize written rows.
    pub normalize: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            reconcile: ReconcileOptions::default(),
            vertices: None,
            normalize: true,
        }
    }
}

impl ImportOptions {
    /// Sets the rename rule.
    pub fn rename(mut self, rule: RenameRule) -> Self {
        self.reconcile.rename = Some(rule);
        self
    }

    /// Sets the positional target influence list.
    pub fn target_list(mut self, targets: Vec<String>) -> Self {
        self.reconcile.target_list = Some(targets);
        self
    }

    /// Enables or disables the ancestor fallback.
    pub fn ancestor_fallback(mut self, enabled: bool) -> Self {
        self.reconcile.allow_ancestor_fallback = enabled;
        self
    }

    /// Restricts the import to `vertices`.
    pub fn vertices(mut self, vertices: impl Into<Vec<u32>>) -> Self {
        self.vertices = Some(vertices.into());
        self
    }

    /// Sets whether written rows are normalized.
    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }
}

/// Result of an export.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    /// The document that was written.
    pub document: SkinWeightDocument,
    /// Where it was written.
    pub path: PathBuf,
}

impl ExportOutcome {
    /// The exported weights.
    pub fn weights(&self) -> &[f64] {
        self.document.weights.as_slice()
    }
}

/// A committed weight write and the weights it replaced.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightEdit {
    pub mesh: String,
    pub vertices: Vec<u32>,
    pub influence_indices: Vec<usize>,
    pub previous: Vec<f64>,
}

impl WeightEdit {
    /// Writes the previous weights back verbatim.
    pub fn undo<S: Scene + ?Sized>(&self, scene: &mut S) -> SkinResult<()> {
        scene.set_vertex_weights(
            &self.mesh,
            &self.vertices,
            &self.influence_indices,
            &self.previous,
            false,
        )?;
        Ok(())
    }
}

/// Result of an import.
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    /// How each saved influence was resolved.
    pub reconciliation: Reconciliation,
    /// The weights that were written, in live influence order.
    pub remapped: RemappedWeights,
    /// Undo record for the write.
    pub edit: WeightEdit,
}

impl ImportOutcome {
    /// The written weights.
    pub fn weights(&self) -> &[f64] {
        self.remapped.weights.as_slice()
    }
}

fn require_binding<S: Scene + ?Sized>(scene: &S, mesh: &str) -> SkinResult<String> {
    scene
        .skin_binding(mesh)?
        .ok_or_else(|| SkinError::NoBinding {
            mesh: mesh.to_string(),
        })
}

/// Captures the skin weights of `mesh` and writes them to `path`.
pub fn export_weights<S: Scene + ?Sized>(
    scene: &S,
    mesh: &str,
    path: &Path,
    options: &ExportOptions,
) -> SkinResult<ExportOutcome> {
    let skin = require_binding(scene, mesh)?;
    let influences = scene.resolve_influences(&skin)?;
    let influence_indices: Vec<usize> = (0..influences.len()).collect();

    let components: BTreeSet<u32> = match options.vertices {
        Some(ref vertices) => vertices.iter().copied().collect(),
        None => all_vertices(scene, mesh)?.into_iter().collect(),
    };
    let vertices: Vec<u32> = components.iter().copied().collect();

    let weights = scene.vertex_weights(mesh, &vertices, &influence_indices)?;
    let document = SkinWeightDocument::new(influences, components, weights)?;
    codec::write_document(path, &document)?;

    info!(
        "Exported {} influences x {} vertices from {} to {}",
        document.influences.len(),
        document.vertex_count,
        mesh,
        path.display()
    );

    Ok(ExportOutcome {
        document,
        path: path.to_path_buf(),
    })
}

/// Loads the document at `path` and applies it to `mesh`.
///
/// Fails without writing anything if the document is missing or invalid, the
/// vertex counts differ, or any influence cannot be resolved.
pub fn import_weights<S: Scene + ?Sized>(
    scene: &mut S,
    mesh: &str,
    path: &Path,
    options: &ImportOptions,
) -> SkinResult<ImportOutcome> {
    let document = codec::read_document(path)?;
    apply_document(scene, mesh, &document, options)
}

/// Applies an already decoded document to `mesh`.
pub fn apply_document<S: Scene + ?Sized>(
    scene: &mut S,
    mesh: &str,
    document: &SkinWeightDocument,
    options: &ImportOptions,
) -> SkinResult<ImportOutcome> {
    document.validate()?;

    let vertices = match options.vertices {
        Some(ref vertices) => {
            check_vertex_selection(&*scene, mesh, vertices)?;
            vertices.clone()
        }
        None => all_vertices(&*scene, mesh)?,
    };
    if vertices.len() != document.vertex_count {
        return Err(SkinError::TopologyMismatch {
            expected: document.vertex_count,
            actual: vertices.len(),
        });
    }

    let skin = require_binding(&*scene, mesh)?;
    let live = live_influence_names(&*scene, &skin)?;
    let reconciliation = reconcile(&*scene, &document.influences, &live, &options.reconcile)?;

    reconciliation.register(scene, &skin)?;
    let live = live_influence_names(&*scene, &skin)?;
    let remapped = remap(&reconciliation.resolved_names(), &document.weights, &live)?;

    let previous = scene.set_vertex_weights(
        mesh,
        &vertices,
        &remapped.influence_indices,
        remapped.weights.as_slice(),
        options.normalize,
    )?;

    info!(
        "Imported {} influences x {} vertices onto {} ({} substituted, {} added)",
        document.influences.len(),
        document.vertex_count,
        mesh,
        reconciliation.substitutions().count(),
        reconciliation.to_register.len()
    );

    let edit = WeightEdit {
        mesh: mesh.to_string(),
        vertices,
        influence_indices: remapped.influence_indices.clone(),
        previous,
    };

    Ok(ImportOutcome {
        reconciliation,
        remapped,
        edit,
    })
}

/// Limits every vertex of `mesh` (or of `vertices`) to at most `k` influences.
///
/// `k` defaults to the binding's configured maximum.
pub fn prune_to_max_influences<S: Scene + ?Sized>(
    scene: &mut S,
    mesh: &str,
    vertices: Option<&[u32]>,
    k: Option<usize>,
) -> SkinResult<bool> {
    let skin = require_binding(&*scene, mesh)?;
    let k = match k {
        Some(k) => k,
        None => scene.max_influences(&skin)?,
    };
    check_max_influences(k)?;

    let vertices = match vertices {
        Some([]) => {
            return Err(SkinError::scene(
                "no valid vertices were provided to prune",
            ))
        }
        Some(vertices) => {
            check_vertex_selection(&*scene, mesh, vertices)?;
            vertices.to_vec()
        }
        None => all_vertices(&*scene, mesh)?,
    };

    let influence_count = scene.resolve_influences(&skin)?.len();
    let influence_indices: Vec<usize> = (0..influence_count).collect();
    let flat = scene.vertex_weights(mesh, &vertices, &influence_indices)?;
    let mut weights = WeightMatrix::from_flat(influence_count, flat)?;

    let stats = prune_matrix(&mut weights, k)?;
    scene.set_vertex_weights(
        mesh,
        &vertices,
        &influence_indices,
        weights.as_slice(),
        false,
    )?;

    info!(
        "Pruned {} to {} influences: {} vertices changed, {} unbound",
        mesh, k, stats.rows_changed, stats.rows_unbound
    );
    Ok(true)
}

/// Vertices of `mesh` driven by more than `k` influences.
pub fn find_over_influenced<S: Scene + ?Sized>(
    scene: &S,
    mesh: &str,
    k: usize,
) -> SkinResult<BTreeSet<u32>> {
    let skin = require_binding(scene, mesh)?;
    let influence_count = scene.resolve_influences(&skin)?.len();
    let influence_indices: Vec<usize> = (0..influence_count).collect();
    let vertices = all_vertices(scene, mesh)?;
    let flat = scene.vertex_weights(mesh, &vertices, &influence_indices)?;
    let weights = WeightMatrix::from_flat(influence_count, flat)?;

    Ok(over_influenced(&weights, k)
        .into_iter()
        .map(|row| vertices[row])
        .collect())
}

//! Export and import over several meshes.
//!
//! Each mesh gets its own `<mesh>.wts` file in one directory. Meshes are
//! processed independently: a failure on one mesh is reported in its entry and
//! does not stop the others.

use std::path::{Path, PathBuf};

use crate::codec::FILE_EXTENSION;
use crate::error::SkinResult;
use crate::ops::{export_weights, import_weights, ExportOptions, ExportOutcome, ImportOptions, ImportOutcome};
use crate::scene::Scene;

/// Outcome for one mesh of a batch.
#[derive(Debug)]
pub struct BatchEntry<T> {
    pub mesh: String,
    pub path: PathBuf,
    pub result: SkinResult<T>,
}

/// Path of the document for `mesh` inside `dir`.
///
/// Hierarchy and namespace separators in the mesh name become underscores.
pub fn document_path(dir: &Path, mesh: &str) -> PathBuf {
    let file_stem: String = mesh
        .chars()
        .map(|c| match c {
            '|' | ':' | '/' | '\\' => '_',
            c => c,
        })
        .collect();
    let file_stem = file_stem.trim_start_matches('_');
    dir.join(format!("{}.{}", file_stem, FILE_EXTENSION))
}

/// Exports every mesh in `meshes` to `dir`.
pub fn export_meshes<S: Scene + ?Sized>(
    scene: &S,
    meshes: &[String],
    dir: &Path,
    options: &ExportOptions,
) -> Vec<BatchEntry<ExportOutcome>> {
    meshes
        .iter()
        .map(|mesh| {
            let path = document_path(dir, mesh);
            let result = export_weights(scene, mesh, &path, options);
            if let Err(ref e) = result {
                log::error!("Export of {} failed: {}", mesh, e);
            }
            BatchEntry {
                mesh: mesh.clone(),
                path,
                result,
            }
        })
        .collect()
}

/// Imports `<mesh>.wts` from `dir` onto every mesh in `meshes`.
pub fn import_meshes<S: Scene + ?Sized>(
    scene: &mut S,
    meshes: &[String],
    dir: &Path,
    options: &ImportOptions,
) -> Vec<BatchEntry<ImportOutcome>> {
    let mut entries = Vec::with_capacity(meshes.len());
    for mesh in meshes {
        let path = document_path(dir, mesh);
        let result = import_weights(scene, mesh, &path, options);
        if let Err(ref e) = result {
            log::error!("Import onto {} failed: {}", mesh, e);
        }
        entries.push(BatchEntry {
            mesh: mesh.clone(),
            path,
            result,
        });
    }
    entries
}

//! Export command implementation
//!
//! Writes the skin weights of one or more meshes to weight documents.

use anyhow::{bail, Result};
use colored::Colorize;
use skinio_core::batch::export_meshes;
use skinio_core::{ops, ExportOptions};
use std::path::Path;
use std::process::ExitCode;

use crate::input::{load_scene, parse_vertices};

/// Run the export command
///
/// # Arguments
/// * `scene_path` - Path to the scene snapshot
/// * `meshes` - Meshes to export
/// * `file` - Output document (single mesh only)
/// * `out_dir` - Output directory, one `<mesh>.wts` per mesh
/// * `vertices` - Optional vertex selection (e.g. `0-99`)
///
/// # Returns
/// Exit code: 0 if every mesh was exported, 1 otherwise
pub fn run(
    scene_path: &str,
    meshes: &[String],
    file: Option<&str>,
    out_dir: Option<&str>,
    vertices: Option<&str>,
) -> Result<ExitCode> {
    let scene = load_scene(scene_path)?;
    let mut options = ExportOptions::default();
    if let Some(vertices) = parse_vertices(vertices)? {
        options = options.vertices(vertices);
    }

    match (file, out_dir) {
        (Some(file), None) => {
            let [mesh] = meshes else {
                bail!("--file takes exactly one --mesh, got {}", meshes.len());
            };
            println!("{} {} -> {}", "Exporting:".cyan().bold(), mesh, file);
            let outcome = ops::export_weights(&scene, mesh, Path::new(file), &options)?;
            println!(
                "{} {} influences x {} vertices",
                "SUCCESS".green().bold(),
                outcome.document.influences.len(),
                outcome.document.vertex_count
            );
            Ok(ExitCode::SUCCESS)
        }
        (None, Some(dir)) => {
            println!(
                "{} {} meshes -> {}",
                "Exporting:".cyan().bold(),
                meshes.len(),
                dir
            );
            let entries = export_meshes(&scene, meshes, Path::new(dir), &options);
            let mut failed = 0;
            for entry in &entries {
                match &entry.result {
                    Ok(outcome) => println!(
                        "  {} {} -> {} ({} influences)",
                        "OK".green(),
                        entry.mesh,
                        entry.path.display(),
                        outcome.document.influences.len()
                    ),
                    Err(e) => {
                        failed += 1;
                        println!(
                            "  {} {} [{}] {}",
                            "FAILED".red(),
                            entry.mesh,
                            e.code(),
                            e
                        );
                    }
                }
            }

            if failed == 0 {
                println!("{} Exported {} meshes", "SUCCESS".green().bold(), entries.len());
                Ok(ExitCode::SUCCESS)
            } else {
                println!(
                    "{} {} of {} meshes failed",
                    "FAILED".red().bold(),
                    failed,
                    entries.len()
                );
                Ok(ExitCode::from(1))
            }
        }
        _ => bail!("exactly one of --file or --out-dir is required"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skinio_core::MemoryScene;

    fn write_scene(dir: &Path) -> String {
        let mut scene = MemoryScene::new();
        scene.add_joint("root", None);
        scene.add_mesh("body", 3);
        scene.bind("body", "bodySkin", &["root"], 4).unwrap();
        let path = dir.join("scene.json");
        scene.save(&path).unwrap();
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn test_export_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let scene = write_scene(dir.path());
        let out = dir.path().join("body.wts");

        let code = run(
            &scene,
            &["body".to_string()],
            Some(out.to_str().unwrap()),
            None,
            Some("0-1"),
        )
        .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);

        let doc = skinio_core::read_document(&out).unwrap();
        assert_eq!(doc.vertex_count, 2);
    }

    #[test]
    fn test_export_requires_one_destination() {
        let dir = tempfile::tempdir().unwrap();
        let scene = write_scene(dir.path());
        assert!(run(&scene, &["body".to_string()], None, None, None).is_err());
        assert!(run(
            &scene,
            &["body".to_string(), "body".to_string()],
            Some("x.wts"),
            None,
            None
        )
        .is_err());
    }

    #[test]
    fn test_export_batch_reports_failures() {
        let dir = tempfile::tempdir().unwrap();
        let scene = write_scene(dir.path());
        let out = dir.path().join("weights");

        let code = run(
            &scene,
            &["body".to_string(), "ghost".to_string()],
            None,
            Some(out.to_str().unwrap()),
            None,
        )
        .unwrap();
        assert_eq!(code, ExitCode::from(1));
        assert!(out.join("body.wts").exists());
        assert!(!out.join("ghost.wts").exists());
    }
}

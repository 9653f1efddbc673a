//! Import command implementation
//!
//! Applies weight documents to meshes in a scene snapshot, reconciling the
//! saved influences against the scene first.

use anyhow::{bail, Result};
use colored::Colorize;
use skinio_core::batch::document_path;
use skinio_core::{ops, ImportOptions, ImportOutcome, RenameRule, SkinResult};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::json_output::{ImportOutput, ImportResult, JsonError};
use crate::input::{load_scene, parse_vertices, save_scene};

/// Arguments for the import command
#[derive(Debug, Default)]
pub struct ImportArgs<'a> {
    /// Path to the scene snapshot
    pub scene: &'a str,
    /// Meshes to import onto
    pub meshes: &'a [String],
    /// Input document (single mesh only)
    pub file: Option<&'a str>,
    /// Input directory holding `<mesh>.wts` files
    pub in_dir: Option<&'a str>,
    /// Rename rule as `[pattern, replacement]`
    pub replace: Option<&'a [String]>,
    /// Replacement influence names, by position
    pub targets: &'a [String],
    /// Fall back to the nearest existing ancestor joint
    pub ancestor_swap: bool,
    /// Optional vertex selection
    pub vertices: Option<&'a str>,
    /// Skip normalizing each written row
    pub no_normalize: bool,
    /// Where to write the modified scene (default: overwrite `scene`)
    pub save_scene: Option<&'a str>,
    /// Output machine-readable JSON
    pub json: bool,
}

/// Run the import command
///
/// # Returns
/// Exit code: 0 if every mesh was imported, 1 otherwise
pub fn run(args: &ImportArgs<'_>) -> Result<ExitCode> {
    let options = build_options(args)?;
    let jobs = jobs(args)?;
    let mut scene = load_scene(args.scene)?;

    if !args.json {
        println!("{} {}", "Importing into:".cyan().bold(), args.scene);
    }

    let mut results = Vec::with_capacity(jobs.len());
    for (mesh, path) in &jobs {
        let outcome = ops::import_weights(&mut scene, mesh, path, &options);
        if !args.json {
            print_result(mesh, path, &outcome);
        }
        results.push(to_json(mesh, path, &outcome));
    }

    let success = results.iter().all(|r| r.success);
    let imported = results.iter().filter(|r| r.success).count();
    let scene_file = if imported > 0 {
        let written = save_scene(&scene, args.scene, args.save_scene)?;
        Some(written.display().to_string())
    } else {
        None
    };

    if args.json {
        let output = ImportOutput {
            success,
            results,
            scene_file,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        if let Some(ref file) = scene_file {
            println!("{} {}", "Scene written:".dimmed(), file);
        }
        if success {
            println!("{} Imported {} meshes", "SUCCESS".green().bold(), imported);
        } else {
            println!(
                "{} {} of {} meshes failed",
                "FAILED".red().bold(),
                results.len() - imported,
                results.len()
            );
        }
    }

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn build_options(args: &ImportArgs<'_>) -> Result<ImportOptions> {
    let mut options = ImportOptions::default()
        .ancestor_fallback(args.ancestor_swap)
        .normalize(!args.no_normalize);

    if let Some(replace) = args.replace {
        let [pattern, replacement] = replace else {
            bail!("--replace takes a pattern and a replacement");
        };
        options = options.rename(RenameRule::new(pattern, replacement)?);
    }
    if !args.targets.is_empty() {
        options = options.target_list(args.targets.to_vec());
    }
    if let Some(vertices) = parse_vertices(args.vertices)? {
        options = options.vertices(vertices);
    }
    Ok(options)
}

fn jobs(args: &ImportArgs<'_>) -> Result<Vec<(String, PathBuf)>> {
    match (args.file, args.in_dir) {
        (Some(file), None) => {
            let [mesh] = args.meshes else {
                bail!("--file takes exactly one --mesh, got {}", args.meshes.len());
            };
            Ok(vec![(mesh.clone(), PathBuf::from(file))])
        }
        (None, Some(dir)) => Ok(args
            .meshes
            .iter()
            .map(|mesh| (mesh.clone(), document_path(Path::new(dir), mesh)))
            .collect()),
        _ => bail!("exactly one of --file or --in-dir is required"),
    }
}

fn print_result(mesh: &str, path: &Path, outcome: &SkinResult<ImportOutcome>) {
    match outcome {
        Ok(outcome) => {
            println!(
                "  {} {} <- {} ({} vertices)",
                "OK".green(),
                mesh,
                path.display(),
                outcome.edit.vertices.len()
            );
            for sub in outcome.reconciliation.substitutions() {
                println!(
                    "    {} {} -> {} ({})",
                    "~".yellow(),
                    sub.saved,
                    sub.resolved,
                    sub.resolution.as_str()
                );
            }
            for name in &outcome.reconciliation.to_register {
                println!("    {} {}", "+".green(), name);
            }
            for name in &outcome.remapped.dropped {
                println!("    {} {} (dropped)", "-".red(), name);
            }
        }
        Err(e) => println!(
            "  {} {} [{}] {}",
            "FAILED".red(),
            mesh,
            e.code(),
            e
        ),
    }
}

fn to_json(mesh: &str, path: &Path, outcome: &SkinResult<ImportOutcome>) -> ImportResult {
    let file = path.display().to_string();
    match outcome {
        Ok(outcome) => ImportResult::succeeded(
            mesh,
            &file,
            &outcome.reconciliation,
            &outcome.remapped.dropped,
        ),
        Err(e) => ImportResult::failed(mesh, &file, JsonError::from(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use skinio_core::{write_document, InfluenceRef, MemoryScene, SkinWeightDocument};

    fn fixture(dir: &Path) -> (String, PathBuf) {
        let mut scene = MemoryScene::new();
        scene.add_joint("root", None);
        scene.add_joint("arm_new", Some("root"));
        scene.add_mesh("body", 2);
        scene.bind("body", "bodySkin", &["root"], 4).unwrap();
        let scene_path = dir.join("scene.json");
        scene.save(&scene_path).unwrap();

        let doc = SkinWeightDocument::new(
            vec![
                InfluenceRef::new("root", "|root"),
                InfluenceRef::new("arm_old", "|root|arm_old"),
            ],
            (0..2).collect(),
            vec![0.5, 0.5, 0.0, 1.0],
        )
        .unwrap();
        let doc_path = dir.join("body.wts");
        write_document(&doc_path, &doc).unwrap();

        (scene_path.to_str().unwrap().to_string(), doc_path)
    }

    #[test]
    fn test_import_with_rename_saves_scene() {
        let dir = tempfile::tempdir().unwrap();
        let (scene_path, doc_path) = fixture(dir.path());
        let out = dir.path().join("out.json");
        let meshes = vec!["body".to_string()];
        let replace = vec!["_old".to_string(), "_new".to_string()];

        let code = run(&ImportArgs {
            scene: &scene_path,
            meshes: &meshes,
            file: doc_path.to_str(),
            replace: Some(&replace),
            save_scene: out.to_str(),
            json: true,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);

        let saved = MemoryScene::load(&out).unwrap();
        let binding = saved.binding("body").unwrap();
        assert_eq!(binding.influences, vec!["root", "arm_new"]);
        assert_eq!(binding.weights, vec![0.5, 0.5, 0.0, 1.0]);
    }

    #[test]
    fn test_failed_import_does_not_touch_scene_file() {
        let dir = tempfile::tempdir().unwrap();
        let (scene_path, doc_path) = fixture(dir.path());
        let before = std::fs::read_to_string(&scene_path).unwrap();
        let meshes = vec!["body".to_string()];

        let code = run(&ImportArgs {
            scene: &scene_path,
            meshes: &meshes,
            file: doc_path.to_str(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(code, ExitCode::from(1));
        assert_eq!(std::fs::read_to_string(&scene_path).unwrap(), before);
    }

    #[test]
    fn test_import_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        let (scene_path, _) = fixture(dir.path());
        let meshes = vec!["body".to_string()];
        let targets = vec!["root".to_string(), "arm_new".to_string()];

        let code = run(&ImportArgs {
            scene: &scene_path,
            meshes: &meshes,
            in_dir: dir.path().to_str(),
            targets: &targets,
            ..Default::default()
        })
        .unwrap();
        assert_eq!(code, ExitCode::SUCCESS);

        let saved = MemoryScene::load(Path::new(&scene_path)).unwrap();
        assert_eq!(
            saved.binding("body").unwrap().influences,
            vec!["root", "arm_new"]
        );
    }

    #[test]
    fn test_bad_replace_arguments() {
        let replace = vec!["(".to_string(), "x".to_string()];
        let args = ImportArgs {
            replace: Some(&replace),
            ..Default::default()
        };
        assert!(build_options(&args).is_err());
    }
}

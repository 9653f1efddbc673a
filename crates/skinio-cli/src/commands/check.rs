//! Check command implementation
//!
//! Reports vertices driven by more influences than allowed.

use anyhow::Result;
use colored::Colorize;
use skinio_core::ops;
use std::process::ExitCode;

use super::json_output::{CheckOutput, JsonError};
use crate::input::load_scene;

/// Run the check command
///
/// # Arguments
/// * `scene_path` - Path to the scene snapshot
/// * `mesh` - Mesh to inspect
/// * `max` - Allowed influences per vertex
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 if no vertex exceeds `max`, 1 otherwise
pub fn run(scene_path: &str, mesh: &str, max: usize, json_output: bool) -> Result<ExitCode> {
    let scene = load_scene(scene_path)?;
    let found = ops::find_over_influenced(&scene, mesh, max);

    if json_output {
        let output = match &found {
            Ok(over) => CheckOutput {
                success: over.is_empty(),
                mesh: mesh.to_string(),
                max_influences: max,
                over_influenced: over.iter().copied().collect(),
                error: None,
            },
            Err(e) => CheckOutput {
                success: false,
                mesh: mesh.to_string(),
                max_influences: max,
                over_influenced: Vec::new(),
                error: Some(JsonError::from(e)),
            },
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(if output.success {
            ExitCode::SUCCESS
        } else {
            ExitCode::from(1)
        });
    }

    println!(
        "{} {} (max {} influences)",
        "Checking:".cyan().bold(),
        mesh,
        max
    );
    let over = found?;
    if over.is_empty() {
        println!("{} No over-influenced vertices", "SUCCESS".green().bold());
        return Ok(ExitCode::SUCCESS);
    }

    let listed: Vec<String> = over.iter().map(u32::to_string).collect();
    println!(
        "{} {} vertices exceed {} influences: {}",
        "WARNING".yellow().bold(),
        over.len(),
        max,
        listed.join(", ")
    );
    Ok(ExitCode::from(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use skinio_core::MemoryScene;

    #[test]
    fn test_check_flags_crowded_vertices() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");
        let mut scene = MemoryScene::new();
        scene.add_joint("a", None);
        scene.add_joint("b", Some("a"));
        scene.add_mesh("body", 2);
        scene.bind("body", "bodySkin", &["a", "b"], 4).unwrap();
        scene
            .set_all_weights("body", vec![0.5, 0.5, 1.0, 0.0])
            .unwrap();
        scene.save(&path).unwrap();
        let path = path.to_str().unwrap();

        assert_eq!(run(path, "body", 1, true).unwrap(), ExitCode::from(1));
        assert_eq!(run(path, "body", 2, false).unwrap(), ExitCode::SUCCESS);
        assert!(run(path, "ghost", 2, false).is_err());
    }
}

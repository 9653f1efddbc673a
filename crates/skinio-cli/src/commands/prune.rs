//! Prune command implementation
//!
//! Caps the number of influences per vertex on a mesh and renormalizes.

use anyhow::{Context, Result};
use colored::Colorize;
use skinio_core::ops;
use std::process::ExitCode;

use crate::input::{load_scene, parse_vertices, save_scene};

/// Run the prune command
///
/// # Arguments
/// * `scene_path` - Path to the scene snapshot
/// * `mesh` - Mesh to prune
/// * `max` - Influence cap (default: the binding's configured maximum)
/// * `vertices` - Optional vertex selection
/// * `save_to` - Where to write the modified scene (default: overwrite input)
///
/// # Returns
/// Exit code: 0 success, 1 error
pub fn run(
    scene_path: &str,
    mesh: &str,
    max: Option<usize>,
    vertices: Option<&str>,
    save_to: Option<&str>,
) -> Result<ExitCode> {
    let vertices = parse_vertices(vertices)?;
    let mut scene = load_scene(scene_path)?;

    println!("{} {}", "Pruning:".cyan().bold(), mesh);

    ops::prune_to_max_influences(&mut scene, mesh, vertices.as_deref(), max)
        .with_context(|| format!("Failed to prune {}", mesh))?;
    let written = save_scene(&scene, scene_path, save_to)?;

    println!(
        "{} Pruned to {} influences, scene written to {}",
        "SUCCESS".green().bold(),
        max.map(|k| k.to_string())
            .unwrap_or_else(|| "the binding's maximum".to_string()),
        written.display()
    );
    Ok(ExitCode::SUCCESS)
}

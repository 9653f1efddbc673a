//! skinio CLI - save and restore skin weights
//!
//! This binary exports skin weights from a scene snapshot to weight documents,
//! imports them back with influence reconciliation, and prunes or checks the
//! number of influences per vertex.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use skinio_cli::commands;
use skinio_cli::commands::import::ImportArgs;

/// skinio - skin weight persistence
#[derive(Parser)]
#[command(name = "skinio")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export the skin weights of one or more meshes
    Export {
        /// Path to the scene snapshot (JSON)
        #[arg(short, long)]
        scene: String,

        /// Mesh to export (repeatable)
        #[arg(short, long = "mesh", required = true)]
        meshes: Vec<String>,

        /// Output document (single mesh)
        #[arg(short, long, conflicts_with = "out_dir")]
        file: Option<String>,

        /// Output directory, one <mesh>.wts per mesh
        #[arg(long)]
        out_dir: Option<String>,

        /// Vertex selection, e.g. 0,4,10-19
        #[arg(long)]
        vertices: Option<String>,
    },

    /// Import weight documents onto meshes
    Import {
        /// Path to the scene snapshot (JSON)
        #[arg(short, long)]
        scene: String,

        /// Mesh to import onto (repeatable)
        #[arg(short, long = "mesh", required = true)]
        meshes: Vec<String>,

        /// Input document (single mesh)
        #[arg(short, long, conflicts_with = "in_dir")]
        file: Option<String>,

        /// Input directory holding <mesh>.wts files
        #[arg(long)]
        in_dir: Option<String>,

        /// Rename rule applied to missing influences (regex and replacement)
        #[arg(long, num_args = 2, value_names = ["PATTERN", "REPLACEMENT"])]
        replace: Option<Vec<String>>,

        /// Replacement influence name, by position (repeatable)
        #[arg(long = "target")]
        targets: Vec<String>,

        /// Fall back to the nearest existing ancestor joint
        #[arg(long)]
        ancestor_swap: bool,

        /// Vertex selection, e.g. 0,4,10-19
        #[arg(long)]
        vertices: Option<String>,

        /// Write weights as stored, without normalizing each vertex
        #[arg(long)]
        no_normalize: bool,

        /// Where to write the modified scene (default: overwrite --scene)
        #[arg(long)]
        save_scene: Option<String>,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// List the influences stored in a weight document
    Query {
        /// Path to the weight document
        #[arg(short, long)]
        file: String,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },

    /// Limit the number of influences per vertex and renormalize
    Prune {
        /// Path to the scene snapshot (JSON)
        #[arg(short, long)]
        scene: String,

        /// Mesh to prune
        #[arg(short, long)]
        mesh: String,

        /// Influence cap (default: the binding's configured maximum)
        #[arg(long)]
        max: Option<usize>,

        /// Vertex selection, e.g. 0,4,10-19
        #[arg(long)]
        vertices: Option<String>,

        /// Where to write the modified scene (default: overwrite --scene)
        #[arg(long)]
        save_scene: Option<String>,
    },

    /// Report vertices with more influences than allowed
    Check {
        /// Path to the scene snapshot (JSON)
        #[arg(short, long)]
        scene: String,

        /// Mesh to inspect
        #[arg(short, long)]
        mesh: String,

        /// Allowed influences per vertex
        #[arg(long, default_value_t = 4)]
        max: usize,

        /// Output machine-readable JSON (no colored output)
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Export {
            scene,
            meshes,
            file,
            out_dir,
            vertices,
        } => commands::export::run(
            &scene,
            &meshes,
            file.as_deref(),
            out_dir.as_deref(),
            vertices.as_deref(),
        ),
        Commands::Import {
            scene,
            meshes,
            file,
            in_dir,
            replace,
            targets,
            ancestor_swap,
            vertices,
            no_normalize,
            save_scene,
            json,
        } => commands::import::run(&ImportArgs {
            scene: &scene,
            meshes: &meshes,
            file: file.as_deref(),
            in_dir: in_dir.as_deref(),
            replace: replace.as_deref(),
            targets: &targets,
            ancestor_swap,
            vertices: vertices.as_deref(),
            no_normalize,
            save_scene: save_scene.as_deref(),
            json,
        }),
        Commands::Query { file, json } => commands::query::run(&file, json),
        Commands::Prune {
            scene,
            mesh,
            max,
            vertices,
            save_scene,
        } => commands::prune::run(
            &scene,
            &mesh,
            max,
            vertices.as_deref(),
            save_scene.as_deref(),
        ),
        Commands::Check {
            scene,
            mesh,
            max,
            json,
        } => commands::check::run(&scene, &mesh, max, json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<skinio_core::SkinError>() {
                Some(skin) => eprintln!(
                    "{} [{}]: {:#}",
                    colored::Colorize::red("error"),
                    skin.code(),
                    e
                ),
                None => eprintln!("{}: {:#}", colored::Colorize::red("error"), e),
            }
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_export_batch() {
        let cli = Cli::try_parse_from([
            "skinio", "export", "--scene", "scene.json", "-m", "body", "-m", "head", "--out-dir",
            "weights",
        ])
        .unwrap();
        match cli.command {
            Commands::Export {
                scene,
                meshes,
                file,
                out_dir,
                vertices,
            } => {
                assert_eq!(scene, "scene.json");
                assert_eq!(meshes, vec!["body", "head"]);
                assert!(file.is_none());
                assert_eq!(out_dir.as_deref(), Some("weights"));
                assert!(vertices.is_none());
            }
            _ => panic!("expected export command"),
        }
    }

    #[test]
    fn test_cli_export_file_conflicts_with_out_dir() {
        let err = Cli::try_parse_from([
            "skinio", "export", "--scene", "s.json", "-m", "body", "--file", "a.wts",
            "--out-dir", "w",
        ])
        .err()
        .unwrap();
        assert!(err.to_string().contains("--out-dir"));
    }

    #[test]
    fn test_cli_parses_import_options() {
        let cli = Cli::try_parse_from([
            "skinio",
            "import",
            "--scene",
            "scene.json",
            "--mesh",
            "body",
            "--file",
            "body.wts",
            "--replace",
            "_old$",
            "_new",
            "--target",
            "hip",
            "--target",
            "knee",
            "--ancestor-swap",
        ])
        .unwrap();
        match cli.command {
            Commands::Import {
                replace,
                targets,
                ancestor_swap,
                no_normalize,
                json,
                save_scene,
                ..
            } => {
                assert_eq!(replace, Some(vec!["_old$".to_string(), "_new".to_string()]));
                assert_eq!(targets, vec!["hip", "knee"]);
                assert!(ancestor_swap);
                assert!(!no_normalize);
                assert!(!json);
                assert!(save_scene.is_none());
            }
            _ => panic!("expected import command"),
        }
    }

    #[test]
    fn test_cli_import_requires_mesh() {
        assert!(Cli::try_parse_from(["skinio", "import", "--scene", "s.json", "--file", "a.wts"])
            .is_err());
    }

    #[test]
    fn test_cli_check_default_max() {
        let cli =
            Cli::try_parse_from(["skinio", "check", "--scene", "s.json", "--mesh", "body"]).unwrap();
        match cli.command {
            Commands::Check { max, json, .. } => {
                assert_eq!(max, 4);
                assert!(!json);
            }
            _ => panic!("expected check command"),
        }
    }

    #[test]
    fn test_cli_prune_max_is_optional() {
        let cli = Cli::try_parse_from([
            "skinio", "prune", "--scene", "s.json", "--mesh", "body", "--max", "3",
        ])
        .unwrap();
        match cli.command {
            Commands::Prune { max, .. } => assert_eq!(max, Some(3)),
            _ => panic!("expected prune command"),
        }

        let cli =
            Cli::try_parse_from(["skinio", "prune", "--scene", "s.json", "--mesh", "body"]).unwrap();
        match cli.command {
            Commands::Prune { max, .. } => assert_eq!(max, None),
            _ => panic!("expected prune command"),
        }
    }

    #[test]
    fn test_cli_parses_query() {
        let cli = Cli::try_parse_from(["skinio", "query", "--file", "body.wts", "--json"]).unwrap();
        match cli.command {
            Commands::Query { file, json } => {
                assert_eq!(file, "body.wts");
                assert!(json);
            }
            _ => panic!("expected query command"),
        }
    }
}

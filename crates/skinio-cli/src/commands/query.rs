//! Query command implementation
//!
//! Lists the influences stored in a weight document.

use anyhow::Result;
use colored::Colorize;
use skinio_core::{read_document, SkinResult, SkinWeightDocument};
use std::path::Path;
use std::process::ExitCode;

use super::json_output::{JsonError, QueryOutput};

/// Run the query command
///
/// # Arguments
/// * `file` - Path to the weight document
/// * `json_output` - Whether to output machine-readable JSON
///
/// # Returns
/// Exit code: 0 if the document could be read, 1 otherwise
pub fn run(file: &str, json_output: bool) -> Result<ExitCode> {
    let loaded = load(file);

    if json_output {
        let output = match &loaded {
            Ok((doc, hash)) => QueryOutput {
                success: true,
                file: file.to_string(),
                influences: doc.partial_names(),
                vertex_count: Some(doc.vertex_count),
                content_hash: Some(hash.clone()),
                error: None,
            },
            Err(e) => QueryOutput {
                success: false,
                file: file.to_string(),
                influences: Vec::new(),
                vertex_count: None,
                content_hash: None,
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

    println!("{} {}", "Querying:".cyan().bold(), file);
    let (doc, hash) = loaded?;
    println!("{} {}", "Vertices:".dimmed(), doc.vertex_count);
    println!("{} {}", "Hash:".dimmed(), hash);
    println!("{} ({})", "Influences:".dimmed(), doc.influences.len());
    for inf in &doc.influences {
        println!("  {} {}", inf.partial_name, inf.full_path.dimmed());
    }

    Ok(ExitCode::SUCCESS)
}

fn load(file: &str) -> SkinResult<(SkinWeightDocument, String)> {
    let doc = read_document(Path::new(file))?;
    let hash = doc.content_hash()?;
    Ok((doc, hash))
}

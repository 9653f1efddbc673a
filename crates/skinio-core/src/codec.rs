//! Encoding and decoding of skin weight documents.
//!
//! Documents are stored as JSON objects with the fields
//! `partial_path_names`, `full_path_names`, `weights`, `components` and
//! `topology_vertex_count`. Weights are written with shortest round-trip
//! formatting and parsed back exactly, so values survive bit-for-bit.
//!
//! Files are written atomically: the encoded document goes to a temporary file
//! next to the destination and is renamed over it once fully written.

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::document::SkinWeightDocument;
use crate::error::{SkinError, SkinResult};
use crate::influence::InfluenceRef;
use crate::weights::WeightMatrix;

/// Current document format version.
pub const FORMAT_VERSION: u32 = 1;

/// Conventional file extension for skin weight documents.
pub const FILE_EXTENSION: &str = "wts";

#[derive(Serialize)]
struct DocumentFile<'a> {
    format_version: u32,
    partial_path_names: Vec<&'a str>,
    full_path_names: Vec<&'a str>,
    weights: &'a [f64],
    components: &'a BTreeSet<u32>,
    topology_vertex_count: usize,
}

#[derive(Deserialize)]
struct RawDocumentFile {
    #[serde(default = "default_format_version")]
    format_version: u32,
    partial_path_names: Option<Vec<String>>,
    full_path_names: Option<Vec<String>>,
    weights: Option<Vec<f64>>,
    components: Option<Vec<u32>>,
    topology_vertex_count: Option<usize>,
}

fn default_format_version() -> u32 {
    FORMAT_VERSION
}

/// Encodes a validated document to bytes.
pub fn encode(doc: &SkinWeightDocument) -> SkinResult<Vec<u8>> {
    doc.validate()?;

    let file = DocumentFile {
        format_version: FORMAT_VERSION,
        partial_path_names: doc
            .influences
            .iter()
            .map(|inf| inf.partial_name.as_str())
            .collect(),
        full_path_names: doc
            .influences
            .iter()
            .map(|inf| inf.full_path.as_str())
            .collect(),
        weights: doc.weights.as_slice(),
        components: &doc.components,
        topology_vertex_count: doc.vertex_count,
    };

    serde_json::to_vec(&file).map_err(SkinError::Serialize)
}

/// Decodes and validates a document.
pub fn decode(bytes: &[u8]) -> SkinResult<SkinWeightDocument> {
    let raw: RawDocumentFile = serde_json::from_slice(bytes)
        .map_err(|e| SkinError::invalid_document(format!("malformed document: {}", e)))?;

    if raw.format_version > FORMAT_VERSION {
        return Err(SkinError::invalid_document(format!(
            "unsupported format_version {} (this build reads up to {})",
            raw.format_version, FORMAT_VERSION
        )));
    }

    let mut missing = Vec::new();
    if raw.partial_path_names.is_none() {
        missing.push("partial_path_names");
    }
    if raw.full_path_names.is_none() {
        missing.push("full_path_names");
    }
    if raw.weights.is_none() {
        missing.push("weights");
    }
    if raw.components.is_none() {
        missing.push("components");
    }
    if raw.topology_vertex_count.is_none() {
        missing.push("topology_vertex_count");
    }

    let (
        Some(partial_names),
        Some(full_paths),
        Some(weights),
        Some(components),
        Some(vertex_count),
    ) = (
        raw.partial_path_names,
        raw.full_path_names,
        raw.weights,
        raw.components,
        raw.topology_vertex_count,
    )
    else {
        return Err(SkinError::invalid_document(format!(
            "missing field(s): {}",
            missing.join(", ")
        )));
    };

    if partial_names.len() != full_paths.len() {
        return Err(SkinError::invalid_document(format!(
            "{} partial_path_names but {} full_path_names",
            partial_names.len(),
            full_paths.len()
        )));
    }

    let influences: Vec<InfluenceRef> = partial_names
        .into_iter()
        .zip(full_paths)
        .map(|(partial, full)| InfluenceRef::new(partial, full))
        .collect();

    let listed = components.len();
    let components: BTreeSet<u32> = components.into_iter().collect();
    if components.len() != listed {
        return Err(SkinError::invalid_document(format!(
            "components list {} entries but only {} are distinct",
            listed,
            components.len()
        )));
    }

    let weights = WeightMatrix::from_flat(influences.len(), weights)?;
    let doc = SkinWeightDocument {
        influences,
        components,
        vertex_count,
        weights,
    };
    doc.validate()?;
    Ok(doc)
}

/// Reads and decodes the document at `path`.
pub fn read_document(path: &Path) -> SkinResult<SkinWeightDocument> {
    let bytes = fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            SkinError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            SkinError::io(path, e)
        }
    })?;
    decode(&bytes)
}

/// Encodes `doc` and atomically writes it to `path`.
///
/// Missing parent directories are created. If anything fails, nothing is left
/// at `path`.
pub fn write_document(path: &Path, doc: &SkinWeightDocument) -> SkinResult<()> {
    let bytes = encode(doc)?;

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| SkinError::io(parent, e))?;

    let mut file = tempfile::Builder::new()
        .prefix(".skinio_")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| SkinError::io(parent, e))?;
    file.write_all(&bytes).map_err(|e| SkinError::io(path, e))?;
    file.as_file()
        .sync_all()
        .map_err(|e| SkinError::io(path, e))?;
    file.persist(path)
        .map_err(|e| SkinError::io(path, e.error))?;

    log::debug!(
        "wrote {} influences x {} vertices to {}",
        doc.influences.len(),
        doc.vertex_count,
        path.display()
    );
    Ok(())
}

/// Partial influence names stored in the document at `path`.
pub fn query_influence_list(path: &Path) -> SkinResult<Vec<String>> {
    Ok(read_document(path)?.partial_names())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_doc() -> SkinWeightDocument {
        SkinWeightDocument::new(
            vec![
                InfluenceRef::new("spine", "|root|spine"),
                InfluenceRef::new("arm_l", "|root|spine|arm_l"),
                InfluenceRef::new("arm_r", "|root|spine|arm_r"),
            ],
            [3, 4].into_iter().collect(),
            vec![0.1, 0.2, 0.7, 1.0 / 3.0, 2.0 / 3.0, 0.0],
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip_is_exact() {
        let doc = sample_doc();
        let bytes = encode(&doc).unwrap();
        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded, doc);
        for (a, b) in decoded
            .weights
            .as_slice()
            .iter()
            .zip(doc.weights.as_slice())
        {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn test_field_names() {
        let bytes = encode(&sample_doc()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["partial_path_names"][1], "arm_l");
        assert_eq!(value["full_path_names"][0], "|root|spine");
        assert_eq!(value["components"], serde_json::json!([3, 4]));
        assert_eq!(value["topology_vertex_count"], 2);
        assert_eq!(value["weights"].as_array().unwrap().len(), 6);
    }

    #[test]
    fn test_decode_missing_fields() {
        let json = br#"{"full_path_names": ["|a"], "components": [0]}"#;
        let err = decode(json).unwrap_err();
        let message = err.to_string();
        assert_eq!(err.code(), "SKIN_001");
        assert!(message.contains("partial_path_names"));
        assert!(message.contains("weights"));
        assert!(message.contains("topology_vertex_count"));
    }

    #[test]
    fn test_decode_without_version_defaults() {
        let json = br#"{
            "partial_path_names": ["a"],
            "full_path_names": ["|a"],
            "weights": [1.0, 1.0],
            "components": [0, 1],
            "topology_vertex_count": 2
        }"#;
        let doc = decode(json).unwrap();
        assert_eq!(doc.vertex_count, 2);
    }

    #[test]
    fn test_decode_rejects_future_version() {
        let json = br#"{
            "format_version": 99,
            "partial_path_names": ["a"],
            "full_path_names": ["|a"],
            "weights": [1.0],
            "components": [0],
            "topology_vertex_count": 1
        }"#;
        assert!(decode(json)
            .unwrap_err()
            .to_string()
            .contains("format_version"));
    }

    #[test]
    fn test_decode_rejects_inconsistent_counts() {
        let json = br#"{
            "partial_path_names": ["a", "b"],
            "full_path_names": ["|a", "|b"],
            "weights": [1.0, 0.0],
            "components": [0, 1],
            "topology_vertex_count": 2
        }"#;
        assert!(matches!(
            decode(json),
            Err(SkinError::InvalidDocument { .. })
        ));
    }

    #[test]
    fn test_decode_rejects_oversized_vertex_count() {
        let json = br#"{
            "partial_path_names": ["a", "b", "c"],
            "full_path_names": ["|a", "|b", "|c"],
            "weights": [],
            "components": [],
            "topology_vertex_count": 9223372036854775807
        }"#;
        let err = decode(json).unwrap_err();
        assert!(matches!(err, SkinError::InvalidDocument { .. }));
        assert!(err.to_string().contains("overflows"));
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            decode(b"\x80\x04not json"),
            Err(SkinError::InvalidDocument { .. })
        ));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_document(&dir.path().join("nope.wts")).unwrap_err();
        assert!(matches!(err, SkinError::NotFound { .. }));
    }

    #[test]
    fn test_write_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chars").join("hero").join("body.wts");
        write_document(&path, &sample_doc()).unwrap();

        let loaded = read_document(&path).unwrap();
        assert_eq!(loaded, sample_doc());
        assert_eq!(
            query_influence_list(&path).unwrap(),
            vec!["spine", "arm_l", "arm_r"]
        );
    }

    #[test]
    fn test_failed_write_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.wts");

        let mut doc = sample_doc();
        doc.vertex_count = 9;
        assert!(write_document(&path, &doc).is_err());
        assert!(!path.exists());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failed_rename_cleans_up_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.wts");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), b"x").unwrap();

        let err = write_document(&path, &sample_doc()).unwrap_err();
        assert!(matches!(err, SkinError::Io { .. }));
        assert!(path.is_dir());

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["body.wts"]);
    }

    #[test]
    fn test_overwrite_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.wts");
        fs::write(&path, b"old contents").unwrap();

        write_document(&path, &sample_doc()).unwrap();
        assert_eq!(read_document(&path).unwrap(), sample_doc());
    }
}

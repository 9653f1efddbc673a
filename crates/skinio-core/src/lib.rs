//! skinio Core Library
//!
//! This crate saves and restores per-vertex skin weights and keeps them valid
//! while the skeleton they were captured from changes.
//!
//! # Overview
//!
//! - **Export**: weights are read from a [`Scene`] into a
//!   [`SkinWeightDocument`] and written atomically by the [`codec`].
//! - **Import**: a decoded document is reconciled against the current scene
//!   ([`reconcile`]), its columns are re-aligned onto the live influence order
//!   ([`remap`]), and the result is written in one call.
//! - **Pruning**: [`prune`] caps the number of influences per vertex and
//!   rescales the rest.
//!
//! The host application is only reached through the [`Scene`] trait.
//! [`MemoryScene`] is a JSON-backed implementation used by the CLI and tests.
//!
//! # Example
//!
//! ```
//! use skinio_core::{ops, MemoryScene, ImportOptions, ExportOptions, RenameRule};
//!
//! let mut scene = MemoryScene::new();
//! scene.add_joint("root", None);
//! scene.add_joint("arm_old", Some("root"));
//! scene.add_mesh("body", 2);
//! scene.bind("body", "bodySkin", &["root", "arm_old"], 4).unwrap();
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("body.wts");
//! ops::export_weights(&scene, "body", &path, &ExportOptions::default()).unwrap();
//!
//! // The joint is renamed before the weights come back.
//! scene.nodes[1].name = "arm_new".to_string();
//! scene.meshes[0].skin.as_mut().unwrap().influences[1] = "arm_new".to_string();
//!
//! let options = ImportOptions::default().rename(RenameRule::new("_old", "_new").unwrap());
//! let outcome = ops::import_weights(&mut scene, "body", &path, &options).unwrap();
//! assert_eq!(outcome.reconciliation.resolved_names(), vec!["root", "arm_new"]);
//! ```
//!
//! # Modules
//!
//! - [`document`]: the persisted document and its invariants
//! - [`codec`]: encoding, decoding and atomic file IO
//! - [`reconcile`]: matching saved influences to the scene
//! - [`remap`]: re-aligning weight columns
//! - [`prune`]: max influence pruning and diagnostics
//! - [`ops`]: the export/import/prune operations
//! - [`batch`]: multi-mesh export and import
//! - [`scene`]: the host boundary
//! - [`memory`]: in-memory scene

pub mod batch;
pub mod codec;
pub mod document;
pub mod error;
pub mod influence;
pub mod memory;
pub mod ops;
pub mod prune;
pub mod reconcile;
pub mod remap;
pub mod rename;
pub mod scene;
pub mod weights;

// Re-export commonly used types at the crate root
pub use codec::{decode, encode, query_influence_list, read_document, write_document};
pub use document::SkinWeightDocument;
pub use error::{SkinError, SkinResult};
pub use influence::InfluenceRef;
pub use memory::MemoryScene;
pub use ops::{
    export_weights, find_over_influenced, import_weights, prune_to_max_influences,
    ExportOptions, ExportOutcome, ImportOptions, ImportOutcome, WeightEdit,
};
pub use reconcile::{ReconcileOptions, Reconciliation, Resolution, ResolvedInfluence};
pub use remap::RemappedWeights;
pub use rename::RenameRule;
pub use scene::Scene;
pub use weights::WeightMatrix;

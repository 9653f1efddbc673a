//! The skin weight document, the unit of persistence.

use std::collections::BTreeSet;

use crate::codec;
use crate::error::{SkinError, SkinResult};
use crate::influence::InfluenceRef;
use crate::weights::WeightMatrix;

/// Saved skin weights for a set of vertices of one mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct SkinWeightDocument {
    /// Influences in saved column order.
    pub influences: Vec<InfluenceRef>,
    /// Vertex indices of the source mesh covered by this document.
    pub components: BTreeSet<u32>,
    /// Topology fingerprint, the number of covered vertices.
    pub vertex_count: usize,
    /// Weights sized `vertex_count x influences.len()`.
    pub weights: WeightMatrix,
}

impl SkinWeightDocument {
    /// Builds a document and validates it.
    pub fn new(
        influences: Vec<InfluenceRef>,
        components: BTreeSet<u32>,
        weights: Vec<f64>,
    ) -> SkinResult<Self> {
        let weights = WeightMatrix::from_flat(influences.len(), weights)?;
        let doc = Self {
            vertex_count: components.len(),
            influences,
            components,
            weights,
        };
        doc.validate()?;
        Ok(doc)
    }

    /// Partial names of the influences, in saved order.
    pub fn partial_names(&self) -> Vec<String> {
        self.influences
            .iter()
            .map(|inf| inf.partial_name.clone())
            .collect()
    }

    /// Full paths of the influences, in saved order.
    pub fn full_paths(&self) -> Vec<String> {
        self.influences
            .iter()
            .map(|inf| inf.full_path.clone())
            .collect()
    }

    /// Checks the document invariants, reporting every problem found.
    pub fn validate(&self) -> SkinResult<()> {
        let mut problems = Vec::new();

        if self.influences.is_empty() {
            problems.push("document has no influences".to_string());
        }

        for (index, inf) in self.influences.iter().enumerate() {
            if inf.partial_name.is_empty() {
                problems.push(format!("influence {} has an empty name", index));
            }
        }

        if self.vertex_count != self.components.len() {
            problems.push(format!(
                "topology_vertex_count is {} but {} components are listed",
                self.vertex_count,
                self.components.len()
            ));
        }

        match self.vertex_count.checked_mul(self.influences.len()) {
            Some(expected) if self.weights.as_slice().len() == expected => {}
            Some(expected) => problems.push(format!(
                "expected {} weights ({} vertices x {} influences), found {}",
                expected,
                self.vertex_count,
                self.influences.len(),
                self.weights.as_slice().len()
            )),
            None => problems.push(format!(
                "{} vertices x {} influences overflows the weight count",
                self.vertex_count,
                self.influences.len()
            )),
        }

        if let Some(index) = self.weights.first_invalid() {
            problems.push(format!(
                "weight {} is negative or not finite ({})",
                index,
                self.weights.as_slice()[index]
            ));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(SkinError::invalid_document(problems.join("; ")))
        }
    }

    /// BLAKE3 hex digest of the encoded document.
    pub fn content_hash(&self) -> SkinResult<String> {
        let bytes = codec::encode(self)?;
        Ok(blake3::hash(&bytes).to_hex().to_string())
    }
}

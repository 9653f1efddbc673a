//! Row-major weight tables.

use serde::{Deserialize, Serialize};

use crate::error::{SkinError, SkinResult};

/// Tolerance used when checking that a bound row sums to one.
pub const WEIGHT_SUM_EPSILON: f64 = 1e-6;

/// A vertex-by-influence table of weights stored as one flat row-major vector.
///
/// Row `v` holds the weight of every influence for vertex `v`, in influence
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightMatrix {
    influence_count: usize,
    values: Vec<f64>,
}

impl WeightMatrix {
    /// Wraps a flat weight vector.
    ///
    /// Fails when `influence_count` is zero or does not divide the length.
    pub fn from_flat(influence_count: usize, values: Vec<f64>) -> SkinResult<Self> {
        if influence_count == 0 {
            return Err(SkinError::invalid_document(
                "weight matrix needs at least one influence column",
            ));
        }
        if values.len() % influence_count != 0 {
            return Err(SkinError::invalid_document(format!(
                "{} weights cannot be split into rows of {} influences",
                values.len(),
                influence_count
            )));
        }
        Ok(Self {
            influence_count,
            values,
        })
    }

    /// Creates a matrix with every weight set to zero.
    pub fn zeros(vertex_count: usize, influence_count: usize) -> SkinResult<Self> {
        let len = vertex_count.checked_mul(influence_count).ok_or_else(|| {
            SkinError::invalid_document(format!(
                "{} vertices x {} influences overflows the weight count",
                vertex_count, influence_count
            ))
        })?;
        Self::from_flat(influence_count, vec![0.0; len])
    }

    /// Number of influence columns.
    pub fn influence_count(&self) -> usize {
        self.influence_count
    }

    /// Number of vertex rows.
    pub fn vertex_count(&self) -> usize {
        if self.influence_count == 0 {
            0
        } else {
            self.values.len() / self.influence_count
        }
    }

    /// The flat row-major values.
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Consumes the matrix, returning the flat values.
    pub fn into_vec(self) -> Vec<f64> {
        self.values
    }

    /// Weights of one vertex.
    pub fn row(&self, vertex: usize) -> &[f64] {
        let start = vertex * self.influence_count;
        &self.values[start..start + self.influence_count]
    }

    /// Mutable weights of one vertex.
    pub fn row_mut(&mut self, vertex: usize) -> &mut [f64] {
        let start = vertex * self.influence_count;
        &mut self.values[start..start + self.influence_count]
    }

    /// Iterates over vertex rows.
    pub fn rows(&self) -> std::slice::ChunksExact<'_, f64> {
        self.values.chunks_exact(self.influence_count)
    }

    /// Iterates mutably over vertex rows.
    pub fn rows_mut(&mut self) -> std::slice::ChunksExactMut<'_, f64> {
        self.values.chunks_exact_mut(self.influence_count)
    }

    /// Weight of `vertex` for the influence in column `influence`.
    pub fn get(&self, vertex: usize, influence: usize) -> f64 {
        self.values[vertex * self.influence_count + influence]
    }

    /// Returns the flat index of the first weight that is negative or not finite.
    pub fn first_invalid(&self) -> Option<usize> {
        self.values.iter().position(|w| !w.is_finite() || *w < 0.0)
    }
}

/// Sum of a weight row.
pub fn row_sum(row: &[f64]) -> f64 {
    row.iter().sum()
}

/// Number of influences with a weight strictly greater than zero.
pub fn live_influence_count(row: &[f64]) -> usize {
    row.iter().filter(|w| **w > 0.0).count()
}

/// True when the row sums to one within [`WEIGHT_SUM_EPSILON`].
pub fn is_normalized(row: &[f64]) -> bool {
    (row_sum(row) - 1.0).abs() <= WEIGHT_SUM_EPSILON
}

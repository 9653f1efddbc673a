//! Re-aligning saved weight columns onto a live influence order.

use log::warn;

use crate::error::{SkinError, SkinResult};
use crate::weights::WeightMatrix;

/// Weights aligned to the live influence order.
#[derive(Debug, Clone, PartialEq)]
pub struct RemappedWeights {
    /// Live influence positions written by `weights`, in live order.
    pub influence_indices: Vec<usize>,
    /// One column per entry of `influence_indices`.
    pub weights: WeightMatrix,
    /// True when the saved order already matched and weights passed through.
    pub passthrough: bool,
    /// Saved names with no live influence; their weight is not carried over.
    pub dropped: Vec<String>,
}

/// Maps weights whose columns follow `saved` onto the columns of `live`.
///
/// Every live column receives the sum of all saved columns carrying its name,
/// so several saved influences collapsing onto one live influence keep their
/// combined weight. Live influences with no saved counterpart get zero.
pub fn remap(saved: &[String], weights: &WeightMatrix, live: &[String]) -> SkinResult<RemappedWeights> {
    if saved.len() != weights.influence_count() {
        return Err(SkinError::invalid_document(format!(
            "{} influence names for {} weight columns",
            saved.len(),
            weights.influence_count()
        )));
    }
    if live.is_empty() {
        return Err(SkinError::scene("skin binding has no influences"));
    }

    if saved == live {
        return Ok(RemappedWeights {
            influence_indices: (0..live.len()).collect(),
            weights: weights.clone(),
            passthrough: true,
            dropped: Vec::new(),
        });
    }

    let targets: Vec<Option<usize>> = saved
        .iter()
        .map(|name| live.iter().position(|l| l == name))
        .collect();

    let mut dropped: Vec<String> = Vec::new();
    for (name, target) in saved.iter().zip(&targets) {
        if target.is_none() && !dropped.contains(name) {
            warn!("Influence {} is not bound; its weights are dropped", name);
            dropped.push(name.clone());
        }
    }

    let mut out = WeightMatrix::zeros(weights.vertex_count(), live.len())?;
    for (src, dst) in weights.rows().zip(out.rows_mut()) {
        for (weight, target) in src.iter().zip(&targets) {
            if let Some(column) = target {
                dst[*column] += weight;
            }
        }
    }

    Ok(RemappedWeights {
        influence_indices: (0..live.len()).collect(),
        weights: out,
        passthrough: false,
        dropped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_identical_order_passes_through() {
        let weights = WeightMatrix::from_flat(2, vec![0.25, 0.75, 1.0, 0.0]).unwrap();
        let result = remap(&names(&["a", "b"]), &weights, &names(&["a", "b"])).unwrap();
        assert!(result.passthrough);
        assert_eq!(result.weights, weights);
        assert_eq!(result.influence_indices, vec![0, 1]);
    }

    #[test]
    fn test_reorders_columns() {
        let weights = WeightMatrix::from_flat(2, vec![0.25, 0.75]).unwrap();
        let result = remap(&names(&["a", "b"]), &weights, &names(&["b", "c", "a"])).unwrap();
        assert!(!result.passthrough);
        assert_eq!(result.weights.as_slice(), &[0.75, 0.0, 0.25]);
        assert_eq!(result.influence_indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_many_to_one_conserves_weight() {
        let weights = WeightMatrix::from_flat(3, vec![0.3, 0.2, 0.5]).unwrap();
        let result = remap(&names(&["C", "C", "D"]), &weights, &names(&["C", "D"])).unwrap();
        assert_eq!(result.weights.get(0, 0), 0.5);
        assert_eq!(result.weights.get(0, 1), 0.5);
    }

    #[test]
    fn test_unbound_saved_columns_are_reported() {
        let weights = WeightMatrix::from_flat(2, vec![0.4, 0.6]).unwrap();
        let result = remap(&names(&["a", "gone"]), &weights, &names(&["a"])).unwrap();
        assert_eq!(result.weights.as_slice(), &[0.4]);
        assert_eq!(result.dropped, vec!["gone"]);
    }

    #[test]
    fn test_column_count_mismatch() {
        let weights = WeightMatrix::from_flat(2, vec![0.4, 0.6]).unwrap();
        assert!(remap(&names(&["a"]), &weights, &names(&["a"])).is_err());
    }
}

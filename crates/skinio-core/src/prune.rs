//! Capping the number of influences per vertex.
//!
//! Each row keeps its `k` heaviest influences, ties broken by lower influence
//! index, and the kept weights are rescaled to sum to one. Rows whose kept
//! weights sum to zero are left untouched.

use std::cmp::Ordering;

use crate::error::{SkinError, SkinResult};
use crate::weights::{live_influence_count, WeightMatrix};

/// Counts from a pruning pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneStats {
    /// Rows that were rewritten.
    pub rows_changed: usize,
    /// Rows skipped because their kept weights summed to zero.
    pub rows_unbound: usize,
}

/// Rejects a max influence count of zero.
pub fn check_max_influences(k: usize) -> SkinResult<()> {
    if k == 0 {
        return Err(SkinError::InvalidMaxInfluences { value: k });
    }
    Ok(())
}

/// Heaviest-first ordering; equal weights keep ascending index order.
fn by_weight_desc(a: &(usize, f64), b: &(usize, f64)) -> Ordering {
    b.1.total_cmp(&a.1).then(a.0.cmp(&b.0))
}

/// Prunes one row in place to at most `k` non-zero weights.
///
/// Returns false if the kept weights sum to zero, in which case the row is
/// not modified.
pub fn prune_row(row: &mut [f64], k: usize) -> bool {
    let mut ranked: Vec<(usize, f64)> = row.iter().copied().enumerate().collect();
    ranked.sort_by(by_weight_desc);

    let kept = &ranked[..k.min(ranked.len())];
    let sum: f64 = kept.iter().map(|(_, w)| w).sum();
    if sum <= 0.0 {
        return false;
    }

    let scale = 1.0 / sum;
    row.fill(0.0);
    for &(index, weight) in kept {
        row[index] = weight * scale;
    }
    true
}

/// Prunes every row of `weights` to at most `k` non-zero weights.
pub fn prune_matrix(weights: &mut WeightMatrix, k: usize) -> SkinResult<PruneStats> {
    check_max_influences(k)?;

    let mut stats = PruneStats::default();
    for row in weights.rows_mut() {
        let before = row.to_vec();
        if !prune_row(row, k) {
            stats.rows_unbound += 1;
        } else if before != row {
            stats.rows_changed += 1;
        }
    }
    Ok(stats)
}

/// Rows with more than `k` strictly positive weights.
pub fn over_influenced(weights: &WeightMatrix, k: usize) -> Vec<usize> {
    weights
        .rows()
        .enumerate()
        .filter(|(_, row)| live_influence_count(row) > k)
        .map(|(vertex, _)| vertex)
        .collect()
}

//! Item-item cosine similarity over the columns of an interaction matrix.

use crate::matrix::InteractionMatrix;
use itemcf_core::config::SimilarityConfig;
use itemcf_core::{EngineError, EngineResult, ItemId};
use ndarray::{Array2, ArrayView1};
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info};

/// Symmetric item x item cosine similarities, indexed by the interaction
/// matrix's item ids in the same column order.
#[derive(Debug, Clone)]
pub struct SimilarityMatrix {
    items: Vec<ItemId>,
    index: HashMap<ItemId, usize>,
    values: Array2<f64>,
}

/// Compute the item-item similarity matrix with default settings.
pub fn compute_similarity(matrix: &InteractionMatrix) -> EngineResult<SimilarityMatrix> {
    compute_similarity_with(matrix, &SimilarityConfig::default())
}

/// Compute the item-item similarity matrix.
///
/// Each item is a vector over all users (zero where unrated), and
/// `sim(i, j) = v_i . v_j / (|v_i| |v_j|)`. Pairs involving an item with no
/// nonzero ratings score 0. The diagonal is 1 for every other item.
///
/// Rows of the upper triangle are independent, so with `config.parallel`
/// set they are spread over the rayon pool. Each (i, j) value is mirrored
/// into (j, i) from the same computation.
pub fn compute_similarity_with(
    matrix: &InteractionMatrix,
    config: &SimilarityConfig,
) -> EngineResult<SimilarityMatrix> {
    if matrix.is_empty() {
        return Err(EngineError::EmptyMatrix);
    }

    let n = matrix.item_count();
    let start = std::time::Instant::now();

    // Item-major copy so every item vector is a contiguous row.
    let mut vectors = matrix.values().t().as_standard_layout().into_owned();
    // Cosine is scale-invariant; dividing each vector by its largest
    // magnitude keeps the squared norms finite and nonzero for any finite
    // rating scale.
    for mut row in vectors.rows_mut() {
        let peak = row.iter().fold(0.0_f64, |peak, v| peak.max(v.abs()));
        if peak > 0.0 {
            row.mapv_inplace(|v| v / peak);
        }
    }
    let norms: Vec<f64> = (0..n)
        .map(|i| {
            let v = vectors.row(i);
            v.dot(&v).sqrt()
        })
        .collect();

    let parallel = config.parallel && n >= config.parallel_min_items;
    debug!(
        items = n,
        users = matrix.user_count(),
        parallel = parallel,
        "Computing item-item similarity"
    );

    let upper: Vec<Vec<f64>> = if parallel {
        (0..n)
            .into_par_iter()
            .map(|i| upper_row(&vectors, &norms, i))
            .collect()
    } else {
        (0..n).map(|i| upper_row(&vectors, &norms, i)).collect()
    };

    let mut values = Array2::<f64>::zeros((n, n));
    for (i, row) in upper.into_iter().enumerate() {
        for (offset, sim) in row.into_iter().enumerate() {
            let j = i + offset;
            values[[i, j]] = sim;
            values[[j, i]] = sim;
        }
    }

    info!(
        items = n,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Item-item similarity matrix computed"
    );

    let items = matrix.items().to_vec();
    let index = items.iter().enumerate().map(|(i, &id)| (id, i)).collect();
    Ok(SimilarityMatrix {
        items,
        index,
        values,
    })
}

/// Similarities of item `i` against items `i..n`.
fn upper_row(vectors: &Array2<f64>, norms: &[f64], i: usize) -> Vec<f64> {
    let vi = vectors.row(i);
    (i..norms.len())
        .map(|j| {
            if norms[i] == 0.0 || norms[j] == 0.0 {
                0.0
            } else if j == i {
                1.0
            } else {
                (vi.dot(&vectors.row(j)) / (norms[i] * norms[j])).clamp(-1.0, 1.0)
            }
        })
        .collect()
}

impl SimilarityMatrix {
    /// Item ids in row/column order.
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item_id: ItemId) -> bool {
        self.index.contains_key(&item_id)
    }

    pub fn position(&self, item_id: ItemId) -> Option<usize> {
        self.index.get(&item_id).copied()
    }

    /// Similarity of two items, `None` if either id is absent.
    pub fn get(&self, a: ItemId, b: ItemId) -> Option<f64> {
        let i = self.position(a)?;
        let j = self.position(b)?;
        Some(self.values[[i, j]])
    }

    pub fn similarity(&self, a: ItemId, b: ItemId) -> EngineResult<f64> {
        let i = self.require(a)?;
        let j = self.require(b)?;
        Ok(self.values[[i, j]])
    }

    /// All similarities of one item, in `items()` order.
    pub fn row(&self, item_id: ItemId) -> EngineResult<ArrayView1<'_, f64>> {
        let i = self.require(item_id)?;
        Ok(self.values.row(i))
    }

    /// The `n` items most similar to `item_id`, excluding itself, ordered by
    /// descending similarity and then ascending id.
    pub fn similar_items(&self, item_id: ItemId, n: usize) -> EngineResult<Vec<(ItemId, f64)>> {
        let i = self.require(item_id)?;
        let mut neighbors: Vec<(ItemId, f64)> = self
            .values
            .row(i)
            .iter()
            .enumerate()
            .filter(|&(j, _)| j != i)
            .map(|(j, &sim)| (self.items[j], sim))
            .collect();

        neighbors.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });
        neighbors.truncate(n);
        Ok(neighbors)
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub(crate) fn value_at(&self, i: usize, j: usize) -> f64 {
        self.values[[i, j]]
    }

    pub(crate) fn require(&self, item_id: ItemId) -> EngineResult<usize> {
        self.position(item_id)
            .ok_or(EngineError::UnknownItem(item_id))
    }

    /// For each column of `matrix`, the matching position in this
    /// similarity matrix, if the item is present.
    pub(crate) fn column_map(&self, matrix: &InteractionMatrix) -> Vec<Option<usize>> {
        if self.items.as_slice() == matrix.items() {
            return (0..self.items.len()).map(Some).collect();
        }
        matrix.items().iter().map(|&id| self.position(id)).collect()
    }
}

use parking_lot::RwLock;
use rayon::prelude::*;
use std::collections::HashMap;
use crate::core::error::{Error, ErrorKind, Result};

/// Per-field cosine-similarity index. Vectors are unit-normalized at insert,
/// so similarity is a plain dot product.
pub struct VectorIndex {
    dim: usize,
    vectors: RwLock<HashMap<String, Vec<f32>>>,
}

/// A single vector search hit; scores lie in [-1, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMatch {
    pub key: String,
    pub score: f32,
}

fn normalize(vector: &mut [f32]) {
    let magnitude = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for v in vector.iter_mut() {
            *v /= magnitude;
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

impl VectorIndex {
    pub fn new(dim: usize) -> Self {
        VectorIndex {
            dim,
            vectors: RwLock::new(HashMap::new()),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.vectors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn update(&self, key: &str, vector: &[f32]) -> Result<()> {
        if vector.len() != self.dim {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "vector dimension mismatch: expected {}, got {}",
                    self.dim,
                    vector.len()
                ),
            ));
        }

        let mut normalized = vector.to_vec();
        normalize(&mut normalized);
        self.vectors.write().insert(key.to_string(), normalized);

        Ok(())
    }

    pub fn remove(&self, key: &str) {
        self.vectors.write().remove(key);
    }

    /// Brute-force cosine scan over every stored vector, descending by
    /// similarity, truncated to `k`.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<VectorMatch>> {
        if query.len() != self.dim {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "query dimension mismatch: expected {}, got {}",
                    self.dim,
                    query.len()
                ),
            ));
        }

        let mut normalized = query.to_vec();
        normalize(&mut normalized);

        let vectors = self.vectors.read();
        let mut results: Vec<VectorMatch> = vectors
            .iter()
            .map(|(key, vector)| VectorMatch {
                key: key.clone(),
                score: dot(&normalized, vector),
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        results.truncate(k);

        Ok(results)
    }

    /// Top-k per query, fanned out across the rayon pool. Output order
    /// follows input order; any per-query failure fails the batch.
    pub fn batch_search(&self, queries: &[Vec<f32>], k: usize) -> Result<Vec<Vec<VectorMatch>>> {
        queries
            .par_iter()
            .map(|query| self.search(query, k))
            .collect()
    }
}

use serde::{Serialize, Deserialize};
use std::collections::HashMap;
use crate::core::types::Value;

/// A combined search request. Empty members switch their criterion off:
/// empty text skips fuzzy search, an empty vector skips similarity search,
/// empty filters skip equality filtering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub vector: Vec<f32>,
    #[serde(default)]
    pub filters: HashMap<String, Value>,
    /// 0 means no limit for text and filter results; the vector index
    /// returns at most this many hits per index either way.
    #[serde(default)]
    pub max_results: usize,
    /// Score floor, applied within text fuzzy search only.
    #[serde(default)]
    pub min_score: f64,
}

/// One ranked hit of a combined search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub key: String,
    pub value: Value,
    #[serde(default)]
    pub text_score: f64,
    #[serde(default)]
    pub vector_score: f32,
    pub combined_score: f64,
}

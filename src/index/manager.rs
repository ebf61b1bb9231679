use parking_lot::RwLock;
use serde::{Serialize, Deserialize};
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::stats::{IndexFamilyStats, IndexStats};
use crate::core::types::Value;
use crate::index::ordered::{OrderedIndex, Scalar};
use crate::index::trigram::{TextMatch, TrigramIndex};
use crate::index::vector::{VectorIndex, VectorMatch};

/// Dimension used when a vector index is created without an explicit one.
pub const DEFAULT_VECTOR_DIM: usize = 384;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    Text,
    Vector,
    Ordered,
}

impl FromStr for IndexType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(IndexType::Text),
            "vector" => Ok(IndexType::Vector),
            "ordered" => Ok(IndexType::Ordered),
            other => Err(Error::new(
                ErrorKind::InvalidArgument,
                format!("unknown index type: {}", other),
            )),
        }
    }
}

struct IndexMaps {
    text: HashMap<String, TrigramIndex>,
    vectors: HashMap<String, VectorIndex>,
    ordered: HashMap<String, OrderedIndex>,
}

/// Owns the per-field indexes of all three families and keeps them coherent
/// with the document map. One reader/writer lock guards the family maps;
/// every index carries its own internal lock, so updates hold this one only
/// for read.
pub struct IndexManager {
    inner: RwLock<IndexMaps>,
}

impl IndexManager {
    pub fn new() -> Self {
        IndexManager {
            inner: RwLock::new(IndexMaps {
                text: HashMap::new(),
                vectors: HashMap::new(),
                ordered: HashMap::new(),
            }),
        }
    }

    /// Create the named index with defaults. No-op when it already exists.
    /// Documents inserted beforehand are not backfilled.
    pub fn add_index(&self, field: &str, kind: IndexType) {
        match kind {
            IndexType::Text => {
                self.inner
                    .write()
                    .text
                    .entry(field.to_string())
                    .or_insert_with(TrigramIndex::new);
            }
            IndexType::Vector => {
                self.add_vector_index(field, DEFAULT_VECTOR_DIM);
            }
            IndexType::Ordered => {
                self.inner
                    .write()
                    .ordered
                    .entry(field.to_string())
                    .or_insert_with(OrderedIndex::new);
            }
        }
    }

    /// Create a vector index with an explicit dimension. No-op when the
    /// field already has one, even with a different dimension.
    pub fn add_vector_index(&self, field: &str, dim: usize) {
        self.inner
            .write()
            .vectors
            .entry(field.to_string())
            .or_insert_with(|| VectorIndex::new(dim));
    }

    pub fn remove_index(&self, field: &str, kind: IndexType) -> Result<()> {
        let mut inner = self.inner.write();

        let removed = match kind {
            IndexType::Text => inner.text.remove(field).is_some(),
            IndexType::Vector => inner.vectors.remove(field).is_some(),
            IndexType::Ordered => inner.ordered.remove(field).is_some(),
        };

        if removed {
            Ok(())
        } else {
            Err(Error::new(
                ErrorKind::NotFound,
                format!("index not found: {} ({:?})", field, kind),
            ))
        }
    }

    /// Route a document's fields into every index whose field name matches.
    /// Non-mapping values are not indexed; fields whose value has the wrong
    /// shape for an index family are skipped. A numeric sequence with the
    /// wrong length for its vector index is an input error and propagates.
    pub fn update(&self, key: &str, value: &Value) -> Result<()> {
        let fields = match value.as_map() {
            Some(fields) => fields,
            None => return Ok(()),
        };

        let inner = self.inner.read();

        for (field, index) in &inner.ordered {
            if let Some(scalar) = fields.get(field).and_then(Scalar::from_value) {
                index.update(key, scalar);
            }
        }

        for (field, index) in &inner.vectors {
            if let Some(vector) = fields.get(field).and_then(Value::as_f32_vector) {
                index.update(key, &vector)?;
            }
        }

        for (field, index) in &inner.text {
            if let Some(text) = fields.get(field).and_then(Value::as_str) {
                index.update(key, text);
            }
        }

        Ok(())
    }

    /// Drop a key from every index of every family. Missing keys are ignored.
    pub fn remove(&self, key: &str) {
        let inner = self.inner.read();

        for index in inner.ordered.values() {
            index.remove(key);
        }
        for index in inner.vectors.values() {
            index.remove(key);
        }
        for index in inner.text.values() {
            index.remove(key);
        }
    }

    /// Fuzzy-search every text index and collect all hits.
    pub fn text_search(&self, query: &str, min_score: f64, max_results: usize) -> Vec<TextMatch> {
        let inner = self.inner.read();

        let mut hits = Vec::new();
        for index in inner.text.values() {
            hits.extend(index.fuzzy_search(query, min_score, max_results));
        }
        hits
    }

    /// Search every vector index; any per-index error fails the query.
    pub fn vector_search(&self, query: &[f32], k: usize) -> Result<Vec<VectorMatch>> {
        let inner = self.inner.read();

        let mut hits = Vec::new();
        for index in inner.vectors.values() {
            hits.extend(index.search(query, k)?);
        }
        Ok(hits)
    }

    /// Equality-filter search: each `(field, value)` pair constrains the
    /// result to keys whose ordered-index entry equals the value; the result
    /// is the intersection across constrained fields. Fields without an
    /// ordered index add no constraint; a non-scalar filter value can match
    /// nothing and yields an empty constraint.
    pub fn filter_search(&self, filters: &HashMap<String, Value>) -> Vec<String> {
        let inner = self.inner.read();

        let mut result: Option<HashSet<String>> = None;

        for (field, value) in filters {
            let index = match inner.ordered.get(field) {
                Some(index) => index,
                None => continue,
            };

            let field_keys: HashSet<String> = match Scalar::from_value(value) {
                Some(scalar) => index.lookup_eq(&scalar).into_iter().collect(),
                None => HashSet::new(),
            };

            result = Some(match result {
                None => field_keys,
                Some(acc) => acc.intersection(&field_keys).cloned().collect(),
            });
        }

        result.map(|set| set.into_iter().collect()).unwrap_or_default()
    }

    /// Fresh per-family counts for the stats snapshot.
    pub fn stats(&self) -> IndexStats {
        let inner = self.inner.read();

        IndexStats {
            text_indexes: IndexFamilyStats {
                count: inner.text.len(),
                entry_count: inner.text.values().map(TrigramIndex::len).sum(),
            },
            vector_indexes: IndexFamilyStats {
                count: inner.vectors.len(),
                entry_count: inner.vectors.values().map(VectorIndex::len).sum(),
            },
            ordered_indexes: IndexFamilyStats {
                count: inner.ordered.len(),
                entry_count: inner.ordered.values().map(OrderedIndex::len).sum(),
            },
        }
    }
}

impl Default for IndexManager {
    fn default() -> Self {
        Self::new()
    }
}

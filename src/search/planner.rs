use std::collections::{HashMap, HashSet};
use crate::core::error::Result;
use crate::core::store::Store;
use crate::core::types::Value;
use crate::search::results::{SearchQuery, SearchResult};

/// Averaging fusion of the two score streams. Text-only hits never get here
/// and keep a combined score of zero, so ranking favors vector matches.
fn combined_score(text_score: f64, vector_score: f64) -> f64 {
    (text_score + vector_score) / 2.0
}

impl Store {
    /// Hybrid search: merge text, vector, and filter criteria into one
    /// ranked, deduplicated result list. A stale index entry whose document
    /// is gone is silently dropped; search never fails because of one.
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>> {
        let inner = self.inner.read();

        let text_hits = if !query.text.is_empty() {
            self.indexes
                .text_search(&query.text, query.min_score, query.max_results)
        } else {
            Vec::new()
        };

        let vector_hits = if !query.vector.is_empty() {
            self.indexes
                .vector_search(&query.vector, query.max_results)?
        } else {
            Vec::new()
        };

        let allowed: Option<HashSet<String>> = if !query.filters.is_empty() {
            Some(self.indexes.filter_search(&query.filters).into_iter().collect())
        } else {
            None
        };

        let mut merged: HashMap<String, SearchResult> = HashMap::new();

        for hit in text_hits {
            merged.insert(
                hit.key.clone(),
                SearchResult {
                    key: hit.key,
                    value: Value::Null,
                    text_score: hit.score,
                    vector_score: 0.0,
                    combined_score: 0.0,
                },
            );
        }

        for hit in vector_hits {
            match merged.get_mut(&hit.key) {
                Some(result) => {
                    result.vector_score = hit.score;
                    result.combined_score =
                        combined_score(result.text_score, hit.score as f64);
                }
                None => {
                    merged.insert(
                        hit.key.clone(),
                        SearchResult {
                            key: hit.key,
                            value: Value::Null,
                            text_score: 0.0,
                            vector_score: hit.score,
                            combined_score: hit.score as f64,
                        },
                    );
                }
            }
        }

        if let Some(allowed) = allowed {
            merged.retain(|key, _| allowed.contains(key));
        }

        let mut results: Vec<SearchResult> = merged
            .into_values()
            .filter_map(|mut result| {
                let entry = inner.data.get(&result.key)?;
                result.value = entry.value.clone();
                Some(result)
            })
            .collect();

        results.sort_by(|a, b| b.combined_score.total_cmp(&a.combined_score));
        if query.max_results > 0 && results.len() > query.max_results {
            results.truncate(query.max_results);
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::StoreOptions;
    use crate::core::store::Store;
    use crate::index::manager::IndexType;
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::tempdir;

    fn open_store(dir: &tempfile::TempDir) -> Arc<Store> {
        let options = StoreOptions {
            initial_size: 4096,
            sync_interval: Duration::from_secs(3600),
            ..Default::default()
        };
        Store::open(dir.path().join("data.json"), options).unwrap()
    }

    #[test]
    fn stale_index_entries_are_dropped_not_errors() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        store.create_index("title", IndexType::Text);

        // Index a document that never makes it into the map
        store
            .indexes
            .update("ghost", &Value::from(json!({"title": "phantom"})))
            .unwrap();

        let results = store
            .search(&SearchQuery {
                text: "phantom".into(),
                ..Default::default()
            })
            .unwrap();
        assert!(results.is_empty());
        store.close().unwrap();
    }

    #[test]
    fn filters_constrain_text_hits() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        store.create_index("title", IndexType::Text);
        store.create_index("tag", IndexType::Ordered);

        store
            .set("a", Value::from(json!({"title": "shared words", "tag": "keep"})))
            .unwrap();
        store
            .set("b", Value::from(json!({"title": "shared words", "tag": "drop"})))
            .unwrap();

        let results = store
            .search(&SearchQuery {
                text: "shared".into(),
                filters: HashMap::from([("tag".to_string(), Value::from("keep"))]),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].key, "a");
        store.close().unwrap();
    }

    #[test]
    fn max_results_caps_the_merged_list() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        store.create_index("title", IndexType::Text);

        for i in 0..5 {
            store
                .set(
                    &format!("doc{}", i),
                    Value::from(json!({"title": "common phrase"})),
                )
                .unwrap();
        }

        let results = store
            .search(&SearchQuery {
                text: "common".into(),
                max_results: 2,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(results.len(), 2);
        store.close().unwrap();
    }

    #[test]
    fn vector_dimension_errors_fail_the_whole_query() {
        let dir = tempdir().unwrap();
        let store = open_store(&dir);
        store.create_vector_index("embedding", 3);

        store
            .set("a", Value::from(json!({"embedding": [1, 0, 0]})))
            .unwrap();

        let err = store.search(&SearchQuery {
            vector: vec![1.0, 0.0],
            max_results: 1,
            ..Default::default()
        });
        assert!(err.is_err());
        store.close().unwrap();
    }
}

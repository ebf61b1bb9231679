use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

/// Per-field fuzzy text index over character trigram posting lists.
///
/// Grams are 3-byte windows of the lowercased text. Slicing happens on raw
/// UTF-8 bytes, so multibyte characters can be split across grams; matching
/// stays symmetric because queries go through the same generation.
pub struct TrigramIndex {
    inner: RwLock<TrigramInner>,
}

struct TrigramInner {
    /// gram -> document keys containing it
    grams: HashMap<Vec<u8>, HashSet<String>>,
    /// document key -> original text, kept so updates can retract old grams
    docs: HashMap<String, String>,
}

/// A single text search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct TextMatch {
    pub key: String,
    pub score: f64,
}

/// Lowercase the input and emit every contiguous 3-byte window; text shorter
/// than 3 bytes becomes a single gram equal to itself.
fn trigrams(text: &str) -> Vec<Vec<u8>> {
    let lower = text.to_lowercase();
    let bytes = lower.as_bytes();

    if bytes.len() < 3 {
        return vec![bytes.to_vec()];
    }

    bytes.windows(3).map(|w| w.to_vec()).collect()
}

impl TrigramIndex {
    pub fn new() -> Self {
        TrigramIndex {
            inner: RwLock::new(TrigramInner {
                grams: HashMap::new(),
                docs: HashMap::new(),
            }),
        }
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.inner.read().docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn update(&self, key: &str, text: &str) {
        let mut inner = self.inner.write();

        if let Some(old_text) = inner.docs.remove(key) {
            inner.retract(key, &old_text);
        }

        inner.docs.insert(key.to_string(), text.to_string());
        for gram in trigrams(text) {
            inner.grams.entry(gram).or_default().insert(key.to_string());
        }
    }

    pub fn remove(&self, key: &str) {
        let mut inner = self.inner.write();

        if let Some(text) = inner.docs.remove(key) {
            inner.retract(key, &text);
        }
    }

    /// Score every document sharing grams with the query: score = matched
    /// query grams / total query grams, duplicates counted on both sides.
    pub fn search(&self, query: &str, max_results: usize) -> Vec<TextMatch> {
        let inner = self.inner.read();
        let query_grams = trigrams(query);

        let mut matches: HashMap<&str, usize> = HashMap::new();
        for gram in &query_grams {
            if let Some(keys) = inner.grams.get(gram) {
                for key in keys {
                    *matches.entry(key).or_insert(0) += 1;
                }
            }
        }

        let total = query_grams.len() as f64;
        let mut results: Vec<TextMatch> = matches
            .into_iter()
            .map(|(key, count)| TextMatch {
                key: key.to_string(),
                score: count as f64 / total,
            })
            .collect();

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        if max_results > 0 && results.len() > max_results {
            results.truncate(max_results);
        }

        results
    }

    pub fn fuzzy_search(&self, query: &str, min_score: f64, max_results: usize) -> Vec<TextMatch> {
        let mut results = self.search(query, 0);
        results.retain(|m| m.score >= min_score);

        if max_results > 0 && results.len() > max_results {
            results.truncate(max_results);
        }

        results
    }
}

impl TrigramInner {
    fn retract(&mut self, key: &str, text: &str) {
        for gram in trigrams(text) {
            if let Some(keys) = self.grams.get_mut(&gram) {
                keys.remove(key);
                if keys.is_empty() {
                    self.grams.remove(&gram);
                }
            }
        }
    }
}

impl Default for TrigramIndex {
    fn default() -> Self {
        Self::new()
    }
}

use lodestore::core::config::StoreOptions;
use lodestore::core::store::Store;
use lodestore::core::types::Value;
use lodestore::index::manager::IndexType;
use lodestore::search::results::SearchQuery;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

fn test_options() -> StoreOptions {
    StoreOptions {
        initial_size: 4096,
        sync_interval: Duration::from_secs(3600),
        ..Default::default()
    }
}

fn open_store(dir: &TempDir, options: StoreOptions) -> Arc<Store> {
    Store::open(dir.path().join("data.json"), options).unwrap()
}

#[test]
fn text_search_scores_substring_query_at_one() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, test_options());
    store.create_index("title", IndexType::Text);

    store
        .set(
            "a",
            Value::from(json!({"title": "hello world", "embedding": [1, 0, 0]})),
        )
        .unwrap();

    let results = store
        .search(&SearchQuery {
            text: "hello".into(),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].key, "a");
    assert_eq!(results[0].text_score, 1.0);
    // Text-only hits carry no combined score
    assert_eq!(results[0].combined_score, 0.0);

    store.close().unwrap();
}

#[test]
fn vector_search_ranks_by_cosine() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, test_options());
    store.create_vector_index("embedding", 3);

    store
        .set("a", Value::from(json!({"embedding": [1, 0, 0]})))
        .unwrap();
    store
        .set("b", Value::from(json!({"embedding": [0, 1, 0]})))
        .unwrap();

    let results = store
        .search(&SearchQuery {
            vector: vec![1.0, 0.0, 0.0],
            max_results: 2,
            ..Default::default()
        })
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].key, "a");
    assert!(results[0].vector_score > 0.999);
    assert_eq!(results[1].key, "b");
    assert!(results[1].vector_score.abs() < 1e-6);

    for result in &results {
        assert!(result.vector_score >= -1.0 - 1e-6);
        assert!(result.vector_score <= 1.0 + 1e-6);
    }

    store.close().unwrap();
}

#[test]
fn ttl_entry_becomes_absent_after_expiry() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, test_options());

    store
        .set_with_ttl("tmp", Value::Int(42), Duration::from_secs(1))
        .unwrap();
    assert!(store.get("tmp").is_some());

    // Expiry is in whole seconds and strict, so wait past the full window
    std::thread::sleep(Duration::from_millis(2200));
    assert!(store.get("tmp").is_none());

    store.close().unwrap();
}

#[test]
fn synced_entries_survive_reopen() {
    let dir = TempDir::new().unwrap();

    let store = open_store(&dir, test_options());
    store
        .set("x", Value::from(json!({"title": "alpha"})))
        .unwrap();
    store.sync().unwrap();
    // Simulated crash: no close, the store is just dropped
    drop(store);

    let store = open_store(&dir, test_options());
    let entry = store.get("x").unwrap();
    assert_eq!(entry.value, Value::from(json!({"title": "alpha"})));
    store.close().unwrap();
}

#[test]
fn round_trip_preserves_all_live_entries() {
    let dir = TempDir::new().unwrap();

    let store = open_store(&dir, test_options());
    let docs = vec![
        ("plain", Value::from("string value")),
        ("number", Value::Int(-3)),
        (
            "nested",
            Value::from(json!({"a": [1, 2.5, null], "b": {"c": true}})),
        ),
    ];
    for (key, value) in &docs {
        store.set(key, value.clone()).unwrap();
    }
    store.close().unwrap();
    drop(store);

    let store = open_store(&dir, test_options());
    for (key, value) in &docs {
        assert_eq!(&store.get(key).unwrap().value, value, "key {}", key);
    }
    assert_eq!(store.get_stats().entry_count, docs.len() as u64);
    store.close().unwrap();
}

#[test]
fn expired_entries_are_not_loaded_into_indexes() {
    let dir = TempDir::new().unwrap();

    let store = open_store(&dir, test_options());
    store.create_index("title", IndexType::Text);
    store
        .set_with_ttl(
            "fading",
            Value::from(json!({"title": "ephemeral"})),
            Duration::from_secs(1),
        )
        .unwrap();
    store.sync().unwrap();
    drop(store);

    std::thread::sleep(Duration::from_millis(2200));

    let store = open_store(&dir, test_options());
    store.create_index("title", IndexType::Text);
    assert!(store.get("fading").is_none());

    let results = store
        .search(&SearchQuery {
            text: "ephemeral".into(),
            ..Default::default()
        })
        .unwrap();
    assert!(results.is_empty());
    store.close().unwrap();
}

#[test]
fn filter_search_returns_exact_matches() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, test_options());
    store.create_index("tag", IndexType::Ordered);

    store.set("k1", Value::from(json!({"tag": "red"}))).unwrap();
    store.set("k2", Value::from(json!({"tag": "blue"}))).unwrap();

    let results = store
        .search(&SearchQuery {
            filters: HashMap::from([("tag".to_string(), Value::from("red"))]),
            ..Default::default()
        })
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].key, "k1");
    assert_eq!(results[0].value, Value::from(json!({"tag": "red"})));

    store.close().unwrap();
}

#[test]
fn combined_search_averages_text_and_vector_scores() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, test_options());
    store.create_index("title", IndexType::Text);
    store.create_vector_index("embedding", 3);

    store
        .set(
            "doc",
            Value::from(json!({"title": "hello", "embedding": [1, 0, 0]})),
        )
        .unwrap();

    let results = store
        .search(&SearchQuery {
            text: "hello".into(),
            vector: vec![1.0, 0.0, 0.0],
            max_results: 10,
            ..Default::default()
        })
        .unwrap();

    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.text_score, 1.0);
    assert!(result.vector_score > 0.999);

    let expected = (result.text_score + result.vector_score as f64) / 2.0;
    assert!((result.combined_score - expected).abs() < 1e-9);

    store.close().unwrap();
}

#[test]
fn file_only_ever_grows() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json");
    let options = StoreOptions {
        initial_size: 1024,
        sync_interval: Duration::from_secs(3600),
        ..Default::default()
    };

    let store = Store::open(&path, options).unwrap();
    let initial_len = std::fs::metadata(&path).unwrap().len();
    assert!(initial_len >= 1024);

    let mut last_len = initial_len;
    for round in 0..4 {
        for i in 0..50 {
            let key = format!("key-{}-{}", round, i);
            store
                .set(&key, Value::from("x".repeat(200).as_str()))
                .unwrap();
        }
        store.sync().unwrap();

        let len = std::fs::metadata(&path).unwrap().len();
        assert!(len >= last_len, "file shrank from {} to {}", last_len, len);
        last_len = len;
    }

    assert!(last_len > initial_len);
    store.close().unwrap();

    // Grown files reload cleanly
    let store = Store::open(&path, test_options()).unwrap();
    assert_eq!(store.get_stats().entry_count, 200);
    store.close().unwrap();
}

#[test]
fn indexes_follow_overwrites_and_deletes() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, test_options());
    store.create_index("title", IndexType::Text);
    store.create_index("tag", IndexType::Ordered);

    store
        .set("doc", Value::from(json!({"title": "first draft", "tag": "old"})))
        .unwrap();
    store
        .set("doc", Value::from(json!({"title": "final copy", "tag": "new"})))
        .unwrap();

    let stale = store
        .search(&SearchQuery {
            text: "draft".into(),
            ..Default::default()
        })
        .unwrap();
    assert!(stale.is_empty());

    let fresh = store
        .search(&SearchQuery {
            filters: HashMap::from([("tag".to_string(), Value::from("new"))]),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(fresh.len(), 1);

    store.delete("doc");
    let after_delete = store
        .search(&SearchQuery {
            text: "final".into(),
            ..Default::default()
        })
        .unwrap();
    assert!(after_delete.is_empty());

    store.close().unwrap();
}

#[test]
fn late_index_creation_is_not_retroactive() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, test_options());

    store
        .set("early", Value::from(json!({"title": "already here"})))
        .unwrap();
    store.create_index("title", IndexType::Text);

    let results = store
        .search(&SearchQuery {
            text: "already".into(),
            ..Default::default()
        })
        .unwrap();
    assert!(results.is_empty());

    store.close().unwrap();
}

#[test]
fn min_score_applies_to_text_only() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, test_options());
    store.create_index("title", IndexType::Text);
    store.create_vector_index("embedding", 2);

    store
        .set(
            "weak-text",
            Value::from(json!({"title": "hello", "embedding": [0, 1]})),
        )
        .unwrap();

    // Vastly different text, weakly related: filtered by min_score
    let results = store
        .search(&SearchQuery {
            text: "hellish".into(),
            vector: vec![0.0, 1.0],
            min_score: 0.9,
            max_results: 10,
            ..Default::default()
        })
        .unwrap();

    // Text hit is dropped by the floor, the vector hit still lands
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].text_score, 0.0);
    assert!(results[0].vector_score > 0.999);

    store.close().unwrap();
}

#[test]
fn expired_entries_linger_in_search_until_gc() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, test_options());
    store.create_index("title", IndexType::Text);

    store
        .set_with_ttl(
            "fading",
            Value::from(json!({"title": "twilight"})),
            Duration::from_secs(1),
        )
        .unwrap();
    std::thread::sleep(Duration::from_millis(2200));

    // Lapsed but not yet collected: hidden from get, still in search
    assert!(store.get("fading").is_none());
    let results = store
        .search(&SearchQuery {
            text: "twilight".into(),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(results.len(), 1);

    store.close().unwrap();
}

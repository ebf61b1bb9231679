/// Complete lodestore API walkthrough:
/// - CRUD with and without TTL
/// - Index creation (text, vector, ordered)
/// - Text, vector, filter, and combined search
/// - Manual sync and statistics

use lodestore::core::config::StoreOptions;
use lodestore::core::store::Store;
use lodestore::core::types::Value;
use lodestore::index::manager::IndexType;
use lodestore::search::results::SearchQuery;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== lodestore - API walkthrough ===\n");

    // Step 1: open the store
    println!("Opening store at ./demo-data.json ...");
    let options = StoreOptions {
        initial_size: 1024 * 1024,
        ..Default::default()
    };
    let store = Store::open("demo-data.json", options)?;
    println!("Done!\n");

    // Step 2: create indexes before inserting
    println!("Step 2: creating indexes...");
    store.create_index("title", IndexType::Text);
    store.create_index("category", IndexType::Ordered);
    store.create_vector_index("embedding", 3);
    println!("  text:title, ordered:category, vector:embedding (dim 3)\n");

    // Step 3: insert documents
    println!("Step 3: inserting documents...");
    store.set(
        "book-1",
        Value::from(json!({
            "title": "Rust in Practice",
            "category": "programming",
            "embedding": [1.0, 0.0, 0.0],
        })),
    )?;
    store.set(
        "book-2",
        Value::from(json!({
            "title": "Database Internals",
            "category": "databases",
            "embedding": [0.0, 1.0, 0.0],
        })),
    )?;
    store.set_with_ttl(
        "session-42",
        Value::from(json!({"user": "demo"})),
        Duration::from_secs(30),
    )?;
    println!("  3 documents (one with a 30s TTL)\n");

    // Step 4: point reads
    println!("Step 4: reading back...");
    match store.get("book-1") {
        Some(entry) => println!("  book-1 -> {:?}", entry.value),
        None => println!("  book-1 -> missing"),
    }
    println!("  missing -> {:?}\n", store.get("no-such-key").is_none());

    // Step 5: search
    println!("Step 5: searching...");
    let text_hits = store.search(&SearchQuery {
        text: "rust".into(),
        max_results: 5,
        ..Default::default()
    })?;
    println!("  text 'rust': {} hit(s)", text_hits.len());

    let vector_hits = store.search(&SearchQuery {
        vector: vec![0.9, 0.1, 0.0],
        max_results: 5,
        ..Default::default()
    })?;
    match vector_hits.first() {
        Some(hit) => println!(
            "  vector [0.9, 0.1, 0.0]: best = {} (score {:.3})",
            hit.key, hit.vector_score
        ),
        None => println!("  vector [0.9, 0.1, 0.0]: no hits"),
    }

    let filtered = store.search(&SearchQuery {
        filters: HashMap::from([("category".to_string(), Value::from("databases"))]),
        ..Default::default()
    })?;
    println!("  filter category=databases: {} hit(s)", filtered.len());

    let combined = store.search(&SearchQuery {
        text: "database".into(),
        vector: vec![0.0, 1.0, 0.0],
        max_results: 5,
        ..Default::default()
    })?;
    match combined.first() {
        Some(hit) => println!(
            "  combined: best = {} (combined score {:.3})\n",
            hit.key, hit.combined_score
        ),
        None => println!("  combined: no hits\n"),
    }

    // Step 6: persist and inspect
    println!("Step 6: sync + stats...");
    store.sync()?;
    let stats = store.get_stats();
    println!("  entries: {}", stats.entry_count);
    println!("  encoded bytes: {}", stats.data_size);
    println!("  file bytes: {}", stats.file_size);
    println!("  text indexes: {}\n", stats.index_stats.text_indexes.count);

    // Step 7: shut down cleanly
    println!("Step 7: closing...");
    store.close()?;
    println!("Done.");

    Ok(())
}

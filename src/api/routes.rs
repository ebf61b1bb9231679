use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Map};
use std::sync::Arc;
use std::time::Duration;

use crate::api::error::{ApiError, ApiResult};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::stats::StoreStats;
use crate::core::store::Store;
use crate::core::types::Value;
use crate::search::results::{SearchQuery, SearchResult};

#[derive(Deserialize)]
pub struct TextSearchRequest {
    pub text: String,
    #[serde(default)]
    pub max_results: usize,
    #[serde(default)]
    pub min_score: f64,
}

#[derive(Deserialize)]
pub struct VectorSearchRequest {
    pub vector: Vec<f32>,
    #[serde(default)]
    pub max_results: usize,
    #[serde(default)]
    pub min_score: f64,
}

#[derive(Deserialize)]
pub struct IndexRequest {
    pub field: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Vector indexes only; defaults to 384.
    #[serde(default)]
    pub dim: Option<usize>,
}

pub async fn get_entry(
    State(store): State<Arc<Store>>,
    Path(key): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    match store.get(&key) {
        Some(entry) => {
            let mut body = Map::new();
            body.insert(key, serde_json::to_value(entry).map_err(Error::from)?);
            Ok(Json(serde_json::Value::Object(body)))
        }
        None => Err(ApiError::NotFound("key not found".to_string())),
    }
}

pub async fn set_entry(
    State(store): State<Arc<Store>>,
    Path(key): Path<String>,
    headers: HeaderMap,
    Json(value): Json<Value>,
) -> ApiResult<Json<serde_json::Value>> {
    match headers.get("X-TTL") {
        Some(raw) => {
            let raw = raw
                .to_str()
                .map_err(|_| ApiError::BadRequest("invalid TTL format".to_string()))?;
            let ttl = parse_duration(raw)
                .map_err(|_| ApiError::BadRequest("invalid TTL format".to_string()))?;
            store.set_with_ttl(&key, value, ttl)?;
        }
        None => store.set(&key, value)?,
    }

    Ok(Json(json!({ "status": "ok" })))
}

pub async fn delete_entry(
    State(store): State<Arc<Store>>,
    Path(key): Path<String>,
) -> Json<serde_json::Value> {
    store.delete(&key);
    Json(json!({ "status": "ok" }))
}

pub async fn text_search(
    State(store): State<Arc<Store>>,
    Json(request): Json<TextSearchRequest>,
) -> ApiResult<Json<Vec<SearchResult>>> {
    let query = SearchQuery {
        text: request.text,
        max_results: request.max_results,
        min_score: request.min_score,
        ..Default::default()
    };
    Ok(Json(store.search(&query)?))
}

pub async fn vector_search(
    State(store): State<Arc<Store>>,
    Json(request): Json<VectorSearchRequest>,
) -> ApiResult<Json<Vec<SearchResult>>> {
    let query = SearchQuery {
        vector: request.vector,
        max_results: request.max_results,
        min_score: request.min_score,
        ..Default::default()
    };
    Ok(Json(store.search(&query)?))
}

pub async fn combined_search(
    State(store): State<Arc<Store>>,
    Json(query): Json<SearchQuery>,
) -> ApiResult<Json<Vec<SearchResult>>> {
    Ok(Json(store.search(&query)?))
}

pub async fn create_index(
    State(store): State<Arc<Store>>,
    Json(request): Json<IndexRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let kind = request.kind.parse()?;

    match (kind, request.dim) {
        (crate::index::manager::IndexType::Vector, Some(dim)) => {
            store.create_vector_index(&request.field, dim);
        }
        _ => store.create_index(&request.field, kind),
    }

    Ok(Json(json!({ "status": "ok" })))
}

pub async fn remove_index(
    State(store): State<Arc<Store>>,
    Json(request): Json<IndexRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let kind = request.kind.parse()?;
    store.remove_index(&request.field, kind)?;
    Ok(Json(json!({ "status": "ok" })))
}

pub async fn sync(State(store): State<Arc<Store>>) -> ApiResult<Json<serde_json::Value>> {
    store.sync()?;
    Ok(Json(json!({ "status": "ok" })))
}

pub async fn stats(State(store): State<Arc<Store>>) -> Json<StoreStats> {
    Json(store.get_stats())
}

/// Go-style duration strings: one or more `<number><unit>` segments, e.g.
/// `10s`, `5m`, `1h30m`, `250ms`.
pub fn parse_duration(input: &str) -> Result<Duration> {
    let invalid = || Error::new(ErrorKind::InvalidArgument, format!("invalid duration: {}", input));

    let mut rest = input.trim();
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total = Duration::ZERO;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .ok_or_else(invalid)?;
        if number_len == 0 {
            return Err(invalid());
        }
        let (number, tail) = rest.split_at(number_len);
        let value: f64 = number.parse().map_err(|_| invalid())?;

        let unit_len = tail
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_len);

        let seconds = match unit {
            "ms" => value / 1000.0,
            "s" => value,
            "m" => value * 60.0,
            "h" => value * 3600.0,
            _ => return Err(invalid()),
        };

        total += Duration::from_secs_f64(seconds);
        rest = next;
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_unit_durations() {
        assert_eq!(parse_duration("10s").unwrap(), Duration::from_secs(10));
        assert_eq!(parse_duration("5m").unwrap(), Duration::from_secs(300));
        assert_eq!(parse_duration("2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn parses_compound_and_fractional_durations() {
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("1.5s").unwrap(), Duration::from_millis(1500));
    }

    #[test]
    fn rejects_malformed_durations() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("10").is_err());
        assert!(parse_duration("s").is_err());
        assert!(parse_duration("10x").is_err());
        assert!(parse_duration("-5s").is_err());
    }
}

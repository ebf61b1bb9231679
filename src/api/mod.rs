//! HTTP surface: a thin axum adapter over the store.
//!
//! Every route translates directly to one core call:
//!
//! - `GET/POST/DELETE /data/:key` — CRUD (`X-TTL` header on POST for expiring
//!   entries)
//! - `POST /search/text`, `/search/vector`, `/search/combined` — hybrid search
//! - `POST /index/create`, `DELETE /index/remove` — index management
//! - `POST /admin/sync`, `GET /admin/stats` — administration
//!
//! Bodies are JSON; errors are `{"error": <message>}` with 400/404/500.

pub mod error;
pub mod routes;

pub use error::{ApiError, ApiResult};

use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::store::Store;

/// Build the router with all routes and middleware.
pub fn build_router(store: Arc<Store>) -> Router {
    Router::new()
        .route(
            "/data/:key",
            get(routes::get_entry)
                .post(routes::set_entry)
                .delete(routes::delete_entry),
        )
        .route("/search/text", post(routes::text_search))
        .route("/search/vector", post(routes::vector_search))
        .route("/search/combined", post(routes::combined_search))
        .route("/index/create", post(routes::create_index))
        .route("/index/remove", delete(routes::remove_index))
        .route("/admin/sync", post(routes::sync))
        .route("/admin/stats", get(routes::stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(store)
}

/// Serve the API until SIGINT/SIGTERM. The store is left open; the caller
/// closes it after this returns.
pub async fn serve(store: Arc<Store>, addr: &str) -> ApiResult<()> {
    let router = build_router(store);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::Internal(format!("failed to bind {}: {}", addr, e)))?;

    let shutdown = shutdown_signal()?;

    tracing::info!("listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| ApiError::Internal(format!("server error: {}", e)))?;

    tracing::info!("server shut down");
    Ok(())
}

/// Build a future that resolves on SIGINT or SIGTERM. Handler installation
/// happens here so a failure surfaces as an error to the caller instead of a
/// panic inside the shutdown future.
fn shutdown_signal() -> ApiResult<impl std::future::Future<Output = ()>> {
    #[cfg(unix)]
    let mut terminate =
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .map_err(|e| ApiError::Internal(format!("failed to install signal handler: {}", e)))?;

    Ok(async move {
        let ctrl_c = async {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %err, "Ctrl+C handler unavailable");
                std::future::pending::<()>().await
            }
        };

        #[cfg(unix)]
        let terminate = async move {
            terminate.recv().await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }

        tracing::info!("shutdown signal received");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::StoreOptions;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use std::time::Duration;
    use tempfile::tempdir;
    use tower::util::ServiceExt;

    fn create_test_app() -> (Router, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let options = StoreOptions {
            initial_size: 4096,
            sync_interval: Duration::from_secs(3600),
            ..Default::default()
        };
        let store = Store::open(dir.path().join("data.json"), options).unwrap();
        (build_router(store), dir)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let (app, _dir) = create_test_app();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/data/doc1")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"title": "hello"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/data/doc1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["doc1"]["value"]["title"], "hello");
    }

    #[tokio::test]
    async fn missing_key_returns_not_found() {
        let (app, _dir) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/data/ghost")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_always_reports_ok() {
        let (app, _dir) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/data/ghost")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn invalid_ttl_header_is_rejected() {
        let (app, _dir) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/data/tmp")
                    .header("Content-Type", "application/json")
                    .header("X-TTL", "soon")
                    .body(Body::from("1"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_index_type_is_rejected() {
        let (app, _dir) = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/index/create")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"field": "tag", "type": "bitmap"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("unknown index type"));
    }

    #[tokio::test]
    async fn text_search_finds_indexed_documents() {
        let (app, _dir) = create_test_app();

        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/index/create")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"field": "title", "type": "text"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/data/doc1")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"title": "hello world"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/search/text")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"text": "hello"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body[0]["key"], "doc1");
        assert_eq!(body[0]["text_score"], 1.0);
    }

    #[tokio::test]
    async fn admin_endpoints_respond() {
        let (app, _dir) = create_test_app();

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/admin/sync")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/admin/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["entry_count"], 0);
    }
}

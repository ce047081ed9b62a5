//! Request routing for the blob and table endpoints.

use axum::{
    body::Body,
    extract::{DefaultBodyLimit, Query, State},
    http::{HeaderMap, Method, Response, Uri},
    routing::any,
    Router,
};
use bytes::Bytes;
use std::collections::HashMap;

use crate::context::RequestContext;
use crate::handlers;
use crate::storage::Stores;

/// Application state shared between handlers.
#[derive(Clone)]
pub struct AppState {
    /// `None` when no storage backend is configured.
    pub stores: Option<Stores>,
}

/// Creates the router, mounting both endpoints at the root and under `/api`.
pub fn create_router(state: AppState) -> Router {
    let endpoints = Router::new()
        .route("/blob", any(blob_handler))
        .route("/table", any(table_handler));

    Router::new()
        .merge(endpoints.clone())
        .nest("/api", endpoints)
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

/// Handler for `/blob`.
async fn blob_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response<Body> {
    let ctx = RequestContext::new(method, uri, headers, query);

    match handlers::handle_blob(&ctx, state.stores.as_ref(), body).await {
        Ok(response) => response,
        Err(e) => handlers::error_response(&ctx, e),
    }
}

/// Handler for `/table`.
async fn table_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response<Body> {
    let ctx = RequestContext::new(method, uri, headers, query);

    match handlers::handle_table(&ctx, state.stores.as_ref(), body).await {
        Ok(response) => response,
        Err(e) => handlers::error_response(&ctx, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn router(stores: Option<Stores>) -> Router {
        create_router(AppState { stores })
    }

    async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_routes_mounted_under_api() {
        let app = router(Some(Stores::memory()));

        for uri in ["/blob", "/api/blob", "/table", "/api/table"] {
            let response = app
                .clone()
                .oneshot(Request::get(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK, "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_unknown_path_is_not_found() {
        let response = router(Some(Stores::memory()))
            .oneshot(Request::get("/queue").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unconfigured_guard_runs_before_dispatch() {
        let response = router(None)
            .oneshot(
                Request::builder()
                    .method(Method::PATCH)
                    .uri("/table")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await["error"],
            "Storage connection string not configured"
        );
    }

    #[tokio::test]
    async fn test_method_not_allowed() {
        let response = router(Some(Stores::memory()))
            .oneshot(
                Request::builder()
                    .method(Method::PUT)
                    .uri("/blob?blobName=a.txt")
                    .body(Body::from("x"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()["x-error-code"], "MethodNotAllowed");
        assert_eq!(body_json(response).await["error"], "Method not allowed");
    }
}

//! Request handlers for the blob and table endpoints.

mod blob;
mod table;

pub use blob::*;
pub use table::*;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{debug, error};

use crate::context::RequestContext;
use crate::error::{ApiError, ErrorCode, StoreError};
use crate::storage::Stores;

/// Returns the configured stores or the not-configured error.
pub fn require_stores(stores: Option<&Stores>) -> Result<&Stores, ApiError> {
    stores.ok_or_else(|| ApiError::new(ErrorCode::NotConfigured))
}

/// Creates the blob container, discarding any failure.
pub async fn ensure_container(stores: &Stores) {
    if let Err(e) = stores.blobs.create_container().await {
        debug!(
            "Container {} not created: {}",
            stores.blobs.container(),
            e
        );
    }
}

/// Creates the user table, discarding any failure.
pub async fn ensure_table(stores: &Stores) {
    if let Err(e) = stores.tables.create_table().await {
        debug!("Table {} not created: {}", stores.tables.table(), e);
    }
}

/// Translates a store error, reporting `NotFound` with the endpoint's own code.
pub fn not_found_as(code: ErrorCode) -> impl Fn(StoreError) -> ApiError {
    move |err| match err {
        StoreError::NotFound => ApiError::new(code),
        other => ApiError::from(other),
    }
}

/// Serializes a body as JSON with the given status.
pub fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (status, Json(body)).into_response()
}

/// Renders an error, logging those that end in a 500.
pub fn error_response(ctx: &RequestContext, err: ApiError) -> Response {
    if err.status_code().is_server_error() && err.code != ErrorCode::NotConfigured {
        error!(
            request_id = %ctx.request_id,
            "{} {} failed: {}",
            ctx.method,
            ctx.uri.path(),
            err.detail.as_deref().unwrap_or(&err.message)
        );
    }
    err.into_response()
}

#[derive(Serialize)]
struct MessageBody<'a> {
    message: &'a str,
}

/// Builds a `{"message": ...}` JSON body.
pub fn message_response(status: StatusCode, message: &str) -> Response {
    json_response(status, MessageBody { message })
}

//! `/blob` endpoint: upload, download, list and delete in the fixed container.

use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Response, StatusCode},
};
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use tracing::{info, warn};

use crate::context::RequestContext;
use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::models::{
    is_contained_blob_name, BlobListing, BlobSummary, DeleteResponse, UploadOptions,
    UploadResponse, DEFAULT_CONTENT_TYPE,
};
use crate::storage::Stores;

use super::{ensure_container, json_response, not_found_as, require_stores};

/// Upper bound on the buffer reserved ahead of a download.
const MAX_PREALLOCATION: u64 = 8 * 1024 * 1024;

/// Dispatches a `/blob` request on its method.
pub async fn handle_blob(
    ctx: &RequestContext,
    stores: Option<&Stores>,
    body: Bytes,
) -> ApiResult<Response<Body>> {
    let stores = require_stores(stores)?;
    ensure_container(stores).await;

    match ctx.method {
        Method::GET => match ctx.query_param("blobName") {
            Some(name) => download_blob(stores, checked_blob_name(name)?).await,
            None => list_blobs(stores).await,
        },
        Method::POST => upload_blob(ctx, stores, body).await,
        Method::DELETE => delete_blob(ctx, stores).await,
        _ => Err(ApiError::new(ErrorCode::MethodNotAllowed)),
    }
}

/// Rejects names that would resolve outside the container.
fn checked_blob_name(name: &str) -> ApiResult<&str> {
    if is_contained_blob_name(name) {
        Ok(name)
    } else {
        Err(ApiError::new(ErrorCode::InvalidBlobName))
    }
}

/// GET /blob?blobName=N - Return the blob's bytes.
async fn download_blob(stores: &Stores, name: &str) -> ApiResult<Response<Body>> {
    let download = stores
        .blobs
        .download(name)
        .await
        .map_err(not_found_as(ErrorCode::BlobNotFound))?;

    let properties = download.properties;
    let mut content =
        BytesMut::with_capacity(properties.content_length.min(MAX_PREALLOCATION) as usize);
    let mut chunks = download.body;
    while let Some(chunk) = chunks.next().await {
        content.extend_from_slice(&chunk?);
    }

    let mut content_length = properties.content_length;
    if content_length != content.len() as u64 {
        warn!(
            "Blob {} reported {} bytes but {} were read",
            name,
            content_length,
            content.len()
        );
        content_length = content.len() as u64;
    }

    let content_type = HeaderValue::from_str(&properties.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE));

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, content_length)
        .body(Body::from(content.freeze()))
        .map_err(|e| ApiError::internal(e.to_string()))
}

/// GET /blob - List every blob in the container.
async fn list_blobs(stores: &Stores) -> ApiResult<Response<Body>> {
    let items = stores.blobs.list().await?;
    let blobs: Vec<BlobSummary> = items.into_iter().map(BlobSummary::from).collect();

    Ok(json_response(
        StatusCode::OK,
        BlobListing {
            count: blobs.len(),
            blobs,
        },
    ))
}

/// POST /blob?blobName=N - Upload the request body, overwriting.
async fn upload_blob(
    ctx: &RequestContext,
    stores: &Stores,
    body: Bytes,
) -> ApiResult<Response<Body>> {
    let name = checked_blob_name(ctx.required_query_param("blobName")?)?;
    let content_type = ctx.content_type().unwrap_or(DEFAULT_CONTENT_TYPE);
    let options = UploadOptions::tagged(content_type, ctx.timestamp);

    let size = body.len();
    let receipt = stores.blobs.upload(name, body, options).await?;
    info!("Uploaded blob {} ({} bytes)", name, size);

    Ok(json_response(
        StatusCode::CREATED,
        UploadResponse {
            message: "Blob uploaded successfully".to_string(),
            blob_name: name.to_string(),
            request_id: receipt.request_id,
            etag: receipt.etag,
            last_modified: receipt.last_modified,
            url: receipt.url,
        },
    ))
}

/// DELETE /blob?blobName=N - Delete the blob and its snapshots.
async fn delete_blob(ctx: &RequestContext, stores: &Stores) -> ApiResult<Response<Body>> {
    let name = checked_blob_name(ctx.required_query_param("blobName")?)?;
    let receipt = stores
        .blobs
        .delete(name)
        .await
        .map_err(not_found_as(ErrorCode::BlobNotFound))?;
    info!("Deleted blob {}", name);

    Ok(json_response(
        StatusCode::OK,
        DeleteResponse {
            message: "Blob deleted successfully".to_string(),
            blob_name: name.to_string(),
            request_id: receipt.request_id,
        },
    ))
}

//! `/table` endpoint: user records keyed by department and user id.

use axum::{
    body::Body,
    http::{Method, Response, StatusCode},
};
use bytes::Bytes;
use tracing::info;

use crate::context::RequestContext;
use crate::error::{ApiError, ApiResult, ErrorCode};
use crate::models::{department_or_default, UserListing, UserRequest, UserResponse};
use crate::storage::Stores;

use super::{ensure_table, json_response, message_response, not_found_as, require_stores};

/// Dispatches a `/table` request on its method.
pub async fn handle_table(
    ctx: &RequestContext,
    stores: Option<&Stores>,
    body: Bytes,
) -> ApiResult<Response<Body>> {
    let stores = require_stores(stores)?;
    ensure_table(stores).await;

    match ctx.method {
        Method::GET => match ctx.query_param("userId") {
            Some(user_id) => get_user(ctx, stores, user_id).await,
            None => list_users(ctx, stores).await,
        },
        Method::POST => create_user(stores, &body).await,
        Method::PUT => upsert_user(stores, &body).await,
        Method::DELETE => delete_user(ctx, stores).await,
        _ => Err(ApiError::new(ErrorCode::MethodNotAllowed)),
    }
}

fn department(ctx: &RequestContext) -> String {
    department_or_default(ctx.query_param("department").map(str::to_string))
}

fn parse_user_request(body: &[u8]) -> ApiResult<UserRequest> {
    serde_json::from_slice(body)
        .map_err(|e| ApiError::new(ErrorCode::InvalidBody).with_detail(e.to_string()))
}

/// GET /table?userId=U[&department=D] - Fetch one record.
async fn get_user(
    ctx: &RequestContext,
    stores: &Stores,
    user_id: &str,
) -> ApiResult<Response<Body>> {
    let user = stores
        .tables
        .get_entity(&department(ctx), user_id)
        .await
        .map_err(not_found_as(ErrorCode::UserNotFound))?;

    Ok(json_response(StatusCode::OK, user))
}

/// GET /table[?department=D] - List every record in the partition.
async fn list_users(ctx: &RequestContext, stores: &Stores) -> ApiResult<Response<Body>> {
    let users = stores.tables.query_partition(&department(ctx)).await?;

    Ok(json_response(
        StatusCode::OK,
        UserListing {
            count: users.len(),
            users,
        },
    ))
}

/// POST /table - Create a record; fails if the key is taken.
async fn create_user(stores: &Stores, body: &[u8]) -> ApiResult<Response<Body>> {
    let user = parse_user_request(body)?.into_new_user()?;
    let created = stores.tables.insert_entity(&user).await?;
    info!("Created user {}/{}", created.partition_key, created.row_key);

    Ok(json_response(
        StatusCode::CREATED,
        UserResponse {
            message: "User created successfully".to_string(),
            user: created,
        },
    ))
}

/// PUT /table - Insert or wholly replace a record.
async fn upsert_user(stores: &Stores, body: &[u8]) -> ApiResult<Response<Body>> {
    let user = parse_user_request(body)?.into_replacement()?;
    let stored = stores.tables.upsert_entity(&user).await?;
    info!("Upserted user {}/{}", stored.partition_key, stored.row_key);

    Ok(json_response(
        StatusCode::OK,
        UserResponse {
            message: "User updated successfully".to_string(),
            user: stored,
        },
    ))
}

/// DELETE /table?userId=U[&department=D] - Delete one record.
async fn delete_user(ctx: &RequestContext, stores: &Stores) -> ApiResult<Response<Body>> {
    let user_id = ctx.required_query_param("userId")?;
    let department = department(ctx);
    stores
        .tables
        .delete_entity(&department, user_id)
        .await
        .map_err(not_found_as(ErrorCode::UserNotFound))?;
    info!("Deleted user {}/{}", department, user_id);

    Ok(message_response(StatusCode::OK, "User deleted successfully"))
}

//! Request context extraction and handling.

use axum::http::{header::HeaderMap, Method, Uri};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, ErrorCode};

/// Extracted request context containing all relevant information.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique request ID.
    pub request_id: String,
    /// HTTP method.
    pub method: Method,
    /// Request URI.
    pub uri: Uri,
    /// Query parameters.
    pub query_params: HashMap<String, String>,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request timestamp.
    pub timestamp: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context from request parts.
    pub fn new(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        query_params: HashMap<String, String>,
    ) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            method,
            uri,
            query_params,
            headers,
            timestamp: Utc::now(),
        }
    }

    /// Returns the value of a query parameter, treating empty values as absent.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params
            .get(name)
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Returns the value of a query parameter or a 400 naming it.
    pub fn required_query_param(&self, name: &str) -> ApiResult<&str> {
        self.query_param(name).ok_or_else(|| {
            ApiError::with_message(
                ErrorCode::MissingRequiredQueryParameter,
                format!("{} query parameter is required", name),
            )
        })
    }

    /// Returns the value of a header.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the Content-Type header value.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type").filter(|s| !s.is_empty())
    }
}

//! Store error taxonomy and HTTP error response formatting.

use axum::{
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failure classes reported by a blob or table store.
///
/// Every backend maps its native failures onto these variants, so the HTTP
/// layer can translate them with a single exhaustive `match`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The addressed blob, entity, container or table does not exist.
    #[error("The specified resource does not exist.")]
    NotFound,

    /// A create operation collided with an existing resource.
    #[error("The specified resource already exists.")]
    AlreadyExists,

    /// The store rejected the request as malformed.
    #[error("invalid request: {0}")]
    BadInput(String),

    /// The store could not be reached or reported a transient failure.
    #[error("storage service unavailable: {0}")]
    Unavailable(String),

    /// Any other failure, carrying the store's own description.
    #[error("{0}")]
    Unknown(String),
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised while turning process configuration into store clients.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("connection string segment `{0}` is not of the form Key=Value")]
    MalformedSegment(String),

    #[error("connection string is missing `{0}`")]
    MissingSetting(&'static str),

    #[error("AccountKey is not valid base64")]
    InvalidAccountKey,

    #[error("invalid endpoint `{0}`: {1}")]
    InvalidEndpoint(String, String),
}

/// Error codes surfaced by the HTTP endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    NotConfigured,
    BlobNotFound,
    UserNotFound,
    ResourceNotFound,
    MissingRequiredQueryParameter,
    MissingRequiredField,
    InvalidBody,
    InvalidBlobName,
    MethodNotAllowed,
    InternalError,
}

impl ErrorCode {
    /// Returns the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotConfigured => "NotConfigured",
            ErrorCode::BlobNotFound => "BlobNotFound",
            ErrorCode::UserNotFound => "UserNotFound",
            ErrorCode::ResourceNotFound => "ResourceNotFound",
            ErrorCode::MissingRequiredQueryParameter => "MissingRequiredQueryParameter",
            ErrorCode::MissingRequiredField => "MissingRequiredField",
            ErrorCode::InvalidBody => "InvalidBody",
            ErrorCode::InvalidBlobName => "InvalidBlobName",
            ErrorCode::MethodNotAllowed => "MethodNotAllowed",
            ErrorCode::InternalError => "InternalError",
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::MissingRequiredQueryParameter
            | ErrorCode::MissingRequiredField
            | ErrorCode::InvalidBody
            | ErrorCode::InvalidBlobName => StatusCode::BAD_REQUEST,

            ErrorCode::BlobNotFound | ErrorCode::UserNotFound | ErrorCode::ResourceNotFound => {
                StatusCode::NOT_FOUND
            }

            ErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,

            ErrorCode::NotConfigured | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::NotConfigured => "Storage connection string not configured",
            ErrorCode::BlobNotFound => "Blob not found",
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::ResourceNotFound => "Resource not found",
            ErrorCode::MissingRequiredQueryParameter => "A required query parameter was not specified",
            ErrorCode::MissingRequiredField => "A required field was not specified",
            ErrorCode::InvalidBody => "Request body is not valid JSON",
            ErrorCode::InvalidBlobName => "blobName must not contain '.' or '..' path segments",
            ErrorCode::MethodNotAllowed => "Method not allowed",
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

/// HTTP-facing error with code, message and optional detail.
#[derive(Debug, Error)]
#[error("{code:?}: {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    pub detail: Option<String>,
}

impl ApiError {
    /// Creates a new error with the given code and default message.
    pub fn new(code: ErrorCode) -> Self {
        Self {
            message: code.default_message().to_string(),
            code,
            detail: None,
        }
    }

    /// Creates a new error with a custom message.
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            detail: None,
        }
    }

    /// Creates a 500 error carrying the underlying failure as detail.
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError).with_detail(detail)
    }

    /// Attaches a detail message.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::new(ErrorCode::ResourceNotFound),
            // Everything the store itself rejects, key collisions included,
            // surfaces as a plain 500.
            StoreError::AlreadyExists
            | StoreError::BadInput(_)
            | StoreError::Unavailable(_)
            | StoreError::Unknown(_) => ApiError::internal(err.to_string()),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'a str>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.message,
            message: self.detail.as_deref(),
        };

        let mut response = (self.status_code(), Json(body)).into_response();
        response.headers_mut().insert(
            "x-error-code",
            HeaderValue::from_static(self.code.as_str()),
        );
        response
    }
}

/// Result type alias for endpoint handlers.
pub type ApiResult<T> = Result<T, ApiError>;

//! Azure Storage backends built on the Azure SDK for Rust.

mod blob;
mod connection;
mod table;

pub use blob::*;
pub use connection::*;
pub use table::*;

use axum::http::StatusCode;
use azure_core::error::ErrorKind;
use azure_storage::{CloudLocation, StorageCredentials};
use url::Url;

use crate::error::StoreError;

/// Addresses one service endpoint of the account named by `connection`.
fn cloud_location(connection: &ConnectionString, endpoint: &Url) -> CloudLocation {
    CloudLocation::Custom {
        account: connection.account_name.clone(),
        uri: endpoint.as_str().trim_end_matches('/').to_string(),
    }
}

/// Shared-key credentials for the account named by `connection`.
fn credentials(connection: &ConnectionString) -> StorageCredentials {
    StorageCredentials::access_key(
        connection.account_name.clone(),
        connection.account_key().to_string(),
    )
}

/// Maps a failed service response onto the store error taxonomy.
pub(crate) fn classify_status(status: StatusCode, code: Option<&str>, message: String) -> StoreError {
    let code = code.unwrap_or_default();

    match status {
        StatusCode::NOT_FOUND => StoreError::NotFound,
        StatusCode::CONFLICT if code.ends_with("AlreadyExists") => StoreError::AlreadyExists,
        StatusCode::BAD_REQUEST => StoreError::BadInput(message),
        StatusCode::REQUEST_TIMEOUT
        | StatusCode::TOO_MANY_REQUESTS
        | StatusCode::INTERNAL_SERVER_ERROR
        | StatusCode::BAD_GATEWAY
        | StatusCode::SERVICE_UNAVAILABLE
        | StatusCode::GATEWAY_TIMEOUT => StoreError::Unavailable(message),
        _ => StoreError::Unknown(format!("HTTP {}: {}", status.as_u16(), message)),
    }
}

/// Maps an SDK error onto the store error taxonomy.
pub(crate) fn store_error(err: azure_core::Error) -> StoreError {
    match err.kind() {
        ErrorKind::HttpResponse { status, error_code } => {
            let status = StatusCode::from_u16(u16::from(*status))
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            classify_status(status, error_code.as_deref(), err.to_string())
        }
        ErrorKind::Io => StoreError::Unavailable(err.to_string()),
        _ => StoreError::Unknown(err.to_string()),
    }
}

//! Blob data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Content type applied when an upload does not declare one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Marker recorded in the `uploadedBy` metadata of every upload.
pub const UPLOADED_BY: &str = "storage-functions";

/// Store-reported blob properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobProperties {
    pub content_type: String,
    pub content_length: u64,
    pub etag: String,
    pub last_modified: DateTime<Utc>,
}

impl BlobProperties {
    /// Creates properties for freshly written content.
    pub fn new(content_type: impl Into<String>, content_length: u64) -> Self {
        Self {
            content_type: content_type.into(),
            content_length,
            etag: new_etag(),
            last_modified: Utc::now(),
        }
    }
}

/// A blob as returned by a container listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobItem {
    pub name: String,
    pub properties: BlobProperties,
}

/// Options for a blob upload.
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Content type stored with the blob.
    pub content_type: String,
    /// User-defined metadata.
    pub metadata: HashMap<String, String>,
}

impl UploadOptions {
    /// Builds upload options tagged with the upload time and uploader marker.
    pub fn tagged(content_type: impl Into<String>, uploaded_at: DateTime<Utc>) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert("uploadedAt".to_string(), uploaded_at.to_rfc3339());
        metadata.insert("uploadedBy".to_string(), UPLOADED_BY.to_string());
        Self {
            content_type: content_type.into(),
            metadata,
        }
    }
}

/// Store acknowledgement of an upload.
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    pub request_id: Option<String>,
    pub etag: String,
    pub last_modified: DateTime<Utc>,
    pub url: String,
}

/// Store acknowledgement of a delete.
#[derive(Debug, Clone)]
pub struct DeleteReceipt {
    pub request_id: Option<String>,
}

/// Entry in the JSON listing returned by `GET /blob`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobSummary {
    pub name: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    pub content_type: String,
}

impl From<BlobItem> for BlobSummary {
    fn from(item: BlobItem) -> Self {
        Self {
            name: item.name,
            size: item.properties.content_length,
            last_modified: item.properties.last_modified,
            content_type: item.properties.content_type,
        }
    }
}

/// Body of `GET /blob` without a blob name.
#[derive(Debug, Serialize, Deserialize)]
pub struct BlobListing {
    pub blobs: Vec<BlobSummary>,
    pub count: usize,
}

/// Body of a successful `POST /blob`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: String,
    pub blob_name: String,
    pub request_id: Option<String>,
    pub etag: String,
    pub last_modified: DateTime<Utc>,
    pub url: String,
}

/// Body of a successful `DELETE /blob`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResponse {
    pub message: String,
    pub blob_name: String,
    pub request_id: Option<String>,
}

/// Returns whether `name` stays inside the container once the service
/// resolves its path, i.e. no `/`-separated segment is `.` or `..`.
pub fn is_contained_blob_name(name: &str) -> bool {
    !name
        .split(['/', '\\'])
        .any(|segment| segment == "." || segment == "..")
}

/// Generates an opaque ETag in the storage service's style.
pub fn new_etag() -> String {
    format!("\"0x{}\"", uuid::Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_segments_leave_the_container() {
        for name in ["..", ".", "../private/secret.txt", "a/../../x", "a/./b", "a\\..\\b"] {
            assert!(!is_contained_blob_name(name), "{}", name);
        }
        for name in ["hello.txt", "reports/q1.csv", "..hidden", "a..b/c", ".profile"] {
            assert!(is_contained_blob_name(name), "{}", name);
        }
    }

    #[test]
    fn test_tagged_metadata_names_keep_their_case() {
        let options = UploadOptions::tagged("text/plain", Utc::now());
        let mut names: Vec<&str> = options.metadata.keys().map(String::as_str).collect();
        names.sort_unstable();
        assert_eq!(names, ["uploadedAt", "uploadedBy"]);
        assert_eq!(options.metadata["uploadedBy"], UPLOADED_BY);
    }
}

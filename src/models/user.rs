//! User record models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult, ErrorCode};

/// Partition key used when a request omits `department`.
pub const DEFAULT_DEPARTMENT: &str = "default";

/// A user record keyed by (department, user id).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserEntity {
    /// Department.
    pub partition_key: String,
    /// User id.
    pub row_key: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub age: i32,
    /// Store-assigned modification time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Store-assigned entity tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
}

impl UserEntity {
    /// Creates a record with no store-assigned fields.
    pub fn new(
        department: impl Into<String>,
        user_id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        age: i32,
    ) -> Self {
        Self {
            partition_key: department.into(),
            row_key: user_id.into(),
            name: name.into(),
            email: email.into(),
            age,
            timestamp: None,
            etag: None,
        }
    }

    /// Returns true when the user-supplied fields match, ignoring store metadata.
    pub fn same_fields(&self, other: &UserEntity) -> bool {
        self.partition_key == other.partition_key
            && self.row_key == other.row_key
            && self.name == other.name
            && self.email == other.email
            && self.age == other.age
    }
}

/// JSON body accepted by `POST /table` and `PUT /table`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    pub user_id: Option<String>,
    pub department: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub age: Option<i32>,
}

impl UserRequest {
    /// Builds the record for a create, requiring `userId`, `name` and `email`.
    pub fn into_new_user(self) -> ApiResult<UserEntity> {
        match (present(self.user_id), present(self.name), present(self.email)) {
            (Some(user_id), Some(name), Some(email)) => Ok(UserEntity::new(
                department_or_default(self.department),
                user_id,
                name,
                email,
                self.age.unwrap_or(0),
            )),
            _ => Err(ApiError::with_message(
                ErrorCode::MissingRequiredField,
                "userId, name, and email are required",
            )),
        }
    }

    /// Builds the full replacement record for an upsert, requiring `userId`.
    pub fn into_replacement(self) -> ApiResult<UserEntity> {
        let user_id = present(self.user_id).ok_or_else(|| {
            ApiError::with_message(ErrorCode::MissingRequiredField, "userId is required")
        })?;

        Ok(UserEntity::new(
            department_or_default(self.department),
            user_id,
            self.name.unwrap_or_default(),
            self.email.unwrap_or_default(),
            self.age.unwrap_or(0),
        ))
    }
}

/// Returns the department or the default partition.
pub fn department_or_default(department: Option<String>) -> String {
    present(department).unwrap_or_else(|| DEFAULT_DEPARTMENT.to_string())
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Body of `GET /table` without a user id.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserListing {
    pub users: Vec<UserEntity>,
    pub count: usize,
}

/// Body of a successful `POST` or `PUT /table`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub message: String,
    pub user: UserEntity,
}

//! Data models for blobs and user records.

mod blob;
mod user;

pub use blob::*;
pub use user::*;

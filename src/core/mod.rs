// src/core/mod.rs
//! HTTP plumbing, session handling and list queries shared by every service

pub mod api_client;
pub mod query;
pub mod session;

#[cfg(test)]
pub mod testing;

pub use api_client::{ApiClient, FileUpload, Transport};
pub use query::{ListQuery, RowFilter, SortOrder};
pub use session::{Session, SessionStore, SessionUser};

//! Shared to-do domain primitives.
//!
//! This crate owns the record contracts, request validation, the error
//! taxonomy, and the attachment naming convention. It intentionally excludes
//! AWS SDK and Lambda runtime concerns.

pub mod contract;
pub mod error;
pub mod storage_keys;

pub use contract::{CreateTodoRequest, TodoItem, UpdateTodoRequest, UploadUrlResponse};
pub use error::{Result, TodoError};

//! AWS-oriented adapters and handlers for the to-do API.
//!
//! This crate owns runtime integration details (the Lambda handler, the
//! DynamoDB record store, and the S3 attachment store) and the record service
//! that composes them. Contracts and validation live in `todo_core`.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod service;

pub use service::TodoService;

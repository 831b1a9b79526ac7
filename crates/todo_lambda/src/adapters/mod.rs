use std::future::Future;

pub mod attachments;
pub mod dynamodb;
pub mod todo_store;

/// Runs an SDK future to completion from a synchronous adapter method.
/// Requires the multi-threaded Tokio runtime the Lambda binary starts.
pub(crate) fn block_on<F: Future>(future: F) -> F::Output {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

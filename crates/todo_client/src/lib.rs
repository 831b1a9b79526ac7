//! Client binding for the to-do API: a typed HTTP client and the list-view
//! state the terminal front end renders.

pub mod api;
pub mod view;

pub use api::{ApiError, TodosApi, TodosBackend};
pub use view::TodoListView;

use std::time::Duration;

use todo_core::CreateTodoRequest;
use todo_lambda::adapters::attachments::StaticAttachmentStore;
use todo_lambda::adapters::todo_store::InMemoryTodoStore;
use todo_lambda::TodoService;

pub const TEST_BUCKET: &str = "todos-attachments-test";

pub type TestService = TodoService<InMemoryTodoStore, StaticAttachmentStore>;

/// Service over an empty in-memory table and deterministic attachment URLs.
pub fn build_service() -> TestService {
    TodoService::new(
        InMemoryTodoStore::new(),
        StaticAttachmentStore::new(TEST_BUCKET, Duration::from_secs(300)),
    )
}

pub fn create_request(name: &str, due_date: &str) -> CreateTodoRequest {
    CreateTodoRequest {
        name: name.to_string(),
        due_date: due_date.to_string(),
    }
}

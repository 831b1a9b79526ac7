use chrono::Utc;
use todo_core::contract::{
    format_timestamp, normalize_create_request, normalize_keyword, normalize_update_request,
};
use todo_core::{CreateTodoRequest, Result, TodoError, TodoItem, UpdateTodoRequest};
use tracing::info;
use uuid::Uuid;

use crate::adapters::attachments::AttachmentStore;
use crate::adapters::todo_store::TodoStore;

/// Record service: one method per use case, each a single store call.
///
/// Constructed once per process and shared by reference with every request.
/// Authorization is carried by the composite key: every store call is scoped
/// to the caller's owner id, so another owner's record reads as `NotFound`.
#[derive(Debug)]
pub struct TodoService<S, A> {
    store: S,
    attachments: A,
}

impl<S: TodoStore, A: AttachmentStore> TodoService<S, A> {
    pub fn new(store: S, attachments: A) -> Self {
        Self { store, attachments }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn create(&self, request: CreateTodoRequest, owner_id: &str) -> Result<TodoItem> {
        let owner_id = require_owner(owner_id)?;
        let request = normalize_create_request(request)?;

        let todo_id = Uuid::new_v4().to_string();
        let item = TodoItem {
            user_id: owner_id.to_string(),
            attachment_url: Some(self.attachments.attachment_url(&todo_id)),
            todo_id,
            created_at: format_timestamp(Utc::now()),
            name: request.name,
            due_date: request.due_date,
            done: false,
        };

        let created = self.store.create(item)?;
        info!(
            component = "todo_service",
            event = "todo_created",
            user_id = %created.user_id,
            todo_id = %created.todo_id
        );
        Ok(created)
    }

    pub fn list_for_owner(&self, owner_id: &str) -> Result<Vec<TodoItem>> {
        let owner_id = require_owner(owner_id)?;
        let items = self.store.list_by_owner(owner_id)?;
        info!(
            component = "todo_service",
            event = "todos_listed",
            user_id = %owner_id,
            count = items.len()
        );
        Ok(items)
    }

    /// Exact-name lookup: a record named "learning plan" does not match
    /// the keyword "learning".
    pub fn search_for_owner(&self, owner_id: &str, keyword: &str) -> Result<Vec<TodoItem>> {
        let owner_id = require_owner(owner_id)?;
        let keyword = normalize_keyword(keyword)?;
        let items = self.store.find_by_owner_and_name(owner_id, &keyword)?;
        info!(
            component = "todo_service",
            event = "todos_searched",
            user_id = %owner_id,
            count = items.len()
        );
        Ok(items)
    }

    pub fn get_for_owner(&self, owner_id: &str, todo_id: &str) -> Result<TodoItem> {
        let owner_id = require_owner(owner_id)?;
        self.store.get(owner_id, todo_id)
    }

    pub fn update(
        &self,
        owner_id: &str,
        todo_id: &str,
        request: UpdateTodoRequest,
    ) -> Result<TodoItem> {
        let owner_id = require_owner(owner_id)?;
        let request = normalize_update_request(request)?;
        let updated = self.store.update(todo_id, owner_id, &request)?;
        info!(
            component = "todo_service",
            event = "todo_updated",
            user_id = %owner_id,
            todo_id = %todo_id,
            done = updated.done
        );
        Ok(updated)
    }

    pub fn delete(&self, todo_id: &str, owner_id: &str) -> Result<()> {
        let owner_id = require_owner(owner_id)?;
        self.store.delete(todo_id, owner_id)?;
        info!(
            component = "todo_service",
            event = "todo_deleted",
            user_id = %owner_id,
            todo_id = %todo_id
        );
        Ok(())
    }

    /// Mints an upload URL and writes the record's `attachment_url` from the
    /// same naming convention used at creation.
    pub fn create_attachment_upload_target(&self, todo_id: &str, owner_id: &str) -> Result<String> {
        let owner_id = require_owner(owner_id)?;
        let attachment_url = self.attachments.attachment_url(todo_id);
        self.store
            .update_attachment_url(todo_id, owner_id, &attachment_url)?;
        let upload_url = self.attachments.upload_url(todo_id)?;
        info!(
            component = "todo_service",
            event = "upload_url_created",
            user_id = %owner_id,
            todo_id = %todo_id
        );
        Ok(upload_url)
    }
}

/// Owner ids are opaque: only the empty id is rejected.
fn require_owner(owner_id: &str) -> Result<&str> {
    if owner_id.is_empty() {
        return Err(TodoError::validation("owner identity cannot be empty"));
    }
    Ok(owner_id)
}

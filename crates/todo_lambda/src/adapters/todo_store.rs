use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use todo_core::{Result, TodoError, TodoItem, UpdateTodoRequest};

/// Single-table record store keyed by `(user_id, todo_id)` with a per-user
/// access path for listing.
pub trait TodoStore {
    /// All records owned by `user_id`, in store order.
    fn list_by_owner(&self, user_id: &str) -> Result<Vec<TodoItem>>;

    /// Records owned by `user_id` whose name equals `name` exactly.
    fn find_by_owner_and_name(&self, user_id: &str, name: &str) -> Result<Vec<TodoItem>> {
        Ok(self
            .list_by_owner(user_id)?
            .into_iter()
            .filter(|item| item.name == name)
            .collect())
    }

    fn get(&self, user_id: &str, todo_id: &str) -> Result<TodoItem>;

    /// Unconditional put by primary key.
    fn create(&self, item: TodoItem) -> Result<TodoItem>;

    /// Overwrites `name`, `due_date` and `done` of an existing record and
    /// returns the persisted state. Fails with `NotFound` for a missing key.
    fn update(&self, todo_id: &str, user_id: &str, update: &UpdateTodoRequest)
        -> Result<TodoItem>;

    /// Overwrites only `attachment_url`. Fails with `NotFound` for a missing key.
    fn update_attachment_url(&self, todo_id: &str, user_id: &str, url: &str) -> Result<()>;

    /// Unconditional delete; absent keys are not an error.
    fn delete(&self, todo_id: &str, user_id: &str) -> Result<()>;
}

type TodoKey = (String, String);

#[derive(Debug, Default)]
pub struct InMemoryTodoStore {
    items: Mutex<BTreeMap<TodoKey, TodoItem>>,
}

impl InMemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.items()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.items()?.is_empty())
    }

    fn items(&self) -> Result<MutexGuard<'_, BTreeMap<TodoKey, TodoItem>>> {
        self.items
            .lock()
            .map_err(|_| TodoError::store("in-memory store lock poisoned"))
    }
}

fn key(user_id: &str, todo_id: &str) -> TodoKey {
    (user_id.to_string(), todo_id.to_string())
}

impl TodoStore for InMemoryTodoStore {
    fn list_by_owner(&self, user_id: &str) -> Result<Vec<TodoItem>> {
        Ok(self
            .items()?
            .values()
            .filter(|item| item.user_id == user_id)
            .cloned()
            .collect())
    }

    fn get(&self, user_id: &str, todo_id: &str) -> Result<TodoItem> {
        self.items()?
            .get(&key(user_id, todo_id))
            .cloned()
            .ok_or_else(|| TodoError::not_found(user_id, todo_id))
    }

    fn create(&self, item: TodoItem) -> Result<TodoItem> {
        self.items()?
            .insert(key(&item.user_id, &item.todo_id), item.clone());
        Ok(item)
    }

    fn update(
        &self,
        todo_id: &str,
        user_id: &str,
        update: &UpdateTodoRequest,
    ) -> Result<TodoItem> {
        let mut items = self.items()?;
        let item = items
            .get_mut(&key(user_id, todo_id))
            .ok_or_else(|| TodoError::not_found(user_id, todo_id))?;
        item.name = update.name.clone();
        item.due_date = update.due_date.clone();
        item.done = update.done;
        Ok(item.clone())
    }

    fn update_attachment_url(&self, todo_id: &str, user_id: &str, url: &str) -> Result<()> {
        let mut items = self.items()?;
        let item = items
            .get_mut(&key(user_id, todo_id))
            .ok_or_else(|| TodoError::not_found(user_id, todo_id))?;
        item.attachment_url = Some(url.to_string());
        Ok(())
    }

    fn delete(&self, todo_id: &str, user_id: &str) -> Result<()> {
        self.items()?.remove(&key(user_id, todo_id));
        Ok(())
    }
}

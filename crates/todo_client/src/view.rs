use chrono::{Days, Local, NaiveDate};
use todo_core::contract::DUE_DATE_FORMAT;
use todo_core::{CreateTodoRequest, TodoItem, UpdateTodoRequest};

use crate::api::{ApiError, TodosBackend};

pub const DEFAULT_DUE_IN_DAYS: u64 = 7;

/// On-screen state of the to-do list. Each action calls the backend and folds
/// the result into `todos`, or records a cause-specific `last_error`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoListView {
    pub todos: Vec<TodoItem>,
    pub loading: bool,
    pub last_error: Option<String>,
}

impl TodoListView {
    pub fn new() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    pub fn refresh(&mut self, backend: &impl TodosBackend) -> bool {
        let result = backend.get_todos();
        self.loading = false;
        self.apply("Fetching todos", result, |view, todos| view.todos = todos)
    }

    /// A blank keyword shows the whole list instead of searching.
    pub fn search(&mut self, backend: &impl TodosBackend, keyword: &str) -> bool {
        if keyword.trim().is_empty() {
            return self.refresh(backend);
        }
        let result = backend.search_todos(keyword);
        self.loading = false;
        self.apply("Search", result, |view, todos| view.todos = todos)
    }

    pub fn create(
        &mut self,
        backend: &impl TodosBackend,
        name: &str,
        due_date: Option<&str>,
    ) -> bool {
        let request = CreateTodoRequest {
            name: name.to_string(),
            due_date: due_date
                .map(str::to_string)
                .unwrap_or_else(|| default_due_date(Local::now().date_naive())),
        };
        let result = backend.create_todo(&request);
        self.apply("Todo creation", result, |view, item| view.todos.push(item))
    }

    /// Flips `done` on a listed todo, keeping its name and due date.
    pub fn toggle(&mut self, backend: &impl TodosBackend, todo_id: &str) -> bool {
        let Some(current) = self.todos.iter().find(|todo| todo.todo_id == todo_id) else {
            self.last_error = Some(format!("Todo update failed: '{todo_id}' is not in the list"));
            return false;
        };
        let request = UpdateTodoRequest {
            name: current.name.clone(),
            due_date: current.due_date.clone(),
            done: !current.done,
        };
        let result = backend.patch_todo(todo_id, &request);
        self.apply("Todo update", result, |view, updated| {
            if let Some(slot) = view.todos.iter_mut().find(|todo| todo.todo_id == updated.todo_id) {
                *slot = updated;
            }
        })
    }

    pub fn remove(&mut self, backend: &impl TodosBackend, todo_id: &str) -> bool {
        let result = backend.delete_todo(todo_id);
        let todo_id = todo_id.to_string();
        self.apply("Todo deletion", result, move |view, ()| {
            view.todos.retain(|todo| todo.todo_id != todo_id)
        })
    }

    pub fn attach(&mut self, backend: &impl TodosBackend, todo_id: &str, body: Vec<u8>) -> bool {
        let result = backend
            .get_upload_url(todo_id)
            .and_then(|upload_url| backend.upload_file(&upload_url, body));
        self.apply("Attachment upload", result, |_, ()| {})
    }

    fn apply<T>(
        &mut self,
        action: &str,
        result: Result<T, ApiError>,
        on_success: impl FnOnce(&mut Self, T),
    ) -> bool {
        match result {
            Ok(value) => {
                self.last_error = None;
                on_success(self, value);
                true
            }
            Err(error) => {
                self.last_error = Some(format!("{action} failed: {}", describe_error(&error)));
                false
            }
        }
    }

    pub fn render(&self) -> String {
        if self.loading {
            return "Loading TODOs".to_string();
        }
        if self.todos.is_empty() {
            return "No todos yet".to_string();
        }

        let mut lines = Vec::with_capacity(self.todos.len() + 1);
        lines.push(format!("{:<4} {:<36} {:<10} {}", "DONE", "ID", "DUE", "NAME"));
        for todo in &self.todos {
            let marker = if todo.done { "[x]" } else { "[ ]" };
            let attachment = if todo.attachment_url.is_some() { " [attachment]" } else { "" };
            lines.push(format!(
                "{marker:<4} {:<36} {:<10} {}{attachment}",
                todo.todo_id, todo.due_date, todo.name
            ));
        }
        lines.join("\n")
    }
}

/// Human-readable reason for a failed call, chosen by cause.
pub fn describe_error(error: &ApiError) -> String {
    match error {
        ApiError::Http { code, message, .. } if code == "validation_error" => {
            format!("the request was rejected ({message})")
        }
        ApiError::Http { code, .. } if code == "not_found" => {
            "the todo no longer exists".to_string()
        }
        ApiError::Http { status: 401 | 403, .. } => {
            "your session is not authorized; log in again".to_string()
        }
        ApiError::Http { status, .. } if *status >= 500 => {
            "the todo service is temporarily unavailable; try again".to_string()
        }
        ApiError::Http { status, message, .. } => format!("HTTP {status}: {message}"),
        ApiError::Transport(message) => format!("could not reach the todo service ({message})"),
        ApiError::Decode(message) => {
            format!("unexpected response from the todo service ({message})")
        }
    }
}

pub fn default_due_date(today: NaiveDate) -> String {
    today
        .checked_add_days(Days::new(DEFAULT_DUE_IN_DAYS))
        .unwrap_or(today)
        .format(DUE_DATE_FORMAT)
        .to_string()
}

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Method;
use serde::de::DeserializeOwned;
use thiserror::Error;
use todo_core::contract::{ErrorBody, ItemResponse, ItemsResponse};
use todo_core::{CreateTodoRequest, TodoItem, UpdateTodoRequest, UploadUrlResponse};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("HTTP {status} ({code}): {message}")]
    Http {
        status: u16,
        code: String,
        message: String,
    },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Operations the list view drives. `TodosApi` is the HTTP implementation.
pub trait TodosBackend {
    fn get_todos(&self) -> Result<Vec<TodoItem>, ApiError>;
    fn search_todos(&self, keyword: &str) -> Result<Vec<TodoItem>, ApiError>;
    fn create_todo(&self, request: &CreateTodoRequest) -> Result<TodoItem, ApiError>;
    fn patch_todo(&self, todo_id: &str, request: &UpdateTodoRequest)
        -> Result<TodoItem, ApiError>;
    fn delete_todo(&self, todo_id: &str) -> Result<(), ApiError>;
    fn get_upload_url(&self, todo_id: &str) -> Result<String, ApiError>;
    fn upload_file(&self, upload_url: &str, body: Vec<u8>) -> Result<(), ApiError>;
}

#[derive(Debug, Clone)]
pub struct TodosApi {
    client: Client,
    endpoint: String,
    id_token: String,
}

impl TodosApi {
    pub fn new(endpoint: impl Into<String>, id_token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            id_token: id_token.into(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        debug!(method = %method, path = %path, "todo api request");
        self.client
            .request(method, format!("{}{path}", self.endpoint))
            .bearer_auth(&self.id_token)
    }
}

fn send(builder: RequestBuilder) -> Result<reqwest::blocking::Response, ApiError> {
    let response = builder
        .send()
        .map_err(|error| ApiError::Transport(error.to_string()))?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let text = response.text().unwrap_or_default();
    Err(error_from_response(status.as_u16(), &text))
}

fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ApiError> {
    send(builder)?
        .json::<T>()
        .map_err(|error| ApiError::Decode(error.to_string()))
}

/// Builds an `ApiError` from a failed response, keeping the server's error
/// code when the body carries one.
pub fn error_from_response(status: u16, body: &str) -> ApiError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => ApiError::Http {
            status,
            code: parsed.error,
            message: parsed.message,
        },
        Err(_) => ApiError::Http {
            status,
            code: "http_error".to_string(),
            message: body.trim().to_string(),
        },
    }
}

impl TodosBackend for TodosApi {
    fn get_todos(&self) -> Result<Vec<TodoItem>, ApiError> {
        send_json::<ItemsResponse>(self.request(Method::GET, "/todos")).map(|body| body.items)
    }

    fn search_todos(&self, keyword: &str) -> Result<Vec<TodoItem>, ApiError> {
        send_json::<ItemsResponse>(
            self.request(Method::GET, "/todos/search")
                .query(&[("keyword", keyword)]),
        )
        .map(|body| body.items)
    }

    fn create_todo(&self, request: &CreateTodoRequest) -> Result<TodoItem, ApiError> {
        send_json::<ItemResponse>(self.request(Method::POST, "/todos").json(request))
            .map(|body| body.item)
    }

    fn patch_todo(
        &self,
        todo_id: &str,
        request: &UpdateTodoRequest,
    ) -> Result<TodoItem, ApiError> {
        send_json::<ItemResponse>(
            self.request(Method::PATCH, &format!("/todos/{todo_id}"))
                .json(request),
        )
        .map(|body| body.item)
    }

    fn delete_todo(&self, todo_id: &str) -> Result<(), ApiError> {
        send(self.request(Method::DELETE, &format!("/todos/{todo_id}"))).map(|_| ())
    }

    fn get_upload_url(&self, todo_id: &str) -> Result<String, ApiError> {
        send_json::<UploadUrlResponse>(
            self.request(Method::POST, &format!("/todos/{todo_id}/attachment")),
        )
        .map(|body| body.upload_url)
    }

    fn upload_file(&self, upload_url: &str, body: Vec<u8>) -> Result<(), ApiError> {
        send(self.client.put(upload_url).body(body)).map(|_| ())
    }
}

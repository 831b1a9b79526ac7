use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use todo_core::contract::{stable_contract_json, ErrorBody, ItemResponse, ItemsResponse};
use todo_core::{CreateTodoRequest, TodoError, UpdateTodoRequest, UploadUrlResponse};
use tracing::{error, info, warn};

use crate::adapters::attachments::AttachmentStore;
use crate::adapters::todo_store::TodoStore;
use crate::service::TodoService;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    List,
    Search,
    Create,
    Get(String),
    Update(String),
    Delete(String),
    UploadUrl(String),
}

pub fn resolve_route(method: &str, path: &str) -> Option<Route> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let method = method.to_ascii_uppercase();

    match (method.as_str(), segments.as_slice()) {
        ("GET", ["todos"]) => Some(Route::List),
        ("POST", ["todos"]) => Some(Route::Create),
        ("GET", ["todos", "search"]) => Some(Route::Search),
        ("GET", ["todos", todo_id]) => Some(Route::Get(todo_id.to_string())),
        ("PATCH", ["todos", todo_id]) => Some(Route::Update(todo_id.to_string())),
        ("DELETE", ["todos", todo_id]) => Some(Route::Delete(todo_id.to_string())),
        ("POST", ["todos", todo_id, "attachment"]) => Some(Route::UploadUrl(todo_id.to_string())),
        _ => None,
    }
}

pub fn handle_api_event<S: TodoStore, A: AttachmentStore>(
    event: Value,
    service: &TodoService<S, A>,
) -> ApiGatewayResponse {
    let (method, path) = match request_line(&event) {
        Ok(value) => value,
        Err(message) => return validation_error_response(&message),
    };

    if method.eq_ignore_ascii_case("OPTIONS") {
        return empty_response(204);
    }

    let Some(route) = resolve_route(&method, &path) else {
        warn!(component = "api_handler", event = "route_not_found", method = %method, path = %path);
        return error_response(
            404,
            json!({
                "error": "route_not_found",
                "message": format!("No route for {method} {path}"),
            }),
        );
    };

    let Some(owner_id) = owner_identity(&event) else {
        warn!(component = "api_handler", event = "unauthorized", method = %method, path = %path);
        return error_response(
            401,
            json!({
                "error": "unauthorized",
                "message": "Request is missing an authorized principal",
            }),
        );
    };

    info!(component = "api_handler", event = "request_routed", route = ?route, user_id = %owner_id);

    match route {
        Route::List => match service.list_for_owner(&owner_id) {
            Ok(items) => success_response(200, ItemsResponse { items }),
            Err(error) => todo_error_response(&error),
        },
        Route::Search => {
            let keyword = query_parameter(&event, "keyword").unwrap_or_default();
            match service.search_for_owner(&owner_id, &keyword) {
                Ok(items) => success_response(200, ItemsResponse { items }),
                Err(error) => todo_error_response(&error),
            }
        }
        Route::Create => {
            let request = match parse_body::<CreateTodoRequest>(&event) {
                Ok(value) => value,
                Err(message) => return validation_error_response(&message),
            };
            match service.create(request, &owner_id) {
                Ok(item) => success_response(201, ItemResponse { item }),
                Err(error) => todo_error_response(&error),
            }
        }
        Route::Get(todo_id) => match service.get_for_owner(&owner_id, &todo_id) {
            Ok(item) => success_response(200, ItemResponse { item }),
            Err(error) => todo_error_response(&error),
        },
        Route::Update(todo_id) => {
            let request = match parse_body::<UpdateTodoRequest>(&event) {
                Ok(value) => value,
                Err(message) => return validation_error_response(&message),
            };
            match service.update(&owner_id, &todo_id, request) {
                Ok(item) => success_response(200, ItemResponse { item }),
                Err(error) => todo_error_response(&error),
            }
        }
        Route::Delete(todo_id) => match service.delete(&todo_id, &owner_id) {
            Ok(()) => empty_response(204),
            Err(error) => todo_error_response(&error),
        },
        Route::UploadUrl(todo_id) => {
            match service.create_attachment_upload_target(&todo_id, &owner_id) {
                Ok(upload_url) => success_response(201, UploadUrlResponse { upload_url }),
                Err(error) => todo_error_response(&error),
            }
        }
    }
}

/// Method and path from either a REST (v1) or HTTP API (v2) proxy event.
fn request_line(event: &Value) -> Result<(String, String), String> {
    if !event.is_object() {
        return Err("Request payload must be a JSON object".to_string());
    }

    let method = event
        .get("httpMethod")
        .or_else(|| event.pointer("/requestContext/http/method"))
        .and_then(Value::as_str)
        .ok_or_else(|| "Request is missing an HTTP method".to_string())?;
    let path = event
        .get("path")
        .or_else(|| event.get("rawPath"))
        .and_then(Value::as_str)
        .ok_or_else(|| "Request is missing a path".to_string())?;

    Ok((method.to_string(), path.to_string()))
}

/// Principal placed in the request context by the upstream authorizer.
fn owner_identity(event: &Value) -> Option<String> {
    event
        .pointer("/requestContext/authorizer/principalId")
        .or_else(|| event.pointer("/requestContext/authorizer/lambda/principalId"))
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn query_parameter(event: &Value, name: &str) -> Option<String> {
    event
        .get("queryStringParameters")
        .and_then(|params| params.get(name))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn parse_body<T: serde::de::DeserializeOwned>(event: &Value) -> Result<T, String> {
    let body = match event.get("body") {
        None | Some(Value::Null) => return Err("Request body is required".to_string()),
        Some(Value::Object(_)) => event["body"].clone(),
        Some(Value::String(text)) => {
            serde_json::from_str(text).map_err(|error| format!("Malformed JSON body: {error}"))?
        }
        Some(_) => return Err("Request body must be a JSON object".to_string()),
    };

    serde_json::from_value(body).map_err(|error| format!("Malformed request: {error}"))
}

fn todo_error_response(todo_error: &TodoError) -> ApiGatewayResponse {
    let status_code = todo_error.status_code();
    if status_code >= 500 {
        error!(component = "api_handler", event = "request_failed", error = %todo_error);
    } else {
        warn!(component = "api_handler", event = "request_rejected", error = %todo_error);
    }

    error_response(
        status_code,
        ErrorBody {
            error: todo_error.code().to_string(),
            message: todo_error.to_string(),
        },
    )
}

fn validation_error_response(message: &str) -> ApiGatewayResponse {
    warn!(component = "api_handler", event = "request_rejected", error = %message);
    error_response(
        400,
        json!({
            "error": "validation_error",
            "message": message,
        }),
    )
}

fn response_headers() -> Value {
    json!({
        "Content-Type": "application/json",
        "Access-Control-Allow-Origin": "*",
        "Access-Control-Allow-Credentials": true,
    })
}

fn success_response(status_code: u16, payload: impl Serialize) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: response_headers(),
        body: stable_contract_json(payload),
    }
}

fn empty_response(status_code: u16) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: response_headers(),
        body: String::new(),
    }
}

fn error_response(status_code: u16, payload: impl Serialize) -> ApiGatewayResponse {
    ApiGatewayResponse {
        status_code,
        headers: response_headers(),
        body: stable_contract_json(payload),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::adapters::attachments::StaticAttachmentStore;
    use crate::adapters::todo_store::InMemoryTodoStore;

    use super::*;

    fn service() -> TodoService<InMemoryTodoStore, StaticAttachmentStore> {
        TodoService::new(
            InMemoryTodoStore::new(),
            StaticAttachmentStore::new("todos-test", Duration::from_secs(300)),
        )
    }

    #[test]
    fn resolves_every_route() {
        assert_eq!(resolve_route("GET", "/todos"), Some(Route::List));
        assert_eq!(resolve_route("post", "/todos/"), Some(Route::Create));
        assert_eq!(resolve_route("GET", "/todos/search"), Some(Route::Search));
        assert_eq!(
            resolve_route("PATCH", "/todos/t1"),
            Some(Route::Update("t1".to_string()))
        );
        assert_eq!(
            resolve_route("DELETE", "/todos/t1"),
            Some(Route::Delete("t1".to_string()))
        );
        assert_eq!(
            resolve_route("POST", "/todos/t1/attachment"),
            Some(Route::UploadUrl("t1".to_string()))
        );
        assert_eq!(resolve_route("PUT", "/todos/t1"), None);
    }

    #[test]
    fn rejects_request_without_principal() {
        let service = service();
        let response = handle_api_event(json!({"httpMethod": "GET", "path": "/todos"}), &service);

        assert_eq!(response.status_code, 401);
        assert!(service.store().is_empty().expect("store lock"));
    }

    #[test]
    fn rejects_malformed_create_body_without_writing() {
        let service = service();
        let response = handle_api_event(
            json!({
                "httpMethod": "POST",
                "path": "/todos",
                "requestContext": {"authorizer": {"principalId": "u1"}},
                "body": "{\"name\":"
            }),
            &service,
        );

        assert_eq!(response.status_code, 400);
        assert!(response.body.contains("Malformed JSON body"));
        assert!(service.store().is_empty().expect("store lock"));
    }

    #[test]
    fn responses_carry_cors_headers() {
        let response = handle_api_event(
            json!({
                "httpMethod": "GET",
                "path": "/todos",
                "requestContext": {"authorizer": {"principalId": "u1"}}
            }),
            &service(),
        );

        assert_eq!(response.status_code, 200);
        assert_eq!(response.headers["Access-Control-Allow-Origin"], "*");
        assert_eq!(response.body, "{\"items\":[]}");
    }

    #[test]
    fn principal_is_passed_through_verbatim() {
        let service = service();
        let response = handle_api_event(
            json!({
                "httpMethod": "POST",
                "path": "/todos",
                "requestContext": {"authorizer": {"principalId": " u1"}},
                "body": {"name": "learning", "dueDate": "2023-05-09"}
            }),
            &service,
        );

        assert_eq!(response.status_code, 201);
        assert_eq!(service.list_for_owner(" u1").expect("list").len(), 1);
        assert!(service.list_for_owner("u1").expect("list").is_empty());
    }
}

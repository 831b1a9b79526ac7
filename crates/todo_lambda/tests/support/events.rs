use serde_json::{json, Value};

/// REST API proxy event as delivered after the custom authorizer ran.
pub fn api_event(method: &str, path: &str, owner: &str, body: Option<Value>) -> Value {
    json!({
        "httpMethod": method,
        "path": path,
        "requestContext": {
            "authorizer": {"principalId": owner}
        },
        "body": body.map(|value| Value::String(value.to_string())),
    })
}

pub fn search_event(owner: &str, keyword: &str) -> Value {
    json!({
        "httpMethod": "GET",
        "path": "/todos/search",
        "queryStringParameters": {"keyword": keyword},
        "requestContext": {
            "authorizer": {"principalId": owner}
        },
    })
}

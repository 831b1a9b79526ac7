use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TodoError};

pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d";
pub const MAX_NAME_LENGTH: usize = 256;

/// A persisted to-do record, keyed by `(user_id, todo_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub user_id: String,
    pub todo_id: String,
    pub created_at: String,
    pub name: String,
    pub due_date: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateTodoRequest {
    pub name: String,
    pub due_date: String,
}

/// The only fields an update may touch. Unknown fields are rejected and all
/// three are required.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateTodoRequest {
    pub name: String,
    pub due_date: String,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    pub upload_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemResponse {
    pub item: TodoItem,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemsResponse {
    pub items: Vec<TodoItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

pub fn normalize_create_request(payload: CreateTodoRequest) -> Result<CreateTodoRequest> {
    Ok(CreateTodoRequest {
        name: normalize_name(&payload.name)?,
        due_date: normalize_due_date(&payload.due_date)?,
    })
}

pub fn normalize_update_request(payload: UpdateTodoRequest) -> Result<UpdateTodoRequest> {
    Ok(UpdateTodoRequest {
        name: normalize_name(&payload.name)?,
        due_date: normalize_due_date(&payload.due_date)?,
        done: payload.done,
    })
}

pub fn normalize_keyword(keyword: &str) -> Result<String> {
    if keyword.trim().is_empty() {
        return Err(TodoError::validation("keyword cannot be empty"));
    }
    Ok(keyword.to_string())
}

fn normalize_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(TodoError::validation("name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(TodoError::validation(format!(
            "name exceeds MAX_NAME_LENGTH={MAX_NAME_LENGTH}"
        )));
    }
    Ok(name.to_string())
}

fn normalize_due_date(due_date: &str) -> Result<String> {
    let due_date = due_date.trim();
    NaiveDate::parse_from_str(due_date, DUE_DATE_FORMAT).map_err(|_| {
        TodoError::validation(format!("dueDate '{due_date}' must be an ISO date (YYYY-MM-DD)"))
    })?;
    Ok(due_date.to_string())
}

/// ISO-8601 timestamp with millisecond precision and a `Z` suffix.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn stable_contract_json(value: impl Serialize) -> String {
    serde_json::to_string(&value).expect("serialization of contract value should not fail")
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn normalize_create_request_rejects_blank_name() {
        let request = CreateTodoRequest {
            name: "  ".to_string(),
            due_date: "2023-05-09".to_string(),
        };

        let error = normalize_create_request(request).expect_err("request should fail");
        assert_eq!(error.to_string(), "name cannot be empty");
    }

    #[test]
    fn name_length_is_capped_in_characters() {
        let at_limit = CreateTodoRequest {
            name: "é".repeat(MAX_NAME_LENGTH),
            due_date: "2023-05-09".to_string(),
        };
        assert!(normalize_create_request(at_limit).is_ok());

        let over_limit = UpdateTodoRequest {
            name: "a".repeat(MAX_NAME_LENGTH + 1),
            due_date: "2023-05-09".to_string(),
            done: false,
        };
        let error = normalize_update_request(over_limit).expect_err("request should fail");
        assert_eq!(error.to_string(), "name exceeds MAX_NAME_LENGTH=256");
    }

    #[test]
    fn normalize_create_request_trims_fields() {
        let request = CreateTodoRequest {
            name: " learning ".to_string(),
            due_date: "2023-05-09 ".to_string(),
        };

        let normalized = normalize_create_request(request).expect("request should pass");
        assert_eq!(normalized.name, "learning");
        assert_eq!(normalized.due_date, "2023-05-09");
    }

    #[test]
    fn normalize_update_request_rejects_non_iso_due_date() {
        let request = UpdateTodoRequest {
            name: "learning".to_string(),
            due_date: "09/05/2023".to_string(),
            done: true,
        };

        let error = normalize_update_request(request).expect_err("request should fail");
        assert!(matches!(error, TodoError::Validation(_)));
        assert!(error.to_string().contains("must be an ISO date"));
    }

    #[test]
    fn update_request_rejects_unknown_and_missing_fields() {
        let unknown = serde_json::from_value::<UpdateTodoRequest>(json!({
            "name": "learning",
            "dueDate": "2023-05-09",
            "done": true,
            "attachmentUrl": "https://example.com/x"
        }));
        assert!(unknown.is_err());

        let missing = serde_json::from_value::<UpdateTodoRequest>(json!({
            "name": "learning",
            "dueDate": "2023-05-09"
        }));
        assert!(missing.is_err());
    }

    #[test]
    fn todo_item_uses_camel_case_and_omits_missing_attachment() {
        let item = TodoItem {
            user_id: "u1".to_string(),
            todo_id: "t1".to_string(),
            created_at: "2023-05-02T06:37:18.063Z".to_string(),
            name: "learning".to_string(),
            due_date: "2023-05-09".to_string(),
            done: false,
            attachment_url: None,
        };

        let value = serde_json::to_value(&item).expect("item should serialize");
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["dueDate"], "2023-05-09");
        assert!(value.get("attachmentUrl").is_none());
    }

    #[test]
    fn format_timestamp_matches_iso_millis() {
        let at = Utc
            .with_ymd_and_hms(2023, 5, 2, 6, 37, 18)
            .single()
            .expect("valid timestamp");
        assert_eq!(format_timestamp(at), "2023-05-02T06:37:18.000Z");
    }
}

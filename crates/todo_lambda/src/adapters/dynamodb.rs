//! DynamoDB-backed record store.
//!
//! Table layout: partition key `userId`, sort key `todoId`, plus a secondary
//! index keyed by `userId` used for listing and search.

use std::collections::HashMap;

use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use todo_core::{Result, TodoError, TodoItem, UpdateTodoRequest};

use super::block_on;
use super::todo_store::TodoStore;

const ATTR_USER_ID: &str = "userId";
const ATTR_TODO_ID: &str = "todoId";
const ATTR_CREATED_AT: &str = "createdAt";
const ATTR_NAME: &str = "name";
const ATTR_DUE_DATE: &str = "dueDate";
const ATTR_DONE: &str = "done";
const ATTR_ATTACHMENT_URL: &str = "attachmentUrl";

#[derive(Clone)]
pub struct DynamoTodoStore {
    client: Client,
    table_name: String,
    index_name: String,
}

impl std::fmt::Debug for DynamoTodoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoTodoStore")
            .field("table_name", &self.table_name)
            .field("index_name", &self.index_name)
            .finish()
    }
}

impl DynamoTodoStore {
    pub fn new(
        client: Client,
        table_name: impl Into<String>,
        index_name: impl Into<String>,
    ) -> Self {
        Self {
            client,
            table_name: table_name.into(),
            index_name: index_name.into(),
        }
    }
}

pub fn todo_to_item(todo: &TodoItem) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::from([
        (ATTR_USER_ID.to_string(), AttributeValue::S(todo.user_id.clone())),
        (ATTR_TODO_ID.to_string(), AttributeValue::S(todo.todo_id.clone())),
        (
            ATTR_CREATED_AT.to_string(),
            AttributeValue::S(todo.created_at.clone()),
        ),
        (ATTR_NAME.to_string(), AttributeValue::S(todo.name.clone())),
        (ATTR_DUE_DATE.to_string(), AttributeValue::S(todo.due_date.clone())),
        (ATTR_DONE.to_string(), AttributeValue::Bool(todo.done)),
    ]);
    if let Some(url) = &todo.attachment_url {
        item.insert(
            ATTR_ATTACHMENT_URL.to_string(),
            AttributeValue::S(url.clone()),
        );
    }
    item
}

pub fn item_to_todo(item: &HashMap<String, AttributeValue>) -> Result<TodoItem> {
    Ok(TodoItem {
        user_id: required_string(item, ATTR_USER_ID)?,
        todo_id: required_string(item, ATTR_TODO_ID)?,
        created_at: required_string(item, ATTR_CREATED_AT)?,
        name: required_string(item, ATTR_NAME)?,
        due_date: required_string(item, ATTR_DUE_DATE)?,
        done: item
            .get(ATTR_DONE)
            .and_then(|value| value.as_bool().ok())
            .copied()
            .unwrap_or(false),
        attachment_url: item
            .get(ATTR_ATTACHMENT_URL)
            .and_then(|value| value.as_s().ok())
            .cloned(),
    })
}

fn required_string(item: &HashMap<String, AttributeValue>, attribute: &str) -> Result<String> {
    item.get(attribute)
        .and_then(|value| value.as_s().ok())
        .cloned()
        .ok_or_else(|| {
            TodoError::store(format!(
                "stored item is missing string attribute '{attribute}'"
            ))
        })
}

fn is_conditional_check_failed(err: &SdkError<UpdateItemError>) -> bool {
    match err {
        SdkError::ServiceError(service_err) => matches!(
            service_err.err(),
            UpdateItemError::ConditionalCheckFailedException(_)
        ),
        _ => false,
    }
}

fn map_update_error(err: SdkError<UpdateItemError>, user_id: &str, todo_id: &str) -> TodoError {
    if is_conditional_check_failed(&err) {
        TodoError::not_found(user_id, todo_id)
    } else {
        TodoError::store(format!("DynamoDB UpdateItem failed: {err}"))
    }
}

impl TodoStore for DynamoTodoStore {
    fn list_by_owner(&self, user_id: &str) -> Result<Vec<TodoItem>> {
        block_on(async {
            let mut todos = Vec::new();
            let mut exclusive_start_key = None;

            loop {
                let response = self
                    .client
                    .query()
                    .table_name(&self.table_name)
                    .index_name(&self.index_name)
                    .key_condition_expression("userId = :userId")
                    .expression_attribute_values(":userId", AttributeValue::S(user_id.to_string()))
                    .set_exclusive_start_key(exclusive_start_key.take())
                    .send()
                    .await
                    .map_err(|err| {
                        TodoError::store(format!("DynamoDB Query failed: {err}"))
                    })?;

                for item in response.items() {
                    todos.push(item_to_todo(item)?);
                }

                match response.last_evaluated_key() {
                    Some(key) if !key.is_empty() => {
                        exclusive_start_key = Some(key.clone());
                    }
                    _ => break,
                }
            }

            Ok(todos)
        })
    }

    fn get(&self, user_id: &str, todo_id: &str) -> Result<TodoItem> {
        block_on(async {
            let response = self
                .client
                .get_item()
                .table_name(&self.table_name)
                .key(ATTR_USER_ID, AttributeValue::S(user_id.to_string()))
                .key(ATTR_TODO_ID, AttributeValue::S(todo_id.to_string()))
                .send()
                .await
                .map_err(|err| {
                    TodoError::store(format!("DynamoDB GetItem failed: {err}"))
                })?;

            match response.item() {
                Some(item) => item_to_todo(item),
                None => Err(TodoError::not_found(user_id, todo_id)),
            }
        })
    }

    fn create(&self, item: TodoItem) -> Result<TodoItem> {
        block_on(async {
            self.client
                .put_item()
                .table_name(&self.table_name)
                .set_item(Some(todo_to_item(&item)))
                .send()
                .await
                .map_err(|err| {
                    TodoError::store(format!("DynamoDB PutItem failed: {err}"))
                })?;
            Ok(item)
        })
    }

    fn update(
        &self,
        todo_id: &str,
        user_id: &str,
        update: &UpdateTodoRequest,
    ) -> Result<TodoItem> {
        block_on(async {
            let response = self
                .client
                .update_item()
                .table_name(&self.table_name)
                .key(ATTR_USER_ID, AttributeValue::S(user_id.to_string()))
                .key(ATTR_TODO_ID, AttributeValue::S(todo_id.to_string()))
                .update_expression("SET #name = :name, dueDate = :dueDate, done = :done")
                .condition_expression("attribute_exists(todoId)")
                .expression_attribute_names("#name", ATTR_NAME)
                .expression_attribute_values(":name", AttributeValue::S(update.name.clone()))
                .expression_attribute_values(
                    ":dueDate",
                    AttributeValue::S(update.due_date.clone()),
                )
                .expression_attribute_values(":done", AttributeValue::Bool(update.done))
                .return_values(ReturnValue::AllNew)
                .send()
                .await
                .map_err(|err| map_update_error(err, user_id, todo_id))?;

            match response.attributes() {
                Some(attributes) => item_to_todo(attributes),
                None => Err(TodoError::store(
                    "DynamoDB UpdateItem returned no attributes",
                )),
            }
        })
    }

    fn update_attachment_url(&self, todo_id: &str, user_id: &str, url: &str) -> Result<()> {
        block_on(async {
            self.client
                .update_item()
                .table_name(&self.table_name)
                .key(ATTR_USER_ID, AttributeValue::S(user_id.to_string()))
                .key(ATTR_TODO_ID, AttributeValue::S(todo_id.to_string()))
                .update_expression("SET attachmentUrl = :attachmentUrl")
                .condition_expression("attribute_exists(todoId)")
                .expression_attribute_values(":attachmentUrl", AttributeValue::S(url.to_string()))
                .send()
                .await
                .map(|_| ())
                .map_err(|err| map_update_error(err, user_id, todo_id))
        })
    }

    fn delete(&self, todo_id: &str, user_id: &str) -> Result<()> {
        block_on(async {
            self.client
                .delete_item()
                .table_name(&self.table_name)
                .key(ATTR_USER_ID, AttributeValue::S(user_id.to_string()))
                .key(ATTR_TODO_ID, AttributeValue::S(todo_id.to_string()))
                .send()
                .await
                .map(|_| ())
                .map_err(|err| {
                    TodoError::store(format!("DynamoDB DeleteItem failed: {err}"))
                })
        })
    }
}

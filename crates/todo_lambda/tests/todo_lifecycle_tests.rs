mod support;

use chrono::DateTime;
use support::service::{build_service, create_request, TEST_BUCKET};
use todo_core::{TodoError, UpdateTodoRequest};
use todo_lambda::adapters::todo_store::TodoStore;

#[test]
fn create_then_get_round_trips_every_field() {
    let service = build_service();
    let created = service
        .create(create_request("learning", "2023-05-09"), "u1")
        .expect("create should pass");

    let fetched = service
        .store()
        .get(&created.user_id, &created.todo_id)
        .expect("record should exist");

    assert_eq!(fetched, created);
    assert!(DateTime::parse_from_rfc3339(&created.created_at).is_ok());
    assert_eq!(
        created.attachment_url,
        Some(format!(
            "https://{TEST_BUCKET}.s3.amazonaws.com/{}",
            created.todo_id
        ))
    );
}

#[test]
fn list_for_owner_is_isolated_per_owner() {
    let service = build_service();
    let first = service
        .create(create_request("learning", "2023-05-09"), "u1")
        .expect("create");
    let second = service
        .create(create_request("groceries", "2023-05-10"), "u1")
        .expect("create");
    service
        .create(create_request("learning", "2023-05-09"), "u2")
        .expect("create");

    let mut listed: Vec<String> = service
        .list_for_owner("u1")
        .expect("list should pass")
        .into_iter()
        .map(|item| item.todo_id)
        .collect();
    listed.sort();

    let mut expected = vec![first.todo_id, second.todo_id];
    expected.sort();
    assert_eq!(listed, expected);
    assert!(service.list_for_owner("u3").expect("list").is_empty());
}

#[test]
fn search_matches_whole_name_only() {
    let service = build_service();
    service
        .create(create_request("learning", "2023-05-09"), "u1")
        .expect("create");
    service
        .create(create_request("learning plan", "2023-05-09"), "u1")
        .expect("create");

    let found = service
        .search_for_owner("u1", "learning")
        .expect("search should pass");

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "learning");
}

#[test]
fn toggling_done_leaves_other_fields_unchanged() {
    let service = build_service();
    let created = service
        .create(create_request("learning", "2023-05-09"), "u1")
        .expect("create");

    let updated = service
        .update(
            "u1",
            &created.todo_id,
            UpdateTodoRequest {
                name: created.name.clone(),
                due_date: created.due_date.clone(),
                done: true,
            },
        )
        .expect("update should pass");

    assert!(updated.done);
    assert_eq!(updated.name, created.name);
    assert_eq!(updated.due_date, created.due_date);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.todo_id, created.todo_id);
    assert_eq!(updated.user_id, created.user_id);
    assert_eq!(updated.attachment_url, created.attachment_url);

    let listed = service.list_for_owner("u1").expect("list");
    assert_eq!(listed.len(), 1);
    assert!(listed[0].done);
    assert_eq!(listed[0].name, "learning");
}

#[test]
fn update_by_another_owner_is_not_found() {
    let service = build_service();
    let created = service
        .create(create_request("learning", "2023-05-09"), "u1")
        .expect("create");

    let error = service
        .update(
            "u2",
            &created.todo_id,
            UpdateTodoRequest {
                name: "hijacked".to_string(),
                due_date: "2023-05-09".to_string(),
                done: true,
            },
        )
        .expect_err("update should fail");

    assert_eq!(error, TodoError::not_found("u2", created.todo_id.clone()));
    let stored = service
        .get_for_owner("u1", &created.todo_id)
        .expect("record should remain");
    assert_eq!(stored.name, "learning");
}

#[test]
fn delete_then_get_is_not_found() {
    let service = build_service();
    let created = service
        .create(create_request("learning", "2023-05-09"), "u1")
        .expect("create");

    service
        .delete(&created.todo_id, "u1")
        .expect("delete should pass");

    let error = service
        .get_for_owner("u1", &created.todo_id)
        .expect_err("record should be gone");
    assert!(matches!(error, TodoError::NotFound { .. }));
    service
        .delete(&created.todo_id, "u1")
        .expect("second delete is a no-op");
}

#[test]
fn upload_target_keeps_attachment_url_consistent() {
    let service = build_service();
    let created = service
        .create(create_request("learning", "2023-05-09"), "u1")
        .expect("create");

    let upload_url = service
        .create_attachment_upload_target(&created.todo_id, "u1")
        .expect("upload target should pass");

    let stored = service.get_for_owner("u1", &created.todo_id).expect("get");
    assert_eq!(stored.attachment_url, created.attachment_url);
    assert!(upload_url.starts_with(stored.attachment_url.as_deref().unwrap_or_default()));
}

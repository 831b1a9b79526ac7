//! Attachment object naming. The object key and the public attachment URL are
//! both derived from the todo id alone, so every writer of `attachmentUrl`
//! produces the same value.

pub fn attachment_object_key(todo_id: &str) -> String {
    todo_id.trim_matches('/').to_string()
}

pub fn attachment_url(bucket: &str, todo_id: &str) -> String {
    format!(
        "https://{}.s3.amazonaws.com/{}",
        bucket.trim(),
        attachment_object_key(todo_id)
    )
}

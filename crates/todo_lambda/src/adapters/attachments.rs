use std::time::Duration;

use aws_sdk_s3::presigning::PresigningConfig;
use todo_core::storage_keys::{attachment_object_key, attachment_url};
use todo_core::{Result, TodoError};

use super::block_on;

pub trait AttachmentStore {
    /// Public locator of the attachment object for `todo_id`.
    fn attachment_url(&self, todo_id: &str) -> String;

    /// Time-limited URL the client uploads the attachment body to.
    fn upload_url(&self, todo_id: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct S3AttachmentStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    url_expiration: Duration,
}

impl S3AttachmentStore {
    pub fn new(
        client: aws_sdk_s3::Client,
        bucket: impl Into<String>,
        url_expiration: Duration,
    ) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            url_expiration,
        }
    }
}

impl AttachmentStore for S3AttachmentStore {
    fn attachment_url(&self, todo_id: &str) -> String {
        attachment_url(&self.bucket, todo_id)
    }

    fn upload_url(&self, todo_id: &str) -> Result<String> {
        let presigning = PresigningConfig::expires_in(self.url_expiration)
            .map_err(|error| TodoError::Attachment(format!("invalid presigning config: {error}")))?;

        block_on(async {
            self.client
                .put_object()
                .bucket(&self.bucket)
                .key(attachment_object_key(todo_id))
                .presigned(presigning)
                .await
                .map(|request| request.uri().to_string())
                .map_err(|error| {
                    TodoError::Attachment(format!("failed to presign upload url: {error}"))
                })
        })
    }
}

/// Unsigned, deterministic URLs for local runs and tests.
#[derive(Debug, Clone)]
pub struct StaticAttachmentStore {
    bucket: String,
    url_expiration: Duration,
}

impl StaticAttachmentStore {
    pub fn new(bucket: impl Into<String>, url_expiration: Duration) -> Self {
        Self {
            bucket: bucket.into(),
            url_expiration,
        }
    }
}

impl AttachmentStore for StaticAttachmentStore {
    fn attachment_url(&self, todo_id: &str) -> String {
        attachment_url(&self.bucket, todo_id)
    }

    fn upload_url(&self, todo_id: &str) -> Result<String> {
        Ok(format!(
            "{}?X-Amz-Expires={}",
            attachment_url(&self.bucket, todo_id),
            self.url_expiration.as_secs()
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_upload_url_targets_attachment_object() {
        let store = StaticAttachmentStore::new("todos-dev", Duration::from_secs(300));

        assert_eq!(
            store.upload_url("t1").expect("upload url"),
            "https://todos-dev.s3.amazonaws.com/t1?X-Amz-Expires=300"
        );
        assert_eq!(
            store.attachment_url("t1"),
            "https://todos-dev.s3.amazonaws.com/t1"
        );
    }
}

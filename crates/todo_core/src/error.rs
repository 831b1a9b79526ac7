use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TodoError {
    #[error("todo '{todo_id}' not found for user '{user_id}'")]
    NotFound { user_id: String, todo_id: String },

    #[error("{0}")]
    Validation(String),

    #[error("record store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("attachment store unavailable: {0}")]
    Attachment(String),
}

pub type Result<T> = std::result::Result<T, TodoError>;

impl TodoError {
    pub fn not_found(user_id: impl Into<String>, todo_id: impl Into<String>) -> Self {
        Self::NotFound {
            user_id: user_id.into(),
            todo_id: todo_id.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn store(message: impl Into<String>) -> Self {
        Self::StoreUnavailable(message.into())
    }

    /// Stable machine-readable code carried in HTTP error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::Validation(_) => "validation_error",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::Attachment(_) => "attachment_unavailable",
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation(_) => 400,
            Self::StoreUnavailable(_) | Self::Attachment(_) => 502,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_each_cause_to_distinct_status() {
        assert_eq!(TodoError::not_found("u1", "t1").status_code(), 404);
        assert_eq!(TodoError::validation("bad").status_code(), 400);
        assert_eq!(TodoError::store("down").status_code(), 502);
        assert_eq!(TodoError::store("down").code(), "store_unavailable");
    }

    #[test]
    fn not_found_message_names_the_key() {
        let error = TodoError::not_found("u1", "t1");
        assert_eq!(error.to_string(), "todo 't1' not found for user 'u1'");
    }
}

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("{operation} exceeded its deadline of {timeout:?}")]
    DeadlineExceeded { operation: String, timeout: Duration },

    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Failed to publish to {topic}: {message}")]
    Publish { topic: String, message: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

/// 對外的錯誤分類，HTTP 層依此決定狀態碼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    BadRequest,
    Internal,
    DeadlineExceeded,
}

impl ProfileError {
    pub fn not_found(id: &str) -> Self {
        Self::NotFound {
            message: format!("No such student with ID {} exists", id),
        }
    }

    pub fn conflict(id: &str) -> Self {
        Self::Conflict {
            message: format!("Student with ID {} already exists", id),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::BadRequest { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorKind::BadRequest,
            Self::DeadlineExceeded { .. } => ErrorKind::DeadlineExceeded,
            Self::Internal { .. }
            | Self::Store { .. }
            | Self::Publish { .. }
            | Self::SerializationError(_)
            | Self::IoError(_) => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, ProfileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(ProfileError::not_found("s1").kind(), ErrorKind::NotFound);
        assert_eq!(ProfileError::conflict("s1").kind(), ErrorKind::Conflict);
        assert_eq!(
            ProfileError::Store {
                message: "connection reset".to_string()
            }
            .kind(),
            ErrorKind::Internal
        );
        assert_eq!(
            ProfileError::DeadlineExceeded {
                operation: "update".to_string(),
                timeout: Duration::from_millis(10),
            }
            .kind(),
            ErrorKind::DeadlineExceeded
        );
    }

    #[test]
    fn test_not_found_message_names_id() {
        let err = ProfileError::not_found("abc-123");
        assert_eq!(
            err.to_string(),
            "Not found: No such student with ID abc-123 exists"
        );
    }
}

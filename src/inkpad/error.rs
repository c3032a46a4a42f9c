use thiserror::Error;

/// The primary error type for inkpad operations.
///
/// `InvalidValue`, `NotFound`, `PermissionDenied` and `Internal` form the
/// caller-facing taxonomy; `Io` and `Serialization` are storage-backend
/// failures and count as internal errors at the boundary.
#[derive(Error, Debug)]
pub enum BlogError {
    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("internal error: {0}")]
    Internal(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl BlogError {
    /// Numeric code for the error kind, matching the HTTP status codes
    /// an admin frontend keys on.
    pub fn code(&self) -> u16 {
        match self {
            BlogError::InvalidValue(_) => 400,
            BlogError::PermissionDenied(_) => 403,
            BlogError::NotFound(_) => 404,
            BlogError::Internal(_) | BlogError::Io(_) | BlogError::Serialization(_) => 500,
        }
    }
}

pub type Result<T> = std::result::Result<T, BlogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_kinds() {
        assert_eq!(BlogError::InvalidValue("x".into()).code(), 400);
        assert_eq!(BlogError::PermissionDenied("x".into()).code(), 403);
        assert_eq!(BlogError::NotFound("post".into()).code(), 404);
        assert_eq!(BlogError::Internal("db".into()).code(), 500);
    }

    #[test]
    fn not_found_message_names_the_entity() {
        let err = BlogError::NotFound("category".into());
        assert_eq!(err.to_string(), "category not found");
    }
}

use thiserror::Error;

/// Unified error type for gitver operations
#[derive(Error, Debug)]
pub enum GitVerError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Version(String),

    #[error("Branch error: {0}")]
    Branch(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("Version calculation failed: {0}")]
    Calculation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in gitver
pub type Result<T> = std::result::Result<T, GitVerError>;

impl GitVerError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        GitVerError::Config(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        GitVerError::Version(msg.into())
    }

    /// Create a branch error with context
    pub fn branch(msg: impl Into<String>) -> Self {
        GitVerError::Branch(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        GitVerError::Tag(msg.into())
    }

    /// Create a cache error with context
    pub fn cache(msg: impl Into<String>) -> Self {
        GitVerError::Cache(msg.into())
    }

    /// Create a calculation error with context
    pub fn calculation(msg: impl Into<String>) -> Self {
        GitVerError::Calculation(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GitVerError::config("test config issue");
        assert_eq!(err.to_string(), "Configuration error: test config issue");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: GitVerError = io_err.into();
        assert!(err.to_string().contains("I/O error"));
    }

    #[test]
    fn test_error_constructors() {
        assert!(GitVerError::version("test").to_string().contains("Version"));
        assert!(GitVerError::tag("test").to_string().contains("Tag"));
        assert!(GitVerError::cache("test").to_string().contains("Cache"));
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (GitVerError::config("x"), "Configuration error"),
            (GitVerError::version("x"), "Version parsing error"),
            (GitVerError::branch("x"), "Branch error"),
            (GitVerError::tag("x"), "Tag error"),
            (GitVerError::cache("x"), "Cache error"),
            (GitVerError::calculation("x"), "Version calculation failed"),
        ];

        for (err, expected_prefix) in error_pairs {
            let msg = err.to_string();
            assert!(
                msg.starts_with(expected_prefix),
                "Error message should start with '{}', but got '{}'",
                expected_prefix,
                msg
            );
        }
    }
}

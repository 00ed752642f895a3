use std::path::{Path, PathBuf};

use thiserror::Error;

/// Exit code for configuration errors
pub const EXIT_CONFIG: i32 = 3;
/// Exit code for version errors (parse, not found, invalid argument)
pub const EXIT_VERSION: i32 = 4;
/// Exit code for file errors
pub const EXIT_FILE: i32 = 5;
/// Exit code for git errors
pub const EXIT_GIT: i32 = 6;
/// Exit code for anything else
pub const EXIT_OTHER: i32 = 1;

/// Unified error type for v-and-r operations
#[derive(Error, Debug)]
pub enum VandrError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version parsing error: {0}")]
    Parse(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("File error: {}: {message}", path.display())]
    File { path: PathBuf, message: String },

    #[error("Git unavailable: {0}")]
    GitUnavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Tag error: {0}")]
    Tag(String),

    #[error("Failed to update {failed} of {total} file(s)")]
    PartialUpdate { failed: usize, total: usize },

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience type alias for Results in v-and-r
pub type Result<T> = std::result::Result<T, VandrError>;

impl VandrError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        VandrError::Config(msg.into())
    }

    /// Create a version parse error with context
    pub fn parse(msg: impl Into<String>) -> Self {
        VandrError::Parse(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        VandrError::InvalidArgument(msg.into())
    }

    /// Create a per-file error
    pub fn file(path: impl AsRef<Path>, msg: impl Into<String>) -> Self {
        VandrError::File {
            path: path.as_ref().to_path_buf(),
            message: msg.into(),
        }
    }

    pub fn git_unavailable(msg: impl Into<String>) -> Self {
        VandrError::GitUnavailable(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        VandrError::NotFound(msg.into())
    }

    /// Create a tag error with context
    pub fn tag(msg: impl Into<String>) -> Self {
        VandrError::Tag(msg.into())
    }

    /// Process exit code for this error's category
    pub fn exit_code(&self) -> i32 {
        match self {
            VandrError::Config(_) => EXIT_CONFIG,
            VandrError::Parse(_) | VandrError::InvalidArgument(_) | VandrError::NotFound(_) => {
                EXIT_VERSION
            }
            VandrError::File { .. } | VandrError::PartialUpdate { .. } => EXIT_FILE,
            VandrError::GitUnavailable(_) | VandrError::Git(_) | VandrError::Tag(_) => EXIT_GIT,
            VandrError::Json(_) => EXIT_OTHER,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VandrError::config("rule #2: template is missing {version}");
        assert_eq!(
            err.to_string(),
            "Configuration error: rule #2: template is missing {version}"
        );
    }

    #[test]
    fn test_file_error_names_path() {
        let err = VandrError::file("dags/etl.py", "pattern no longer matches");
        let msg = err.to_string();
        assert!(msg.contains("dags/etl.py"));
        assert!(msg.contains("pattern no longer matches"));
    }

    #[test]
    fn test_file_category_covers_partial_update() {
        let err = VandrError::PartialUpdate { failed: 1, total: 3 };
        assert_eq!(err.to_string(), "Failed to update 1 of 3 file(s)");
        assert_eq!(err.exit_code(), EXIT_FILE);
    }

    #[test]
    fn test_exit_codes_are_distinct_per_category() {
        let codes = [
            VandrError::config("x").exit_code(),
            VandrError::parse("x").exit_code(),
            VandrError::file("a", "x").exit_code(),
            VandrError::git_unavailable("x").exit_code(),
        ];

        for (i, a) in codes.iter().enumerate() {
            assert_ne!(*a, 0);
            for b in codes.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_version_category_covers_not_found_and_invalid_argument() {
        assert_eq!(VandrError::not_found("x").exit_code(), EXIT_VERSION);
        assert_eq!(VandrError::invalid_argument("x").exit_code(), EXIT_VERSION);
    }

    #[test]
    fn test_partial_update_is_file_category() {
        let err = VandrError::PartialUpdate {
            failed: 1,
            total: 3,
        };
        assert_eq!(err.to_string(), "Failed to update 1 of 3 file(s)");
        assert_eq!(err.exit_code(), EXIT_FILE);
        assert_eq!(VandrError::tag("exists").exit_code(), EXIT_GIT);
    }

    #[test]
    fn test_error_messages_are_descriptive() {
        let error_pairs = vec![
            (VandrError::config("x"), "Configuration error"),
            (VandrError::parse("x"), "Version parsing error"),
            (VandrError::invalid_argument("x"), "Invalid argument"),
            (VandrError::git_unavailable("x"), "Git unavailable"),
            (VandrError::not_found("x"), "Not found"),
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

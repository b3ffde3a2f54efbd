//! Error types for saviour.
//!
//! This module defines the crate-wide error type along with the narrower
//! [`StorageError`] returned by the key-value store. Storage errors are kept
//! separate because the registry treats persistence as best-effort: callers
//! log them and keep working from memory.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a [`KeyValueStore`](crate::storage::KeyValueStore).
#[derive(Error, Debug)]
pub enum StorageError {
    /// The backing database rejected the operation.
    #[error("storage backend failed: {0}")]
    Backend(#[from] rusqlite::Error),

    /// Writing the value would exceed the store's size limit.
    #[error("storage quota exceeded writing '{key}': {size} bytes over a limit of {limit}")]
    QuotaExceeded {
        /// Key being written.
        key: String,
        /// Size in bytes the store would have after the write.
        size: usize,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// The store is disabled or otherwise unusable.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// A value could not be encoded for storage.
    #[error("could not encode value for storage: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A specialized Result type for key-value store operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// The main error type for saviour operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A key-value store operation failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Domain Errors ===
    /// User-submitted input was incomplete or inconsistent.
    #[error("{message}")]
    Validation {
        /// Message suitable for showing to the user.
        message: String,
    },

    /// Login failed or no user is signed in.
    #[error("{message}")]
    Auth {
        /// Message suitable for showing to the user.
        message: String,
    },

    /// No donor with the given id exists in the registry.
    #[error("no donor with id {id}")]
    DonorNotFound {
        /// The id that was looked up.
        id: i64,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for saviour operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new authentication error.
    #[must_use]
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error was caused by user input rather than the system.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::Auth { .. } | Self::DonorNotFound { .. }
        )
    }

    /// Check if this error came from the key-value store.
    #[must_use]
    pub fn is_storage_error(&self) -> bool {
        matches!(self, Self::Storage(_) | Self::DatabaseQuery(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = Error::validation("Please complete all fields");
        assert_eq!(err.to_string(), "Please complete all fields");
        assert!(err.is_user_error());
    }

    #[test]
    fn test_auth_error_display() {
        let err = Error::auth("Invalid login. Try again or sign up first.");
        assert!(err.to_string().starts_with("Invalid login"));
        assert!(err.is_user_error());
    }

    #[test]
    fn test_donor_not_found_display() {
        let err = Error::DonorNotFound { id: 42 };
        assert_eq!(err.to_string(), "no donor with id 42");
        assert!(err.is_user_error());
        assert!(!err.is_storage_error());
    }

    #[test]
    fn test_internal_error() {
        let err = Error::internal("something went wrong");
        assert_eq!(err.to_string(), "internal error: something went wrong");
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_quota_exceeded_display() {
        let err = StorageError::QuotaExceeded {
            key: "saviour_donors".to_string(),
            size: 6000,
            limit: 5000,
        };
        let msg = err.to_string();
        assert!(msg.contains("saviour_donors"));
        assert!(msg.contains("5000"));
    }

    #[test]
    fn test_storage_error_is_transparent() {
        let err: Error = StorageError::Unavailable("disabled".to_string()).into();
        assert_eq!(err.to_string(), "storage unavailable: disabled");
        assert!(err.is_storage_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
        }
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_database_migration_error_display() {
        let err = Error::DatabaseMigration {
            message: "version mismatch".to_string(),
        };
        assert!(err.to_string().contains("version mismatch"));
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "duplicate storage key".to_string(),
        };
        assert!(err.to_string().contains("duplicate storage key"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}

//! Error types for the job seeker store

use sqlx::error::ErrorKind;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using the store's error
pub type Result<T> = std::result::Result<T, StorageError>;

/// Every failure a store operation can surface to its caller.
///
/// A missing record is never an error: lookups return `Ok(None)`.
#[derive(Error, Debug)]
pub enum StorageError {
    // Engine errors (S001-S099)
    #[error("Storage unavailable: {0}. Check the database path with `jobseeker config get database.path`.")]
    Connection(#[source] sqlx::Error),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    // Deadline errors (S100-S199)
    #[error("Storage operation timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("Storage operation cancelled")]
    Cancelled,

    // Data errors (S200-S299)
    #[error("Job seeker has no identifier and the store expects client-generated ids")]
    MissingIdentifier,

    #[error("Stored row could not be decoded: {0}")]
    CorruptRow(String),
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if !matches!(db_err.kind(), ErrorKind::Other) => {
                Self::Constraint(db_err.message().to_string())
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                Self::CorruptRow(err.to_string())
            }
            _ => Self::Connection(err),
        }
    }
}

impl StorageError {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::Connection(_) => "S001",
            Self::Constraint(_) => "S002",
            Self::Timeout(_) => "S100",
            Self::Cancelled => "S101",
            Self::MissingIdentifier => "S200",
            Self::CorruptRow(_) => "S201",
        }
    }

    /// Whether repeating the same call could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Timeout(_))
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Connection(_) => Some("jobseeker doctor".to_string()),
            Self::Timeout(_) => Some("jobseeker config set store.query_timeout_ms 10000".to_string()),
            Self::MissingIdentifier => Some("jobseeker add --id <UUID> ...".to_string()),
            _ => None,
        }
    }
}

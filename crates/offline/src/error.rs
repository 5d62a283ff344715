//! Offline queue error types

use thiserror::Error;

/// Result type for queue operations
pub type Result<T> = std::result::Result<T, QueueError>;

/// Errors raised by the offline queue
#[derive(Debug, Error)]
pub enum QueueError {
    /// Another process held the queue lock past the wait budget.
    ///
    /// The caller still owns its heartbeats and decides whether to retry or
    /// surface the failure.
    #[error("offline queue is locked by another process")]
    Busy,

    /// Queue file could not be created or its directory is missing
    #[error("queue file error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to encode a heartbeat for storage
    #[error("failed to serialize heartbeat: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Any other database failure
    #[error("queue database error: {0}")]
    Sql(rusqlite::Error),
}

impl From<rusqlite::Error> for QueueError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _)
                if matches!(
                    inner.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                ) =>
            {
                Self::Busy
            }
            _ => Self::Sql(err),
        }
    }
}

//! Pipeline error type

use thiserror::Error;

use pulse_api::ApiError;
use pulse_offline::QueueError;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that terminate a pipeline run
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The API sink failed terminally (auth, bad request, protocol)
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The offline queue failed while heartbeats had to be stored
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// Any other stage failure
    #[error("{0}")]
    Other(String),
}

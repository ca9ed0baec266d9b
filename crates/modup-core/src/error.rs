//! Common error types for upload backends

use thiserror::Error;

/// Result type for upload operations
pub type UploadResult<T> = Result<T, UploadError>;

/// Errors that can occur while handling an upload request
#[derive(Debug, Error)]
pub enum UploadError {
    /// POST body lacks `fileContent` or `modId` (or either is empty)
    #[error("Missing file content or mod ID")]
    MissingUploadFields,

    /// GET request lacks the `fileId` query parameter
    #[error("Missing file ID")]
    MissingFileId,

    /// Request body could not be parsed
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl UploadError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            UploadError::MissingUploadFields => 400,
            UploadError::MissingFileId => 400,
            UploadError::InvalidBody(_) => 400,
            UploadError::Internal(_) => 500,
        }
    }
}

impl From<serde_json::Error> for UploadError {
    fn from(err: serde_json::Error) -> Self {
        UploadError::InvalidBody(err.to_string())
    }
}

//! UploadBackend trait - the abstraction behind the upload endpoint

use async_trait::async_trait;

use crate::error::{UploadError, UploadResult};
use crate::file_id::FileId;
use crate::models::{RetrievalNotice, Upload, UploadReceipt};

/// Handles accepted uploads and retrieval lookups.
///
/// Both the HTTP router and the cloud-function adapter call through this
/// trait, so an alternative backend only has to be wired into `AppState`.
#[async_trait]
pub trait UploadBackend: Send + Sync {
    /// Accept an upload and produce its acknowledgment
    async fn accept(&self, upload: Upload) -> UploadResult<UploadReceipt>;

    /// Look up a previously acknowledged file
    async fn locate(&self, file_id: &str) -> UploadResult<RetrievalNotice>;
}

/// Backend that acknowledges uploads without keeping them.
///
/// `accept` generates a fresh [`FileId`] and echoes the request; `locate`
/// answers every non-empty ID with the retrieval placeholder.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcknowledgeBackend;

impl AcknowledgeBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UploadBackend for AcknowledgeBackend {
    async fn accept(&self, upload: Upload) -> UploadResult<UploadReceipt> {
        let file_id = FileId::generate(&upload.mod_id);

        tracing::debug!(
            mod_id = %upload.mod_id,
            file_id = %file_id,
            "Generated file ID"
        );

        Ok(UploadReceipt::acknowledge(upload, file_id))
    }

    async fn locate(&self, file_id: &str) -> UploadResult<RetrievalNotice> {
        if file_id.is_empty() {
            return Err(UploadError::MissingFileId);
        }
        Ok(RetrievalNotice::default())
    }
}
